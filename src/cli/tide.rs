//! Tide command handler
//!
//! Classifies a location, resolves its tide data, records the query and
//! prints the report.

use crate::config::Config;
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::format::{available_formats, get_formatter};
use crate::service::{local_now, ReportError, TideReport, TideService};
use crate::store::TideStore;
use clap::Args;
use chrono::NaiveDateTime;

/// Tide command arguments
#[derive(Args)]
pub struct TideArgs {
    /// Latitude
    #[arg(long, allow_hyphen_values = true, required_unless_present = "list_formats")]
    pub lat: Option<f64>,

    /// Longitude
    #[arg(long, allow_hyphen_values = true, required_unless_present = "list_formats")]
    pub lon: Option<f64>,

    /// Output format
    #[arg(long, short = 'f')]
    pub format: Option<String>,

    /// Don't record this query
    #[arg(long)]
    pub no_save: bool,

    /// Write output to file
    #[arg(long, short = 'o')]
    pub output: Option<String>,

    /// List available formats
    #[arg(short = 'F', long = "list-formats")]
    pub list_formats: bool,
}

/// Run the tide command
pub fn run(args: TideArgs) -> Result<()> {
    if args.list_formats {
        list_formats();
        return Ok(());
    }

    let config = Config::load()?;

    let (Some(lat), Some(lon)) = (args.lat, args.lon) else {
        return Err(Error::InvalidCoordinates(
            "Both --lat and --lon are required".to_string(),
        ));
    };
    Coordinates::new(lat, lon).validate()?;

    let format = args.format.unwrap_or_else(|| config.defaults.format.clone());
    let formatter = get_formatter(&format)
        .ok_or_else(|| Error::Config(format!("Unknown format: {}", format)))?;

    let now = local_now();
    let service = TideService::from_config(&config);

    let report = match service.report(lat, lon, now) {
        Ok(report) => report,
        Err(ReportError::Invalid(e)) => {
            eprintln!("Invalid location: {}", e);
            if let Some(info) = e.location_info() {
                eprintln!(
                    "Nearest coastal reference: {} ({:.1} km)",
                    info.nearest_reference, info.coast_distance_km
                );
            }
            std::process::exit(1);
        }
        Err(e @ ReportError::Unavailable { .. }) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    if !args.no_save {
        record(&config, &report, now);
    }

    let output = formatter.format(&report)?;

    if let Some(path) = args.output {
        std::fs::write(&path, &output)?;
        eprintln!("Output written to {}", path);
    } else {
        println!("{}", output);
    }

    Ok(())
}

/// Record the query; a store failure never hides the report
fn record(config: &Config, report: &TideReport, now: NaiveDateTime) {
    let result = TideStore::open(&config.storage).and_then(|mut store| {
        store.record_report(report, now);
        store.save()
    });

    if let Err(e) = result {
        tracing::warn!("Failed to record query: {}", e);
    }
}

/// Print available output formats
fn list_formats() {
    println!("Available output formats:");
    for format in available_formats() {
        println!("  {:6} - {}", format.name, format.description);
    }
}
