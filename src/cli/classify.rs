//! Classify command handler
//!
//! Runs the region and coastline checks without fetching tide data.

use crate::config::Config;
use crate::coord::Coordinates;
use crate::error::Result;
use crate::region::LocationInfo;
use crate::service::TideService;
use clap::Args;

/// Classify command arguments
#[derive(Args)]
pub struct ClassifyArgs {
    /// Latitude
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Run the classify command
pub fn run(args: ClassifyArgs) -> Result<()> {
    Coordinates::new(args.lat, args.lon).validate()?;

    let config = Config::load()?;
    let service = TideService::from_config(&config);

    match service.classify(args.lat, args.lon) {
        Ok(info) => {
            if args.json {
                let value = serde_json::json!({ "valid": true, "location": info });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("Valid coastal location");
                print_info(&info);
            }
            Ok(())
        }
        Err(e) => {
            if args.json {
                let value = serde_json::json!({
                    "valid": false,
                    "error": e.to_string(),
                    "code": e.code(),
                    "location": e.location_info(),
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("Invalid: {}", e);
                if let Some(info) = e.location_info() {
                    print_info(info);
                }
            }
            std::process::exit(1);
        }
    }
}

fn print_info(info: &LocationInfo) {
    println!("  Position: ({:.6}, {:.6})", info.lat, info.lon);
    println!("  Region: {}, {}", info.region, info.country);
    println!("  Area: {}", info.area);
    println!("  Locality: {}", info.locality);
    println!(
        "  Coast distance: {:.1} km (nearest: {})",
        info.coast_distance_km, info.nearest_reference
    );
}
