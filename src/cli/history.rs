//! History command handler
//!
//! View and manage recorded queries.

use crate::config::Config;
use crate::coord::Coordinates;
use crate::error::Result;
use crate::store::{HistoryEntry, TideStore};
use clap::Args;

/// History command arguments
#[derive(Args)]
pub struct HistoryArgs {
    /// Latitude of the location to show (with --lon)
    #[arg(long, allow_hyphen_values = true, requires = "lon")]
    pub lat: Option<f64>,

    /// Longitude of the location to show (with --lat)
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    pub lon: Option<f64>,

    /// Number of entries to show
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Delete all recorded queries
    #[arg(long, conflicts_with_all = ["lat", "lon", "count"])]
    pub clear: bool,
}

/// Run the history command
pub fn run(args: HistoryArgs) -> Result<()> {
    let config = Config::load()?;
    let mut store = TideStore::open(&config.storage)?;

    if args.clear {
        let count = store.record_count();
        store.clear();
        store.save()?;
        println!("Cleared {} tide records.", count);
        return Ok(());
    }

    let count = args.count.unwrap_or(config.defaults.history_limit);
    let entries = match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => store.location_history(Coordinates::new(lat, lon), count),
        _ => store.recent(count),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No history entries.");
        return Ok(());
    }

    println!("Recent queries ({} of {}):\n", entries.len(), store.record_count());
    for entry in &entries {
        print_entry(entry);
    }

    Ok(())
}

fn print_entry(entry: &HistoryEntry) {
    let record = &entry.record;
    let location = &entry.location;

    println!(
        "  {} - {}, {}\n    ({:.4}, {:.4}) | {:.2} m {} ({}) | {}\n    {}\n",
        &record.id.to_string()[..8],
        location.locality,
        location.area,
        location.lat,
        location.lon,
        record.height_m,
        record.status,
        record.trend,
        record.data_source,
        record.timestamp.format("%Y-%m-%d %H:%M:%S")
    );
}
