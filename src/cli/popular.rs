//! Popular command handler

use crate::config::Config;
use crate::error::Result;
use crate::store::TideStore;
use clap::Args;

/// Popular command arguments
#[derive(Args)]
pub struct PopularArgs {
    /// Number of locations to show
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Run the popular command
pub fn run(args: PopularArgs) -> Result<()> {
    let config = Config::load()?;
    let store = TideStore::open(&config.storage)?;
    let locations = store.most_queried(args.count.unwrap_or(config.defaults.popular_limit));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&locations)?);
        return Ok(());
    }

    if locations.is_empty() {
        println!("No locations queried yet.");
        return Ok(());
    }

    println!("Most queried locations:\n");
    for (rank, location) in locations.iter().enumerate() {
        println!(
            "  {}. {}, {} ({:.4}, {:.4}) - {} queries, last {}",
            rank + 1,
            location.locality,
            location.area,
            location.lat,
            location.lon,
            location.query_count,
            location.last_queried.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}
