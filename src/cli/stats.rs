//! Stats command handler
//!
//! Per-area tide height statistics over a recent window.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::service::local_now;
use crate::store::TideStore;
use clap::Args;

/// Stats command arguments
#[derive(Args)]
pub struct StatsArgs {
    /// Window size in days
    #[arg(long, short = 'd')]
    pub days: Option<i64>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Run the stats command
pub fn run(args: StatsArgs) -> Result<()> {
    let config = Config::load()?;
    let days = args.days.unwrap_or(config.defaults.stats_days);
    if days <= 0 {
        return Err(Error::Config(format!("Days must be positive, got {}", days)));
    }

    let store = TideStore::open(&config.storage)?;
    let stats = store.statistics(days, local_now());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    if stats.is_empty() {
        println!("No tide records in the last {} days.", days);
        return Ok(());
    }

    println!("Tide heights by area, last {} days:\n", days);
    println!(
        "  {:<28} {:>8} {:>8} {:>8} {:>6}",
        "Area", "Avg (m)", "Max (m)", "Min (m)", "Count"
    );
    for s in &stats {
        println!(
            "  {:<28} {:>8.2} {:>8.2} {:>8.2} {:>6}",
            s.area, s.avg_height_m, s.max_height_m, s.min_height_m, s.count
        );
    }

    Ok(())
}
