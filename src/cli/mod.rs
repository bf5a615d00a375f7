//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod classify;
pub mod config;
pub mod history;
pub mod popular;
pub mod serve;
pub mod stats;
pub mod tide;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Tide lookup for coastal locations
#[derive(Parser)]
#[command(name = "tide-explore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show tide data for a location
    Tide(tide::TideArgs),

    /// Check whether a location is a valid coastal location
    Classify(classify::ClassifyArgs),

    /// Show past queries
    History(history::HistoryArgs),

    /// Show the most queried locations
    Popular(popular::PopularArgs),

    /// Show tide height statistics per area
    Stats(stats::StatsArgs),

    /// Manage configuration
    Config(config::ConfigArgs),

    /// Start web server (foreground)
    Serve(serve::ServeArgs),
}

/// Install the tracing subscriber; `RUST_LOG` overrides the default level
fn init_logging(default_level: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

/// Run the CLI
pub fn run() -> crate::error::Result<()> {
    let cli = Cli::parse();

    let level = match cli.command {
        Commands::Serve(_) => "info",
        _ => "warn",
    };
    init_logging(level);

    match cli.command {
        Commands::Tide(args) => tide::run(args),
        Commands::Classify(args) => classify::run(args),
        Commands::History(args) => history::run(args),
        Commands::Popular(args) => popular::run(args),
        Commands::Stats(args) => stats::run(args),
        Commands::Config(args) => config::run(args),
        Commands::Serve(args) => serve::run(args),
    }
}
