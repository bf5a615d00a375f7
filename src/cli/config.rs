//! Config command handler
//!
//! View and modify configuration settings.

use crate::config::Config;
use crate::error::{Error, Result};
use clap::Args;

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration key (e.g., "region.coastal_threshold_km")
    pub key: Option<String>,

    /// Value to set (if not provided, shows current value)
    #[arg(requires = "key")]
    pub value: Option<String>,

    /// Show config file path
    #[arg(long)]
    pub path: bool,

    /// Reset config to defaults
    #[arg(long)]
    pub reset: bool,

    /// List the settable keys
    #[arg(long)]
    pub keys: bool,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    if args.path {
        println!("{}", Config::config_path()?.display());
        return Ok(());
    }

    if args.keys {
        for key in Config::available_keys() {
            println!("{}", key);
        }
        return Ok(());
    }

    if args.reset {
        Config::default().save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    let mut config = Config::load()?;

    match (args.key, args.value) {
        (None, _) => show_all_config(&config),
        (Some(key), None) => {
            let value = config.get(&key).ok_or_else(|| {
                Error::Config(format!(
                    "Unknown config key: {} (see `tide-explore config --keys`)",
                    key
                ))
            })?;
            println!("{}", value);
        }
        (Some(key), Some(value)) => {
            config.set(&key, &value)?;
            config.save()?;
            println!("{} = {}", key, value);
        }
    }

    Ok(())
}

/// Display all configuration values
fn show_all_config(config: &Config) {
    println!("[defaults]");
    println!("format = \"{}\"", config.defaults.format);
    println!("history_limit = {}", config.defaults.history_limit);
    println!("popular_limit = {}", config.defaults.popular_limit);
    println!("stats_days = {}", config.defaults.stats_days);
    println!();

    let region = &config.region;
    println!("[region]");
    println!("name = \"{}\"", region.name);
    println!("tag = \"{}\"", region.tag);
    println!("country = \"{}\"", region.country);
    println!("min_lat = {}", region.min_lat);
    println!("max_lat = {}", region.max_lat);
    println!("min_lon = {}", region.min_lon);
    println!("max_lon = {}", region.max_lon);
    println!("address_tokens = {:?}", region.address_tokens);
    println!("coastal_threshold_km = {}", region.coastal_threshold_km);
    println!("# {} reference points", region.reference_points.len());
    println!();

    println!("[geocoding]");
    println!("enabled = {}", config.geocoding.enabled);
    println!("timeout_secs = {}", config.geocoding.timeout_secs);
    println!("user_agent = \"{}\"", config.geocoding.user_agent);
    println!();

    println!("[provider]");
    if config.provider.api_key.is_empty() {
        println!("api_key = \"\" # not configured, tides are simulated");
    } else {
        println!("api_key = \"***\" # configured");
    }
    println!("timeout_secs = {}", config.provider.timeout_secs);
    println!();

    println!("[server]");
    println!("host = \"{}\"", config.server.host);
    println!("port = {}", config.server.port);
    println!("static_dir = \"{}\"", config.server.static_dir);
    println!();

    println!("[storage]");
    match &config.storage.path {
        Some(path) => println!("path = \"{}\"", path.display()),
        None => println!("# path = default data directory"),
    }
}
