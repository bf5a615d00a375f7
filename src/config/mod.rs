//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/tide-explore/config.toml

pub mod defaults;

use crate::constants::api::WILLYWEATHER_KEY_ENV;
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Default values for CLI output
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Target region and coastline
    #[serde(default)]
    pub region: RegionConfig,

    /// Reverse geocoding settings
    #[serde(default)]
    pub geocoding: GeocodingConfig,

    /// External tide provider settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Query store settings
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Default values for CLI output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default output format
    #[serde(default = "default_format")]
    pub format: String,

    /// Number of history records shown
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Number of popular locations shown
    #[serde(default = "default_popular_limit")]
    pub popular_limit: usize,

    /// Statistics window in days
    #[serde(default = "default_stats_days")]
    pub stats_days: i64,
}

/// A named coastal anchor used for distance-to-coast estimates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl ReferencePoint {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }
}

/// Target region: bounding box, address tokens and coastline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Human-readable region name
    #[serde(default = "default_region_name")]
    pub name: String,

    /// Short tag stored with each location (e.g. "NSW")
    #[serde(default = "default_region_tag")]
    pub tag: String,

    /// Country name stored with each location
    #[serde(default = "default_country")]
    pub country: String,

    #[serde(default = "default_min_lat")]
    pub min_lat: f64,

    #[serde(default = "default_max_lat")]
    pub max_lat: f64,

    #[serde(default = "default_min_lon")]
    pub min_lon: f64,

    #[serde(default = "default_max_lon")]
    pub max_lon: f64,

    /// Tokens (matched case-insensitively) that a geocoded address must contain
    #[serde(default = "default_address_tokens")]
    pub address_tokens: Vec<String>,

    /// Maximum distance to the nearest reference point to count as coastal
    #[serde(default = "default_coastal_threshold")]
    pub coastal_threshold_km: f64,

    /// Coastal reference points
    #[serde(default = "default_reference_points")]
    pub reference_points: Vec<ReferencePoint>,
}

/// Reverse geocoding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Attempt reverse geocoding at all
    #[serde(default = "default_geocoding_enabled")]
    pub enabled: bool,

    /// Request timeout in seconds
    #[serde(default = "default_geocoding_timeout")]
    pub timeout_secs: u64,

    /// User-Agent header sent to Nominatim
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// External tide provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// WillyWeather API key; empty means simulate
    #[serde(default)]
    pub api_key: String,

    /// Request timeout in seconds
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory of static files served at `/`
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

/// Query store settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Store file; defaults to the XDG data directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

// Default value functions for serde
fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}
fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}
fn default_popular_limit() -> usize {
    DEFAULT_POPULAR_LIMIT
}
fn default_stats_days() -> i64 {
    DEFAULT_STATS_DAYS
}
fn default_region_name() -> String {
    DEFAULT_REGION_NAME.to_string()
}
fn default_region_tag() -> String {
    DEFAULT_REGION_TAG.to_string()
}
fn default_country() -> String {
    DEFAULT_COUNTRY.to_string()
}
fn default_min_lat() -> f64 {
    DEFAULT_MIN_LAT
}
fn default_max_lat() -> f64 {
    DEFAULT_MAX_LAT
}
fn default_min_lon() -> f64 {
    DEFAULT_MIN_LON
}
fn default_max_lon() -> f64 {
    DEFAULT_MAX_LON
}
fn default_address_tokens() -> Vec<String> {
    DEFAULT_ADDRESS_TOKENS.iter().map(|t| t.to_string()).collect()
}
fn default_coastal_threshold() -> f64 {
    DEFAULT_COASTAL_THRESHOLD_KM
}
fn default_reference_points() -> Vec<ReferencePoint> {
    DEFAULT_REFERENCE_POINTS
        .iter()
        .map(|&(name, lat, lon)| ReferencePoint {
            name: name.to_string(),
            lat,
            lon,
        })
        .collect()
}
fn default_geocoding_enabled() -> bool {
    DEFAULT_GEOCODING_ENABLED
}
fn default_geocoding_timeout() -> u64 {
    DEFAULT_GEOCODING_TIMEOUT_SECS
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
fn default_provider_timeout() -> u64 {
    DEFAULT_PROVIDER_TIMEOUT_SECS
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_static_dir() -> String {
    DEFAULT_STATIC_DIR.to_string()
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            history_limit: default_history_limit(),
            popular_limit: default_popular_limit(),
            stats_days: default_stats_days(),
        }
    }
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            name: default_region_name(),
            tag: default_region_tag(),
            country: default_country(),
            min_lat: default_min_lat(),
            max_lat: default_max_lat(),
            min_lon: default_min_lon(),
            max_lon: default_max_lon(),
            address_tokens: default_address_tokens(),
            coastal_threshold_km: default_coastal_threshold(),
            reference_points: default_reference_points(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            enabled: default_geocoding_enabled(),
            timeout_secs: default_geocoding_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            timeout_secs: default_provider_timeout(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl RegionConfig {
    /// Whether a coordinate lies inside the bounding box (bounds inclusive)
    pub fn contains(&self, coords: Coordinates) -> bool {
        (self.min_lat..=self.max_lat).contains(&coords.lat)
            && (self.min_lon..=self.max_lon).contains(&coords.lng)
    }
}

impl ProviderConfig {
    /// The configured API key, falling back to `WILLYWEATHER_API_KEY`
    ///
    /// Returns None when neither is set (simulation mode).
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key_or(std::env::var(WILLYWEATHER_KEY_ENV).ok())
    }

    /// The configured API key, falling back to `env_key`
    ///
    /// Blank keys count as unset.
    pub fn api_key_or(&self, env_key: Option<String>) -> Option<String> {
        [Some(self.api_key.clone()), env_key]
            .into_iter()
            .flatten()
            .map(|k| k.trim().to_string())
            .find(|k| !k.is_empty())
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read config file: {}", e))
            })?;

            Self::parse(&content)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Parse and validate TOML configuration
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the classifier cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.region.reference_points.is_empty() {
            return Err(Error::Config(
                "region.reference_points must list at least one coastal point".to_string(),
            ));
        }
        Ok(())
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            Error::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(&path, content).map_err(|e| {
            Error::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["defaults", "format"] => Some(self.defaults.format.clone()),
            ["defaults", "history_limit"] => Some(self.defaults.history_limit.to_string()),
            ["defaults", "popular_limit"] => Some(self.defaults.popular_limit.to_string()),
            ["defaults", "stats_days"] => Some(self.defaults.stats_days.to_string()),

            ["region", "name"] => Some(self.region.name.clone()),
            ["region", "tag"] => Some(self.region.tag.clone()),
            ["region", "country"] => Some(self.region.country.clone()),
            ["region", "min_lat"] => Some(self.region.min_lat.to_string()),
            ["region", "max_lat"] => Some(self.region.max_lat.to_string()),
            ["region", "min_lon"] => Some(self.region.min_lon.to_string()),
            ["region", "max_lon"] => Some(self.region.max_lon.to_string()),
            ["region", "coastal_threshold_km"] => {
                Some(self.region.coastal_threshold_km.to_string())
            }

            ["geocoding", "enabled"] => Some(self.geocoding.enabled.to_string()),
            ["geocoding", "timeout_secs"] => Some(self.geocoding.timeout_secs.to_string()),
            ["geocoding", "user_agent"] => Some(self.geocoding.user_agent.clone()),

            ["provider", "api_key"] => Some(self.provider.api_key.clone()),
            ["provider", "timeout_secs"] => Some(self.provider.timeout_secs.to_string()),

            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),
            ["server", "static_dir"] => Some(self.server.static_dir.clone()),

            ["storage", "path"] => Some(
                self.storage
                    .path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            ),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["defaults", "format"] => {
                self.defaults.format = value.to_string();
            }
            ["defaults", "history_limit"] => {
                self.defaults.history_limit = parse_value(key, value)?;
            }
            ["defaults", "popular_limit"] => {
                self.defaults.popular_limit = parse_value(key, value)?;
            }
            ["defaults", "stats_days"] => {
                self.defaults.stats_days = parse_value(key, value)?;
            }

            ["region", "name"] => {
                self.region.name = value.to_string();
            }
            ["region", "tag"] => {
                self.region.tag = value.to_string();
            }
            ["region", "country"] => {
                self.region.country = value.to_string();
            }
            ["region", "min_lat"] => {
                self.region.min_lat = parse_value(key, value)?;
            }
            ["region", "max_lat"] => {
                self.region.max_lat = parse_value(key, value)?;
            }
            ["region", "min_lon"] => {
                self.region.min_lon = parse_value(key, value)?;
            }
            ["region", "max_lon"] => {
                self.region.max_lon = parse_value(key, value)?;
            }
            ["region", "coastal_threshold_km"] => {
                self.region.coastal_threshold_km = parse_value(key, value)?;
            }

            ["geocoding", "enabled"] => {
                self.geocoding.enabled = parse_value(key, value)?;
            }
            ["geocoding", "timeout_secs"] => {
                self.geocoding.timeout_secs = parse_value(key, value)?;
            }
            ["geocoding", "user_agent"] => {
                self.geocoding.user_agent = value.to_string();
            }

            ["provider", "api_key"] => {
                self.provider.api_key = value.to_string();
            }
            ["provider", "timeout_secs"] => {
                self.provider.timeout_secs = parse_value(key, value)?;
            }

            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = parse_value(key, value)?;
            }
            ["server", "static_dir"] => {
                self.server.static_dir = value.to_string();
            }

            ["storage", "path"] => {
                self.storage.path = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "defaults.format",
            "defaults.history_limit",
            "defaults.popular_limit",
            "defaults.stats_days",
            "region.name",
            "region.tag",
            "region.country",
            "region.min_lat",
            "region.max_lat",
            "region.min_lon",
            "region.max_lon",
            "region.coastal_threshold_km",
            "geocoding.enabled",
            "geocoding.timeout_secs",
            "geocoding.user_agent",
            "provider.api_key",
            "provider.timeout_secs",
            "server.host",
            "server.port",
            "server.static_dir",
            "storage.path",
        ]
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("Invalid value for {}: {}", key, value)))
}
