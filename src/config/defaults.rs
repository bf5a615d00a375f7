//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Default region: New South Wales, Australia
pub const DEFAULT_REGION_NAME: &str = "New South Wales";

/// Short tag stored alongside every location
pub const DEFAULT_REGION_TAG: &str = "NSW";

/// Country the region belongs to
pub const DEFAULT_COUNTRY: &str = "Australia";

/// Region bounding box (approximate NSW extent)
pub const DEFAULT_MIN_LAT: f64 = -37.5;
pub const DEFAULT_MAX_LAT: f64 = -28.0;
pub const DEFAULT_MIN_LON: f64 = 140.999922;
pub const DEFAULT_MAX_LON: f64 = 153.638747;

/// Lower-case tokens an address must contain to be inside the region
pub const DEFAULT_ADDRESS_TOKENS: &[&str] = &["nsw", "new south wales"];

/// Maximum distance from a reference point to count as coastal
pub const DEFAULT_COASTAL_THRESHOLD_KM: f64 = 20.0;

/// Coastal reference points (name, lat, lon)
pub const DEFAULT_REFERENCE_POINTS: &[(&str, f64, f64)] = &[
    ("Sydney", -33.865143, 151.209900),
    ("Newcastle", -32.916668, 151.750000),
    ("Wollongong", -34.425072, 150.893143),
    ("Port Macquarie", -31.433334, 152.900000),
    ("Coffs Harbour", -30.296665, 153.114136),
    ("Byron Bay", -28.647980, 153.618698),
    ("Batemans Bay", -35.708332, 150.174728),
    ("Eden", -37.063755, 149.900543),
    ("Port Stephens", -32.716667, 152.166672),
    ("Jervis Bay", -35.040279, 150.727844),
];

/// Whether reverse geocoding is attempted
pub const DEFAULT_GEOCODING_ENABLED: bool = true;

/// Reverse geocoding timeout in seconds
pub const DEFAULT_GEOCODING_TIMEOUT_SECS: u64 = 5;

/// User-Agent sent to Nominatim (required by its usage policy)
pub const DEFAULT_USER_AGENT: &str = "tide-explore/0.1.0";

/// Tide provider timeout in seconds
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 10;

/// Default output format
pub const DEFAULT_FORMAT: &str = "text";

/// Default number of history records shown
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Default number of popular locations shown
pub const DEFAULT_POPULAR_LIMIT: usize = 5;

/// Default statistics window in days
pub const DEFAULT_STATS_DAYS: i64 = 30;

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5001;

/// Default static file directory served by `serve`
pub const DEFAULT_STATIC_DIR: &str = "static";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "tide-explore";
