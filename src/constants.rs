//! Centralized constants for the tide-explore crate
//!
//! This module consolidates constants that are used across multiple modules
//! to avoid duplication and ensure consistency.

/// Geographic constants
pub mod geo {
    /// Mean Earth radius in kilometres (spherical approximation)
    pub const EARTH_RADIUS_KM: f64 = 6371.0;

    /// Two locations closer than this (in degrees, per axis) are the same place
    pub const SAME_PLACE_TOLERANCE_DEG: f64 = 0.01;
}

/// External API endpoints
pub mod api {
    /// OpenStreetMap Nominatim geocoding API
    pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

    /// WillyWeather API root (the key is part of the path)
    pub const WILLYWEATHER_URL: &str = "https://api.willyweather.com.au/v2";

    /// Environment variable consulted when no provider key is configured
    pub const WILLYWEATHER_KEY_ENV: &str = "WILLYWEATHER_API_KEY";
}

/// Tide model constants
pub mod tide {
    /// Lunar semi-diurnal period in hours
    pub const PERIOD_HOURS: f64 = 12.42;

    /// Mean sea level in metres
    pub const BASELINE_M: f64 = 1.5;

    /// Smallest simulated amplitude in metres
    pub const MIN_AMPLITUDE_M: f64 = 0.8;

    /// Number of forecast events reported
    pub const FORECAST_EVENTS: usize = 4;

    /// Chart points (48 hours at 30 minute spacing)
    pub const CHART_POINTS: usize = 96;

    /// Minutes between chart points
    pub const CHART_STEP_MINUTES: i64 = 30;

    /// Every this many chart points is tagged as a turning point
    pub const CHART_MARKER_EVERY: usize = 12;
}
