//! Tide data model, simulator and data sources
//!
//! A [`TidalSnapshot`] is the unit every data source produces: the current
//! state, the next few turning points, and a 48-hour series for charting.
//! Times are local wall-clock values; heights are metres rounded to the
//! centimetre.

pub mod simulator;
pub mod source;
pub mod willyweather;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use simulator::simulate;
pub use source::{DataSource, DataSourceKind, TideProvider};

/// Qualitative tide level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TideStatus {
    #[serde(rename = "Near High")]
    NearHigh,
    Mid,
    #[serde(rename = "Near Low")]
    NearLow,
    /// Reported by an external provider
    High,
    /// Reported by an external provider
    Low,
}

impl fmt::Display for TideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NearHigh => write!(f, "Near High"),
            Self::Mid => write!(f, "Mid"),
            Self::NearLow => write!(f, "Near Low"),
            Self::High => write!(f, "High"),
            Self::Low => write!(f, "Low"),
        }
    }
}

/// Direction the water is moving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Rising,
    Falling,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rising => write!(f, "Rising"),
            Self::Falling => write!(f, "Falling"),
        }
    }
}

/// Kind of turning point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TideType {
    High,
    Low,
}

impl TideType {
    /// The other kind of turning point
    pub fn opposite(self) -> Self {
        match self {
            Self::High => Self::Low,
            Self::Low => Self::High,
        }
    }
}

impl fmt::Display for TideType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "High"),
            Self::Low => write!(f, "Low"),
        }
    }
}

/// Tag on a chart point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointType {
    Normal,
    High,
    Low,
}

impl From<TideType> for PointType {
    fn from(t: TideType) -> Self {
        match t {
            TideType::High => Self::High,
            TideType::Low => Self::Low,
        }
    }
}

/// Tide state at the time of the query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentTide {
    pub height_m: f64,
    pub status: TideStatus,
    pub trend: Trend,
    pub timestamp: NaiveDateTime,
}

/// An upcoming high or low tide
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEvent {
    #[serde(rename = "type")]
    pub kind: TideType,
    pub time: NaiveDateTime,
    pub height_m: f64,
}

/// One sample of the chart series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub time: NaiveDateTime,
    pub height_m: f64,
    #[serde(rename = "type")]
    pub kind: PointType,
}

/// Current state, forecast and chart series for one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TidalSnapshot {
    pub current: CurrentTide,
    pub forecast: Vec<ForecastEvent>,
    pub chart_data: Vec<ChartPoint>,
}

/// Round a height to the centimetre
pub fn round_cm(height_m: f64) -> f64 {
    (height_m * 100.0).round() / 100.0
}
