//! tide-explore: coastal tide lookup
//!
//! Reports tide height and state for coastal locations inside a configured
//! region (New South Wales by default), records every query, and summarises
//! the recorded heights.
//!
//! ## Features
//!
//! - Region and coastline classification with optional reverse geocoding
//! - Deterministic tidal curve simulator when no provider key is configured
//! - WillyWeather provider when one is
//! - JSON query store with popularity, history and per-area statistics
//! - HTTP API + CLI interface
//!
//! ## Quick Start
//!
//! ```rust
//! use tide_explore::config::RegionConfig;
//! use tide_explore::region::Classifier;
//! use tide_explore::service::{local_now, TideService};
//! use tide_explore::tide::DataSource;
//!
//! let service = TideService::new(
//!     Classifier::new(RegionConfig::default(), None),
//!     DataSource::Simulated,
//! );
//!
//! let report = service.report(-33.865143, 151.2099, local_now()).unwrap();
//! println!(
//!     "{}: {:.2} m, {}",
//!     report.location.nearest_reference,
//!     report.tide.current.height_m,
//!     report.tide.current.status
//! );
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod coord;
pub mod error;
pub mod format;
pub mod geo;
pub mod region;
pub mod server;
pub mod service;
pub mod store;
pub mod tide;

// Re-export commonly used types
pub use config::Config;
pub use coord::{distance_km, Coordinates};
pub use error::{Error, Result};
pub use region::{ClassifyError, Classifier, LocationInfo};
pub use service::{TideReport, TideService};
pub use tide::{simulate, TidalSnapshot};
