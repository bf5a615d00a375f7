//! Data source selection
//!
//! With a provider credential the external API is used and failures become
//! `None`; without one the simulator answers every request.

use crate::config::ProviderConfig;
use crate::coord::Coordinates;
use crate::error::Result;
use crate::tide::willyweather::WillyWeatherProvider;
use crate::tide::{simulate, TidalSnapshot};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An external source of tide data
pub trait TideProvider: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Fetch and normalize tide data for a coordinate
    fn fetch(&self, coords: Coordinates, now: NaiveDateTime) -> Result<TidalSnapshot>;
}

/// Where a snapshot came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSourceKind {
    #[serde(rename = "API")]
    Api,
    Simulated,
}

impl DataSourceKind {
    /// The kind [`DataSource::from_config`] would select, without building it
    pub fn configured(config: &ProviderConfig) -> Self {
        if config.resolved_api_key().is_some() {
            Self::Api
        } else {
            Self::Simulated
        }
    }
}

impl fmt::Display for DataSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api => write!(f, "API"),
            Self::Simulated => write!(f, "Simulated"),
        }
    }
}

/// Chooses between an external provider and the simulator
pub enum DataSource {
    Provider(Box<dyn TideProvider>),
    Simulated,
}

impl DataSource {
    /// Build from configuration
    ///
    /// A provider that cannot even be constructed is logged and replaced by
    /// the simulator.
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::with_api_key(config.resolved_api_key(), config)
    }

    /// Build from an already resolved API key; `None` selects the simulator
    pub fn with_api_key(api_key: Option<String>, config: &ProviderConfig) -> Self {
        let Some(api_key) = api_key else {
            tracing::debug!("No provider API key configured, using simulated tides");
            return Self::Simulated;
        };

        match WillyWeatherProvider::new(api_key, config) {
            Ok(provider) => Self::Provider(Box::new(provider)),
            Err(e) => {
                tracing::warn!("Failed to create tide provider, using simulated tides: {}", e);
                Self::Simulated
            }
        }
    }

    pub fn kind(&self) -> DataSourceKind {
        match self {
            Self::Provider(_) => DataSourceKind::Api,
            Self::Simulated => DataSourceKind::Simulated,
        }
    }

    /// Tide data for a coordinate, or None when the provider failed
    ///
    /// Never None in simulated mode.
    pub fn get_tidal_data(&self, coords: Coordinates, now: NaiveDateTime) -> Option<TidalSnapshot> {
        match self {
            Self::Simulated => Some(simulate(coords, now)),
            Self::Provider(provider) => match provider.fetch(coords, now) {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    tracing::warn!("Tide provider {} failed: {}", provider.name(), e);
                    None
                }
            },
        }
    }
}

impl fmt::Debug for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provider(p) => write!(f, "DataSource::Provider({})", p.name()),
            Self::Simulated => write!(f, "DataSource::Simulated"),
        }
    }
}
