//! Reverse geocoding
//!
//! The classifier only needs one capability from a geocoder: turn a coordinate
//! into a structured address. Failures are expected (rate limits, timeouts,
//! no network) and callers treat them as "no enrichment".

pub mod nominatim;

use crate::config::GeocodingConfig;
use crate::coord::Coordinates;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Why a reverse geocoding call produced nothing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeocodeError {
    #[error("geocoding request timed out")]
    Timeout,

    #[error("geocoding service unavailable: {0}")]
    Unavailable(String),
}

/// A structured address as returned by the geocoder
///
/// Components are kept as a flat map (`state`, `county`, `city`, ...) since
/// providers disagree on which keys are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(flatten)]
    pub components: BTreeMap<String, String>,
}

impl Address {
    /// Build an address from `(key, value)` pairs
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            components: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    fn first_of(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .find_map(|k| self.components.get(*k))
            .map(String::as_str)
    }

    /// District or county name
    pub fn area(&self) -> Option<&str> {
        self.first_of(&["state_district", "county"])
    }

    /// City, town or village name
    pub fn locality(&self) -> Option<&str> {
        self.first_of(&["city", "town", "village"])
    }

    /// Lower-cased concatenation of every component, for token matching
    pub fn search_text(&self) -> String {
        self.components
            .values()
            .map(|v| v.to_lowercase())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Whether any of the tokens occurs in the address (case-insensitive)
    pub fn mentions_any(&self, tokens: &[String]) -> bool {
        let text = self.search_text();
        tokens
            .iter()
            .any(|t| !t.is_empty() && text.contains(&t.to_lowercase()))
    }
}

/// Capability for turning coordinates into addresses
///
/// `Ok(None)` means the service answered but has no address for the point.
pub trait ReverseGeocoder: Send + Sync {
    fn reverse(&self, coords: Coordinates) -> Result<Option<Address>, GeocodeError>;
}

/// Get the configured geocoder, or None when geocoding is disabled
pub fn get_geocoder(config: &GeocodingConfig) -> Option<Box<dyn ReverseGeocoder>> {
    if !config.enabled {
        return None;
    }
    match nominatim::NominatimBackend::new(config) {
        Ok(backend) => Some(Box::new(backend)),
        Err(e) => {
            tracing::warn!("Reverse geocoding disabled: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_prefers_state_district() {
        let address = Address::from_pairs([
            ("county", "Council of the City of Sydney"),
            ("state_district", "Sydney"),
        ]);
        assert_eq!(address.area(), Some("Sydney"));
    }

    #[test]
    fn test_locality_falls_back_to_town_then_village() {
        let town = Address::from_pairs([("town", "Eden"), ("village", "Boydtown")]);
        assert_eq!(town.locality(), Some("Eden"));

        let village = Address::from_pairs([("village", "Boydtown")]);
        assert_eq!(village.locality(), Some("Boydtown"));

        assert_eq!(Address::default().locality(), None);
    }

    #[test]
    fn test_mentions_any_is_case_insensitive() {
        let address = Address::from_pairs([("state", "New South Wales"), ("country", "Australia")]);
        let tokens = vec!["nsw".to_string(), "new south wales".to_string()];
        assert!(address.mentions_any(&tokens));

        let vic = Address::from_pairs([("state", "Victoria")]);
        assert!(!vic.mentions_any(&tokens));
    }

    #[test]
    fn test_address_deserializes_from_flat_json() {
        let json = r#"{"city": "Newcastle", "state": "New South Wales", "postcode": "2300"}"#;
        let address: Address = serde_json::from_str(json).unwrap();
        assert_eq!(address.locality(), Some("Newcastle"));
        assert_eq!(address.components.len(), 3);
    }

    #[test]
    fn test_disabled_geocoder() {
        let config = GeocodingConfig {
            enabled: false,
            ..GeocodingConfig::default()
        };
        assert!(get_geocoder(&config).is_none());
    }
}
