//! Nominatim reverse geocoding backend (OpenStreetMap)
//!
//! Uses the free Nominatim API. Its usage policy requires an identifying
//! User-Agent and allows roughly one request per second.

use crate::config::GeocodingConfig;
use crate::constants::api::NOMINATIM_URL;
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::geo::{Address, GeocodeError, ReverseGeocoder};
use serde::Deserialize;
use std::time::Duration;

/// Nominatim geocoding backend
#[derive(Debug, Clone)]
pub struct NominatimBackend {
    client: reqwest::blocking::Client,
    base_url: String,
}

/// Nominatim reverse response
///
/// Points in the ocean come back as `{"error": "Unable to geocode"}`.
#[derive(Debug, Deserialize)]
struct NominatimReverse {
    #[serde(default)]
    address: Option<Address>,
    #[serde(default)]
    error: Option<String>,
}

impl NominatimBackend {
    /// Create a new Nominatim backend
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        Self::with_base_url(config, NOMINATIM_URL)
    }

    /// Create a backend against a different Nominatim instance
    pub fn with_base_url(config: &GeocodingConfig, base_url: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn reverse_url(&self, coords: Coordinates) -> String {
        format!(
            "{}/reverse?lat={}&lon={}&format=json&accept-language=en",
            self.base_url, coords.lat, coords.lng
        )
    }

    fn classify_error(err: reqwest::Error) -> GeocodeError {
        if err.is_timeout() {
            GeocodeError::Timeout
        } else {
            GeocodeError::Unavailable(err.to_string())
        }
    }

    /// Parse a reverse geocoding response body
    fn parse_reverse(body: &str) -> std::result::Result<Option<Address>, GeocodeError> {
        let parsed: NominatimReverse = serde_json::from_str(body).map_err(|e| {
            GeocodeError::Unavailable(format!("Failed to parse Nominatim response: {}", e))
        })?;

        if let Some(msg) = parsed.error {
            tracing::debug!("Nominatim has no address: {}", msg);
            return Ok(None);
        }

        Ok(parsed.address.filter(|a| !a.is_empty()))
    }
}

impl ReverseGeocoder for NominatimBackend {
    fn reverse(&self, coords: Coordinates) -> std::result::Result<Option<Address>, GeocodeError> {
        let url = self.reverse_url(coords);
        tracing::debug!("Reverse geocoding {}", url);

        let response = self.client.get(&url).send().map_err(Self::classify_error)?;

        if !response.status().is_success() {
            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Ok(None);
            }
            return Err(GeocodeError::Unavailable(format!(
                "Nominatim returned status: {}",
                response.status()
            )));
        }

        let body = response.text().map_err(Self::classify_error)?;
        Self::parse_reverse(&body)
    }
}
