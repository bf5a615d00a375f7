//! The two entry points used by the CLI and the server
//!
//! [`TideService::classify`] validates and describes a coordinate;
//! [`TideService::get_tidal_data`] resolves tide data for it. [`TideService::report`]
//! chains the two, which is what both front ends actually want.

use crate::config::Config;
use crate::coord::Coordinates;
use crate::geo::get_geocoder;
use crate::region::{ClassifyError, Classifier, LocationInfo};
use crate::tide::{DataSource, DataSourceKind, TidalSnapshot};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A classified location with its tide data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TideReport {
    pub location: LocationInfo,
    pub tide: TidalSnapshot,
    pub source: DataSourceKind,
}

/// Why no report could be produced
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReportError {
    #[error(transparent)]
    Invalid(#[from] ClassifyError),

    #[error("Tide data is currently unavailable")]
    Unavailable { location: Box<LocationInfo> },
}

impl ReportError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Invalid(e) => e.code(),
            Self::Unavailable { .. } => "DATA_UNAVAILABLE",
        }
    }
}

/// Local wall-clock time, the time base for every tide value
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Classifier plus data source, built from configuration
pub struct TideService {
    classifier: Classifier,
    source: DataSource,
}

impl TideService {
    pub fn new(classifier: Classifier, source: DataSource) -> Self {
        Self { classifier, source }
    }

    /// Build with the configured region, geocoder and provider
    ///
    /// Creates blocking HTTP clients; call from a blocking context.
    pub fn from_config(config: &Config) -> Self {
        let geocoder = get_geocoder(&config.geocoding);
        Self {
            classifier: Classifier::new(config.region.clone(), geocoder),
            source: DataSource::from_config(&config.provider),
        }
    }

    pub fn source_kind(&self) -> DataSourceKind {
        self.source.kind()
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Validate a coordinate against the region and coastline
    pub fn classify(&self, lat: f64, lon: f64) -> Result<LocationInfo, ClassifyError> {
        self.classifier.classify(Coordinates::new(lat, lon))
    }

    /// Tide data at the current local time
    pub fn get_tidal_data(&self, lat: f64, lon: f64) -> Option<TidalSnapshot> {
        self.get_tidal_data_at(lat, lon, local_now())
    }

    pub fn get_tidal_data_at(&self, lat: f64, lon: f64, now: NaiveDateTime) -> Option<TidalSnapshot> {
        self.source.get_tidal_data(Coordinates::new(lat, lon), now)
    }

    /// Classify, then fetch tide data for a valid location
    pub fn report(&self, lat: f64, lon: f64, now: NaiveDateTime) -> Result<TideReport, ReportError> {
        let location = self.classify(lat, lon)?;

        match self.get_tidal_data_at(lat, lon, now) {
            Some(tide) => Ok(TideReport {
                location,
                tide,
                source: self.source_kind(),
            }),
            None => Err(ReportError::Unavailable {
                location: Box::new(location),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegionConfig;
    use crate::error::{Error, Result};
    use crate::tide::{simulate, TideProvider};
    use chrono::NaiveDate;

    struct DownProvider;

    impl TideProvider for DownProvider {
        fn name(&self) -> &'static str {
            "down"
        }

        fn fetch(&self, _coords: Coordinates, _now: NaiveDateTime) -> Result<TidalSnapshot> {
            Err(Error::Provider("timeout".to_string()))
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn offline_service() -> TideService {
        TideService::new(
            Classifier::new(RegionConfig::default(), None),
            DataSource::Simulated,
        )
    }

    #[test]
    fn test_report_for_sydney() {
        let service = offline_service();
        let report = service.report(-33.865143, 151.2099, now()).unwrap();
        assert_eq!(report.source, DataSourceKind::Simulated);
        assert_eq!(report.location.nearest_reference, "Sydney");
        assert_eq!(report.tide, simulate(Coordinates::new(-33.865143, 151.2099), now()));
    }

    #[test]
    fn test_report_rejects_outside_region() {
        let service = offline_service();
        let err = service.report(-10.0, 145.0, now()).unwrap_err();
        assert_eq!(err.code(), "OUTSIDE_REGION");
    }

    #[test]
    fn test_report_provider_down() {
        let service = TideService::new(
            Classifier::new(RegionConfig::default(), None),
            DataSource::Provider(Box::new(DownProvider)),
        );
        let err = service.report(-33.865143, 151.2099, now()).unwrap_err();
        assert_eq!(err.code(), "DATA_UNAVAILABLE");
        assert!(service.get_tidal_data_at(-33.865143, 151.2099, now()).is_none());
    }

    #[test]
    fn test_simulated_get_tidal_data_never_none() {
        let service = offline_service();
        assert!(service.get_tidal_data(-33.865143, 151.2099).is_some());
        // Data lookup does not depend on classification
        assert!(service.get_tidal_data(-10.0, 145.0).is_some());
    }

    #[test]
    fn test_classify_entry_point() {
        let service = offline_service();
        assert!(service.classify(-33.865143, 151.2099).is_ok());
        assert_eq!(
            service.classify(-32.2569, 148.6011).unwrap_err().code(),
            "TOO_FAR_FROM_COAST"
        );
    }
}
