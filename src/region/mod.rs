//! Region and coastal classification
//!
//! Decides whether a coordinate is a coastal location inside the configured
//! region, and produces the descriptive [`LocationInfo`] for it.
//!
//! Checks run in order:
//! 1. Bounding box (cheap, no network)
//! 2. Reverse geocoding, if a geocoder is available. A geocoder failure is
//!    ignored; an address that does not mention the region overrides the box.
//! 3. Distance to the nearest coastal reference point; an empty table
//!    rejects every location

use crate::config::{ReferencePoint, RegionConfig};
use crate::coord::{distance_km, Coordinates};
use crate::geo::{Address, ReverseGeocoder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Placeholder for names the geocoder could not supply
pub const UNKNOWN: &str = "Unknown";

/// Descriptive record for a classified coordinate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInfo {
    pub lat: f64,
    pub lon: f64,
    /// Region tag, e.g. "NSW"
    pub region: String,
    pub country: String,
    /// District or county
    pub area: String,
    /// City, town or village
    pub locality: String,
    /// Distance to the nearest coastal reference point
    pub coast_distance_km: f64,
    /// Name of that reference point
    pub nearest_reference: String,
}

impl LocationInfo {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }
}

/// Why a coordinate was rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassifyError {
    #[error("Location is outside {region} boundaries")]
    OutsideRegion { region: String },

    #[error("Location is outside {region} according to geocoding")]
    GeocodeDisagreement { region: String },

    #[error("No coastal reference points are configured for {region}")]
    NoReferencePoints { region: String },

    #[error("Location is {:.1} km from the coast (limit {threshold_km} km)", .info.coast_distance_km)]
    TooFarFromCoast {
        info: Box<LocationInfo>,
        threshold_km: f64,
    },
}

impl ClassifyError {
    /// Stable machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::OutsideRegion { .. } => "OUTSIDE_REGION",
            Self::GeocodeDisagreement { .. } => "GEOCODE_DISAGREEMENT",
            Self::NoReferencePoints { .. } => "NO_REFERENCE_POINTS",
            Self::TooFarFromCoast { .. } => "TOO_FAR_FROM_COAST",
        }
    }

    /// Location details, when classification got as far as computing them
    pub fn location_info(&self) -> Option<&LocationInfo> {
        match self {
            Self::TooFarFromCoast { info, .. } => Some(info),
            _ => None,
        }
    }
}

/// Nearest reference point and its distance, or None for an empty table
pub fn nearest_reference(
    coords: Coordinates,
    points: &[ReferencePoint],
) -> Option<(&ReferencePoint, f64)> {
    points
        .iter()
        .map(|p| (p, distance_km(coords, p.coordinates())))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// Region/coastal classifier
pub struct Classifier {
    region: RegionConfig,
    geocoder: Option<Box<dyn ReverseGeocoder>>,
}

impl Classifier {
    /// Create a classifier; pass `None` to classify on the bounding box alone
    pub fn new(region: RegionConfig, geocoder: Option<Box<dyn ReverseGeocoder>>) -> Self {
        Self { region, geocoder }
    }

    pub fn region(&self) -> &RegionConfig {
        &self.region
    }

    /// Classify a coordinate
    ///
    /// Returns the enriched location on success. A location that is in the
    /// region but too far from the coast is rejected with
    /// [`ClassifyError::TooFarFromCoast`], which still carries its info.
    pub fn classify(&self, coords: Coordinates) -> Result<LocationInfo, ClassifyError> {
        if !self.region.contains(coords) {
            return Err(ClassifyError::OutsideRegion {
                region: self.region.tag.clone(),
            });
        }

        let mut area = UNKNOWN.to_string();
        let mut locality = UNKNOWN.to_string();

        if let Some(address) = self.lookup_address(coords) {
            if !address.mentions_any(&self.region.address_tokens) {
                tracing::info!(
                    "Geocoded address for ({}, {}) is not in {}",
                    coords.lat,
                    coords.lng,
                    self.region.tag
                );
                return Err(ClassifyError::GeocodeDisagreement {
                    region: self.region.tag.clone(),
                });
            }
            area = address
                .area()
                .map(str::to_string)
                .unwrap_or_else(|| format!("{} {} Region", UNKNOWN, self.region.tag));
            locality = address.locality().unwrap_or(UNKNOWN).to_string();
        }

        let Some((nearest, coast_distance_km)) =
            nearest_reference(coords, &self.region.reference_points)
        else {
            return Err(ClassifyError::NoReferencePoints {
                region: self.region.tag.clone(),
            });
        };

        let info = LocationInfo {
            lat: coords.lat,
            lon: coords.lng,
            region: self.region.tag.clone(),
            country: self.region.country.clone(),
            area,
            locality,
            coast_distance_km,
            nearest_reference: nearest.name.clone(),
        };

        if coast_distance_km <= self.region.coastal_threshold_km {
            Ok(info)
        } else {
            Err(ClassifyError::TooFarFromCoast {
                info: Box::new(info),
                threshold_km: self.region.coastal_threshold_km,
            })
        }
    }

    fn lookup_address(&self, coords: Coordinates) -> Option<Address> {
        let geocoder = self.geocoder.as_ref()?;
        match geocoder.reverse(coords) {
            Ok(address) => address,
            Err(e) => {
                tracing::warn!("Reverse geocoding failed, using bounding box only: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeocodeError;

    /// Geocoder that always gives the same answer
    struct StubGeocoder(Result<Option<Address>, GeocodeError>);

    impl ReverseGeocoder for StubGeocoder {
        fn reverse(&self, _coords: Coordinates) -> Result<Option<Address>, GeocodeError> {
            self.0.clone()
        }
    }

    fn classifier_with(result: Result<Option<Address>, GeocodeError>) -> Classifier {
        Classifier::new(RegionConfig::default(), Some(Box::new(StubGeocoder(result))))
    }

    fn sydney() -> Coordinates {
        Coordinates::new(-33.865143, 151.2099)
    }

    fn nsw_address() -> Address {
        Address::from_pairs([
            ("state_district", "Sydney"),
            ("city", "Sydney"),
            ("state", "New South Wales"),
            ("country", "Australia"),
        ])
    }

    #[test]
    fn test_outside_box_is_rejected() {
        let classifier = Classifier::new(RegionConfig::default(), None);
        let err = classifier.classify(Coordinates::new(-10.0, 145.0)).unwrap_err();
        assert_eq!(
            err,
            ClassifyError::OutsideRegion {
                region: "NSW".to_string()
            }
        );
        assert_eq!(err.code(), "OUTSIDE_REGION");
    }

    #[test]
    fn test_outside_box_ignores_geocoder() {
        // Even a geocoder claiming NSW cannot rescue a point outside the box
        let classifier = classifier_with(Ok(Some(nsw_address())));
        let err = classifier.classify(Coordinates::new(-10.0, 145.0)).unwrap_err();
        assert_eq!(err.code(), "OUTSIDE_REGION");

        let err = classifier.classify(Coordinates::new(-33.0, 155.0)).unwrap_err();
        assert_eq!(err.code(), "OUTSIDE_REGION");
    }

    #[test]
    fn test_sydney_without_geocoder() {
        let classifier = Classifier::new(RegionConfig::default(), None);
        let info = classifier.classify(sydney()).unwrap();
        assert_eq!(info.area, UNKNOWN);
        assert_eq!(info.locality, UNKNOWN);
        assert_eq!(info.region, "NSW");
        assert_eq!(info.country, "Australia");
        assert_eq!(info.coast_distance_km, 0.0);
        assert_eq!(info.nearest_reference, "Sydney");
    }

    #[test]
    fn test_sydney_with_geocoder() {
        let classifier = classifier_with(Ok(Some(nsw_address())));
        let info = classifier.classify(sydney()).unwrap();
        assert_eq!(info.area, "Sydney");
        assert_eq!(info.locality, "Sydney");
    }

    #[test]
    fn test_address_without_area_gets_region_placeholder() {
        let address = Address::from_pairs([("town", "Eden"), ("state", "NSW")]);
        let classifier = classifier_with(Ok(Some(address)));
        let info = classifier.classify(Coordinates::new(-37.07, 149.9)).unwrap();
        assert_eq!(info.area, "Unknown NSW Region");
        assert_eq!(info.locality, "Eden");
    }

    #[test]
    fn test_geocoder_disagreement_overrides_box() {
        let address = Address::from_pairs([("state", "Victoria"), ("country", "Australia")]);
        let classifier = classifier_with(Ok(Some(address)));
        let err = classifier.classify(sydney()).unwrap_err();
        assert_eq!(err.code(), "GEOCODE_DISAGREEMENT");
        assert!(err.location_info().is_none());
    }

    #[test]
    fn test_geocoder_timeout_is_silent() {
        let classifier = classifier_with(Err(GeocodeError::Timeout));
        let info = classifier.classify(sydney()).unwrap();
        assert_eq!(info.area, UNKNOWN);
        assert_eq!(info.locality, UNKNOWN);
    }

    #[test]
    fn test_geocoder_unavailable_is_silent() {
        let classifier =
            classifier_with(Err(GeocodeError::Unavailable("503".to_string())));
        assert!(classifier.classify(sydney()).is_ok());
    }

    #[test]
    fn test_no_address_keeps_defaults() {
        let classifier = classifier_with(Ok(None));
        let info = classifier.classify(sydney()).unwrap();
        assert_eq!(info.area, UNKNOWN);
    }

    #[test]
    fn test_inland_location_too_far_from_coast() {
        // Dubbo: well inside the box, hundreds of km inland
        let classifier = Classifier::new(RegionConfig::default(), None);
        let err = classifier.classify(Coordinates::new(-32.2569, 148.6011)).unwrap_err();
        assert_eq!(err.code(), "TOO_FAR_FROM_COAST");

        let info = err.location_info().unwrap();
        assert!(info.coast_distance_km.is_finite());
        assert!(info.coast_distance_km > 20.0);
        assert!(err.to_string().contains("km from the coast"));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let mut region = RegionConfig::default();
        // ~11.1 km north of the Sydney reference point
        let coords = Coordinates::new(-33.765143, 151.2099);
        let d = distance_km(coords, sydney());
        region.coastal_threshold_km = d;
        let classifier = Classifier::new(region, None);
        assert!(classifier.classify(coords).is_ok());
    }

    #[test]
    fn test_alternate_region() {
        let region = RegionConfig {
            name: "Tasmania".to_string(),
            tag: "TAS".to_string(),
            min_lat: -43.7,
            max_lat: -39.5,
            min_lon: 143.8,
            max_lon: 148.5,
            address_tokens: vec!["tasmania".to_string()],
            reference_points: vec![ReferencePoint {
                name: "Hobart".to_string(),
                lat: -42.8821,
                lon: 147.3272,
            }],
            ..RegionConfig::default()
        };
        let classifier = Classifier::new(region, None);
        let info = classifier.classify(Coordinates::new(-42.9, 147.33)).unwrap();
        assert_eq!(info.region, "TAS");
        assert_eq!(info.nearest_reference, "Hobart");
        assert_eq!(classifier.classify(sydney()).unwrap_err().code(), "OUTSIDE_REGION");
    }

    #[test]
    fn test_nearest_reference() {
        let region = RegionConfig::default();
        let (point, d) =
            nearest_reference(Coordinates::new(-32.92, 151.76), &region.reference_points).unwrap();
        assert_eq!(point.name, "Newcastle");
        assert!(d < 2.0);
        assert!(nearest_reference(sydney(), &[]).is_none());
    }

    #[test]
    fn test_empty_reference_table_rejects() {
        let region = RegionConfig {
            reference_points: Vec::new(),
            ..RegionConfig::default()
        };
        let err = Classifier::new(region, None).classify(sydney()).unwrap_err();
        assert_eq!(err.code(), "NO_REFERENCE_POINTS");
        assert!(err.location_info().is_none());
        assert_eq!(err.to_string(), "No coastal reference points are configured for NSW");
    }
}
