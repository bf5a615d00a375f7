//! Great-circle distance
//!
//! Haversine formula on a spherical earth. Good to a few tenths of a percent,
//! which is plenty for "how far is the nearest coastal town".

use crate::constants::geo::EARTH_RADIUS_KM;
use crate::coord::Coordinates;

/// Calculate the distance between two points in kilometres (Haversine formula)
///
/// # Arguments
/// * `a` - First point
/// * `b` - Second point
///
/// # Returns
/// Distance in kilometres, always `>= 0`
pub fn distance_km(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    // Rounding can push h a hair above 1.0 for antipodal points
    let c = 2.0 * h.min(1.0).sqrt().asin();

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_distance_to_self_is_zero() {
        let p = Coordinates::new(-33.865143, 151.2099);
        assert_eq!(distance_km(p, p), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let sydney = Coordinates::new(-33.865143, 151.2099);
        let newcastle = Coordinates::new(-32.916668, 151.75);
        assert_eq!(distance_km(sydney, newcastle), distance_km(newcastle, sydney));
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let a = Coordinates::new(-33.0, 151.0);
        let b = Coordinates::new(-34.0, 151.0);
        // 6371 km * pi / 180
        assert_relative_eq!(distance_km(a, b), 111.195, epsilon = 0.01);
    }

    #[test]
    fn test_sydney_to_newcastle() {
        let sydney = Coordinates::new(-33.865143, 151.2099);
        let newcastle = Coordinates::new(-32.916668, 151.75);
        let d = distance_km(sydney, newcastle);
        assert!((110.0..125.0).contains(&d), "distance was {}", d);
    }

    #[test]
    fn test_antipodes_are_half_circumference() {
        let a = Coordinates::new(0.0, 0.0);
        let b = Coordinates::new(0.0, 180.0);
        assert_relative_eq!(distance_km(a, b), EARTH_RADIUS_KM * std::f64::consts::PI, epsilon = 1e-6);
    }
}
