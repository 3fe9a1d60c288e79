//! Haversine distance calculation.
//!
//! The Haversine formula calculates the great-circle distance between two points
//! on a sphere given their longitudes and latitudes.

use crate::GeoPoint;

/// Earth's mean radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Earth's mean radius in meters. Used for every distance and area in this crate.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Calculates the great-circle distance between two points in meters.
///
/// NaN coordinates produce a NaN distance.
///
/// # Example
/// ```
/// use infraplan_geo::{haversine_distance, GeoPoint};
///
/// let a = GeoPoint::new(42.8746, 74.5698);
/// let b = GeoPoint::new(42.8746, 74.5698);
///
/// assert_eq!(haversine_distance(&a, &b), 0.0);
/// ```
#[inline]
pub fn haversine_distance(from: &GeoPoint, to: &GeoPoint) -> f64 {
    EARTH_RADIUS_M * central_angle(from, to)
}

/// Calculates the great-circle distance between two points in kilometers.
#[inline]
pub fn haversine_distance_km(from: &GeoPoint, to: &GeoPoint) -> f64 {
    EARTH_RADIUS_KM * central_angle(from, to)
}

/// Central angle between two points in radians.
#[inline]
pub(crate) fn central_angle(from: &GeoPoint, to: &GeoPoint) -> f64 {
    let (lat1, lon1) = from.to_radians();
    let (lat2, lon2) = to.to_radians();

    let d_lat = lat2 - lat1;
    let d_lon = lon2 - lon1;

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Fast approximate distance in meters (equirectangular projection).
///
/// Less accurate than Haversine over long distances; good enough for
/// radius pre-filtering at city scale.
#[inline]
pub fn approximate_distance(from: &GeoPoint, to: &GeoPoint) -> f64 {
    let (lat1, lon1) = from.to_radians();
    let (lat2, lon2) = to.to_radians();

    let x = (lon2 - lon1) * ((lat1 + lat2) / 2.0).cos();
    let y = lat2 - lat1;

    (x * x + y * y).sqrt() * EARTH_RADIUS_M
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ALA_TOO: GeoPoint = GeoPoint { lat: 42.8746, lng: 74.5698 };
    const OSH_BAZAAR: GeoPoint = GeoPoint { lat: 42.8783, lng: 74.5540 };
    const ALMATY: GeoPoint = GeoPoint { lat: 43.2389, lng: 76.8897 };

    #[test]
    fn test_bishkek_to_almaty() {
        let km = haversine_distance_km(&ALA_TOO, &ALMATY);
        // Expected: ~193 km
        assert!((km - 193.0).abs() < 5.0, "Bishkek-Almaty: {}", km);
    }

    #[test]
    fn test_short_city_distance() {
        let m = haversine_distance(&ALA_TOO, &OSH_BAZAAR);
        // ~1.35 km across the center
        assert!((m - 1350.0).abs() < 100.0, "Ala-Too to Osh bazaar: {}", m);
    }

    #[test]
    fn test_same_point_zero_distance() {
        assert!(haversine_distance(&ALA_TOO, &ALA_TOO).abs() < 1e-9);
    }

    #[test]
    fn test_nan_propagates() {
        let bad = GeoPoint::new(f64::NAN, 74.0);
        assert!(haversine_distance(&bad, &ALA_TOO).is_nan());
    }

    #[test]
    fn test_km_conversion() {
        let km = haversine_distance_km(&ALA_TOO, &ALMATY);
        let m = haversine_distance(&ALA_TOO, &ALMATY);
        assert!((m - km * 1000.0).abs() < 1.0);
    }

    #[test]
    fn test_approximate_distance_reasonable() {
        let exact = haversine_distance(&ALA_TOO, &ALMATY);
        let approx = approximate_distance(&ALA_TOO, &ALMATY);
        let error = ((approx - exact) / exact).abs();
        assert!(error < 0.01, "Error: {}%", error * 100.0);
    }

    proptest! {
        #[test]
        fn prop_distance_to_self_is_zero(lat in -90.0f64..90.0, lng in -180.0f64..180.0) {
            let p = GeoPoint::new(lat, lng);
            prop_assert!(haversine_distance(&p, &p).abs() < 1e-6);
        }

        #[test]
        fn prop_distance_is_symmetric(
            lat1 in -90.0f64..90.0, lng1 in -180.0f64..180.0,
            lat2 in -90.0f64..90.0, lng2 in -180.0f64..180.0,
        ) {
            let a = GeoPoint::new(lat1, lng1);
            let b = GeoPoint::new(lat2, lng2);
            prop_assert!((haversine_distance(&a, &b) - haversine_distance(&b, &a)).abs() < 1e-6);
        }
    }
}
