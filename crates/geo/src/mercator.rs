//! Spherical Web Mercator (EPSG:3857) conversion.
//!
//! Population layers exported from desktop GIS arrive in either WGS84 degrees
//! or Web Mercator meters; these functions bring them back to degrees.

use crate::GeoPoint;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

/// Sphere radius that defines EPSG:3857. Not interchangeable with
/// [`crate::EARTH_RADIUS_M`]: projected data is only correct on this sphere.
pub const WEB_MERCATOR_RADIUS_M: f64 = 6_378_137.0;

/// Latitude at which Web Mercator maps to a square world.
pub const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_779_806_59;

/// Inverse spherical Mercator projection, unclamped.
///
/// Out-of-range meters produce longitudes beyond ±180°.
///
/// # Example
/// ```
/// use infraplan_geo::web_mercator_to_geographic;
///
/// let p = web_mercator_to_geographic(0.0, 0.0);
/// assert_eq!((p.lat, p.lng), (0.0, 0.0));
/// ```
#[inline]
pub fn web_mercator_to_geographic(x: f64, y: f64) -> GeoPoint {
    let lng = (x / WEB_MERCATOR_RADIUS_M).to_degrees();
    let lat = (2.0 * (y / WEB_MERCATOR_RADIUS_M).exp().atan() - FRAC_PI_2).to_degrees();
    GeoPoint::new(lat, lng)
}

/// Inverse projection with longitude wrapped into [-180, 180] and latitude
/// clamped to ±90, safe to feed into map-fit bounds.
pub fn web_mercator_to_geographic_clamped(x: f64, y: f64) -> GeoPoint {
    let raw = web_mercator_to_geographic(x, y);
    GeoPoint::new(raw.lat.clamp(-90.0, 90.0), wrap_longitude(raw.lng))
}

/// Forward spherical Mercator projection, returning `(x, y)` in meters.
///
/// Latitude is clamped to [`MAX_MERCATOR_LATITUDE`] since the poles project to infinity.
#[inline]
pub fn geographic_to_web_mercator(point: &GeoPoint) -> (f64, f64) {
    let lat = point
        .lat
        .clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE)
        .to_radians();
    let x = WEB_MERCATOR_RADIUS_M * point.lng.to_radians();
    let y = WEB_MERCATOR_RADIUS_M * (FRAC_PI_4 + lat / 2.0).tan().ln();
    (x, y)
}

fn wrap_longitude(lng: f64) -> f64 {
    if (-180.0..=180.0).contains(&lng) {
        return lng;
    }
    let wrapped = (lng + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid maps +180 to -180; keep the sign the caller came from
    if wrapped == -180.0 && lng > 0.0 {
        180.0
    } else {
        wrapped
    }
}
