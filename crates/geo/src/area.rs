//! Approximate surface area of a viewport.

use crate::haversine::central_angle;
use crate::{BoundingBox, GeoPoint, Result, EARTH_RADIUS_KM};
use std::f64::consts::PI;

/// Spherical-cap estimate of a bounding box's area in km², rounded to 0.1.
///
/// Takes the central angle from the box center to its north-east corner and
/// returns the area of the cap with that angular radius. This overshoots the
/// box itself (the cap circumscribes it) and is only meaningful at city scale.
///
/// # Example
/// ```
/// use infraplan_geo::{bounding_box_area_km2, BoundingBox};
///
/// let km2 = bounding_box_area_km2(&BoundingBox::BISHKEK).unwrap();
/// assert!(km2 > 100.0 && km2 < 1000.0);
/// ```
pub fn bounding_box_area_km2(bbox: &BoundingBox) -> Result<f64> {
    bbox.validate()?;

    let corner = GeoPoint::new(bbox.north, bbox.east);
    let theta = central_angle(&bbox.center(), &corner);
    let area = 2.0 * PI * EARTH_RADIUS_KM.powi(2) * (1.0 - theta.cos());

    Ok((area * 10.0).round() / 10.0)
}
