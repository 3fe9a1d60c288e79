//! Batch distance calculations with optional parallelism.
//!
//! Population grids run to thousands of points per viewport; these helpers
//! fan the haversine work out over rayon when the `parallel` feature is on.

use crate::coverage::{Facility, FacilityId};
use crate::hexbin::PopulationPoint;
use crate::{haversine_distance, GeoPoint};
use serde::Serialize;
use std::cmp::Ordering;

/// Closest facility to one population point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearestFacility {
    /// Index of the point in the input slice
    pub point_index: usize,
    /// `None` when there are no facilities
    pub facility_id: Option<FacilityId>,
    /// Distance in meters (Infinity when there are no facilities)
    pub distance: f64,
}

/// Distance from a reference point to one facility.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacilityDistance {
    pub id: FacilityId,
    pub name: String,
    /// Distance in meters
    pub distance: f64,
}

/// For every population point, the nearest facility and its distance.
///
/// # Example
/// ```
/// use infraplan_geo::batch::nearest_facility_distances;
/// use infraplan_geo::{Facility, FacilityType, PopulationPoint};
///
/// let schools = vec![Facility::new(1_i64, "School", FacilityType::School, 42.87, 74.59)];
/// let points = vec![PopulationPoint::new(42.88, 74.59, 12.0)];
///
/// let nearest = nearest_facility_distances(&points, &schools);
/// assert!((nearest[0].distance - 1112.0).abs() < 5.0);
/// ```
pub fn nearest_facility_distances(
    points: &[PopulationPoint],
    facilities: &[Facility],
) -> Vec<NearestFacility> {
    tracing::debug!(
        points = points.len(),
        facilities = facilities.len(),
        "computing nearest facilities"
    );

    let locations: Vec<GeoPoint> = facilities.iter().map(Facility::location).collect();

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        points
            .par_iter()
            .enumerate()
            .map(|(i, p)| nearest_single(i, p, facilities, &locations))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        points
            .iter()
            .enumerate()
            .map(|(i, p)| nearest_single(i, p, facilities, &locations))
            .collect()
    }
}

/// Distances from `center` to every facility, in input order.
pub fn facility_distances(center: &GeoPoint, facilities: &[Facility]) -> Vec<FacilityDistance> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        facilities
            .par_iter()
            .map(|f| distance_to(center, f))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        facilities.iter().map(|f| distance_to(center, f)).collect()
    }
}

/// Distances sorted closest first, optionally truncated to `max_results`.
pub fn facilities_sorted_by_distance(
    center: &GeoPoint,
    facilities: &[Facility],
    max_results: Option<usize>,
) -> Vec<FacilityDistance> {
    let mut results = facility_distances(center, facilities);
    sort_by_distance(&mut results);

    if let Some(max) = max_results {
        results.truncate(max);
    }

    results
}

/// Facilities within `radius_m` meters of `center`, closest first.
pub fn facilities_within_radius(
    center: &GeoPoint,
    facilities: &[Facility],
    radius_m: f64,
) -> Vec<FacilityDistance> {
    let mut results = facility_distances(center, facilities);
    results.retain(|r| r.distance <= radius_m);
    sort_by_distance(&mut results);
    results
}

fn sort_by_distance(results: &mut [FacilityDistance]) {
    // NaN distances sort last
    results.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Greater));
}

#[inline]
fn distance_to(center: &GeoPoint, facility: &Facility) -> FacilityDistance {
    FacilityDistance {
        id: facility.id.clone(),
        name: facility.name.clone(),
        distance: haversine_distance(center, &facility.location()),
    }
}

#[inline]
fn nearest_single(
    index: usize,
    point: &PopulationPoint,
    facilities: &[Facility],
    locations: &[GeoPoint],
) -> NearestFacility {
    let origin = point.location();
    let best = locations
        .iter()
        .enumerate()
        .map(|(i, loc)| (i, haversine_distance(&origin, loc)))
        .filter(|(_, d)| !d.is_nan())
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

    match best {
        Some((i, distance)) => NearestFacility {
            point_index: index,
            facility_id: Some(facilities[i].id.clone()),
            distance,
        },
        None => NearestFacility {
            point_index: index,
            facility_id: None,
            distance: f64::INFINITY,
        },
    }
}
