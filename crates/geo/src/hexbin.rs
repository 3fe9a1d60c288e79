//! Population density binning into hexagon cells.
//!
//! Two strategies are available:
//! - [`bin_points_to_hexagons`]: rounds coordinates into square buckets and draws a
//!   circumscribed hexagon around each bucket. Cheap, but the hexagons do not tile.
//! - [`bin_points_to_h3`] (feature `h3`): real H3 cells, edge-adjacent at a fixed resolution.

use crate::{polygon_centroid, BoundingBox, GeoError, GeoPoint, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Hexagon radius relative to the bucket size.
const HEX_RADIUS_FACTOR: f64 = 0.8;

/// Meters per degree of latitude, as used by the grid generator.
const METERS_PER_DEGREE: f64 = 111_111.0;

/// Upper bound on generated grid centers.
const MAX_GRID_CELLS: usize = 1_000_000;

/// Population-weighted point as served by the density endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopulationPoint {
    pub lat: f64,
    pub lng: f64,
    pub intensity: f64,
}

impl PopulationPoint {
    pub fn new(lat: f64, lng: f64, intensity: f64) -> Self {
        Self {
            lat,
            lng,
            intensity,
        }
    }

    #[inline]
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

/// One cell of the density grid. `polygon` is a closed ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HexagonCell {
    pub id: String,
    pub population: f64,
    pub polygon: Vec<GeoPoint>,
}

impl HexagonCell {
    /// Vertex-mean center of the cell.
    pub fn centroid(&self) -> Result<GeoPoint> {
        polygon_centroid(&self.polygon)
    }
}

/// A set of cells together with the normalization maximum used for coloring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HexagonLayer {
    pub cells: Vec<HexagonCell>,
    pub max_population: f64,
}

impl HexagonLayer {
    /// Normalization maximum when a layer has no cells.
    pub const EMPTY_MAX_POPULATION: f64 = 1000.0;

    /// Wraps cells, computing the maximum population (never below 1).
    pub fn from_cells(cells: Vec<HexagonCell>) -> Self {
        let max_population = if cells.is_empty() {
            Self::EMPTY_MAX_POPULATION
        } else {
            cells
                .iter()
                .map(|c| c.population)
                .fold(1.0_f64, f64::max)
        };
        Self {
            cells,
            max_population,
        }
    }

    pub fn total_population(&self) -> f64 {
        self.cells.iter().map(|c| c.population).sum()
    }
}

/// Index of the bucket `coordinate` rounds into. A cell size too small for the
/// index to fit in an `i64` is rejected rather than saturated.
fn bucket_index(coordinate: f64, cell_size_degrees: f64) -> Result<i64> {
    let index = (coordinate / cell_size_degrees).round();
    // i64::MAX is not representable as f64; the cast rounds it up to 2^63.
    if index >= i64::MIN as f64 && index < i64::MAX as f64 {
        Ok(index as i64)
    } else {
        Err(GeoError::InvalidCellSize(cell_size_degrees))
    }
}

/// Bins points into rounded coordinate buckets and emits one hexagon per occupied bucket.
///
/// Each coordinate is rounded to the nearest multiple of `cell_size_degrees`; the
/// bucket's population is the sum of its points' intensities. The hexagon has
/// radius `0.8 × cell_size_degrees`, six vertices at 60° steps starting due east,
/// and repeats the first vertex to close the ring. Cells appear in the order their
/// first point was seen. Points with non-finite coordinates are skipped.
///
/// # Example
/// ```
/// use infraplan_geo::{bin_points_to_hexagons, PopulationPoint};
///
/// let points = [
///     PopulationPoint::new(42.871, 74.591, 10.0),
///     PopulationPoint::new(42.869, 74.589, 5.0),
/// ];
/// let cells = bin_points_to_hexagons(&points, 0.01).unwrap();
/// assert_eq!(cells.len(), 1);
/// assert_eq!(cells[0].population, 15.0);
/// assert_eq!(cells[0].polygon.len(), 7);
/// ```
pub fn bin_points_to_hexagons(
    points: &[PopulationPoint],
    cell_size_degrees: f64,
) -> Result<Vec<HexagonCell>> {
    if !cell_size_degrees.is_finite() || cell_size_degrees <= 0.0 {
        return Err(GeoError::InvalidCellSize(cell_size_degrees));
    }

    let mut slots: HashMap<(i64, i64), usize> = HashMap::new();
    let mut buckets: Vec<((i64, i64), f64)> = Vec::new();
    let mut skipped = 0usize;

    for p in points {
        if !p.lat.is_finite() || !p.lng.is_finite() {
            skipped += 1;
            continue;
        }
        let key = (
            bucket_index(p.lat, cell_size_degrees)?,
            bucket_index(p.lng, cell_size_degrees)?,
        );
        let slot = *slots.entry(key).or_insert_with(|| {
            buckets.push((key, 0.0));
            buckets.len() - 1
        });
        buckets[slot].1 += p.intensity;
    }

    if skipped > 0 {
        tracing::debug!(skipped, "skipped population points with non-finite coordinates");
    }

    let radius = cell_size_degrees * HEX_RADIUS_FACTOR;
    Ok(buckets
        .into_iter()
        .map(|((lat_idx, lng_idx), population)| {
            let center = GeoPoint::new(
                lat_idx as f64 * cell_size_degrees,
                lng_idx as f64 * cell_size_degrees,
            );
            HexagonCell {
                id: format!("hex_{lat_idx}_{lng_idx}"),
                population,
                polygon: hexagon_ring(center, radius),
            }
        })
        .collect())
}

/// Regular hexagon around `center` with vertices `radius` degrees away, closed.
pub fn hexagon_ring(center: GeoPoint, radius: f64) -> Vec<GeoPoint> {
    let mut ring: Vec<GeoPoint> = (0..6)
        .map(|k| {
            let angle = (60.0 * k as f64).to_radians();
            GeoPoint::new(
                center.lat + radius * angle.sin(),
                center.lng + radius * angle.cos(),
            )
        })
        .collect();
    ring.push(ring[0]);
    ring
}

/// Centers of an offset-row hexagonal grid covering `bbox`.
///
/// Rows are `0.75 × cell` apart in latitude; odd rows shift by half a column.
/// Longitude steps are widened by `1 / cos(mid latitude)` so cells stay roughly
/// `cell_size_m` wide on the ground.
pub fn hex_grid_centers(bbox: &BoundingBox, cell_size_m: f64) -> Result<Vec<GeoPoint>> {
    bbox.validate()?;
    if !cell_size_m.is_finite() || cell_size_m <= 0.0 {
        return Err(GeoError::InvalidCellSize(cell_size_m));
    }

    let mid_lat = ((bbox.north + bbox.south) / 2.0).to_radians();
    let lat_step = cell_size_m / METERS_PER_DEGREE * 0.75;
    let lng_step = cell_size_m / (METERS_PER_DEGREE * mid_lat.cos());

    let rows = ((bbox.north - bbox.south) / lat_step).floor() as usize + 1;
    let cols = ((bbox.east - bbox.west) / lng_step).floor() as usize + 1;
    if rows.saturating_mul(cols) > MAX_GRID_CELLS {
        return Err(GeoError::InvalidCellSize(cell_size_m));
    }

    let mut centers = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        let lat = bbox.south + row as f64 * lat_step;
        let offset = if row % 2 == 0 { 0.0 } else { lng_step / 2.0 };
        let mut col = 0;
        loop {
            let lng = bbox.west + offset + col as f64 * lng_step;
            if lng > bbox.east {
                break;
            }
            centers.push(GeoPoint::new(lat, lng));
            col += 1;
        }
    }
    Ok(centers)
}

/// Bins points into H3 cells at `resolution` (0..=15).
///
/// Cell ids are H3 index strings. Points H3 cannot index are skipped.
#[cfg(feature = "h3")]
pub fn bin_points_to_h3(points: &[PopulationPoint], resolution: u8) -> Result<Vec<HexagonCell>> {
    use h3o::{CellIndex, LatLng, Resolution};

    let res =
        Resolution::try_from(resolution).map_err(|_| GeoError::InvalidResolution(resolution))?;

    let mut slots: HashMap<CellIndex, usize> = HashMap::new();
    let mut buckets: Vec<(CellIndex, f64)> = Vec::new();

    for p in points {
        let Ok(ll) = LatLng::new(p.lat, p.lng) else {
            continue;
        };
        let cell = ll.to_cell(res);
        let slot = *slots.entry(cell).or_insert_with(|| {
            buckets.push((cell, 0.0));
            buckets.len() - 1
        });
        buckets[slot].1 += p.intensity;
    }

    Ok(buckets
        .into_iter()
        .map(|(cell, population)| {
            let mut polygon: Vec<GeoPoint> = cell
                .boundary()
                .iter()
                .map(|ll| GeoPoint::new(ll.lat(), ll.lng()))
                .collect();
            if let Some(first) = polygon.first().copied() {
                polygon.push(first);
            }
            HexagonCell {
                id: cell.to_string(),
                population,
                polygon,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_input() {
        assert!(bin_points_to_hexagons(&[], 0.01).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_cell_size() {
        let p = [PopulationPoint::new(42.87, 74.59, 1.0)];
        assert!(matches!(
            bin_points_to_hexagons(&p, 0.0),
            Err(GeoError::InvalidCellSize(_))
        ));
        assert!(bin_points_to_hexagons(&p, -0.01).is_err());
        assert!(bin_points_to_hexagons(&p, f64::NAN).is_err());
    }

    #[test]
    fn test_tiny_cell_size_rejected() {
        let points = [
            PopulationPoint::new(42.87, 74.59, 1.0),
            PopulationPoint::new(42.80, 74.50, 2.0),
        ];
        assert!(matches!(
            bin_points_to_hexagons(&points, 1e-18),
            Err(GeoError::InvalidCellSize(_))
        ));
        // Small but representable sizes still keep points apart.
        let cells = bin_points_to_hexagons(&points, 1e-9).unwrap();
        assert_eq!(cells.len(), 2);
    }

    #[test]
    fn test_points_aggregate_per_cell() {
        let points = [
            PopulationPoint::new(42.871, 74.591, 10.0),
            PopulationPoint::new(42.869, 74.589, 5.0),
            PopulationPoint::new(42.901, 74.650, 7.0),
        ];
        let cells = bin_points_to_hexagons(&points, 0.01).unwrap();
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].id, "hex_4287_7459");
        assert_eq!(cells[0].population, 15.0);
        assert_eq!(cells[1].population, 7.0);
    }

    #[test]
    fn test_hexagon_geometry() {
        let cells = bin_points_to_hexagons(&[PopulationPoint::new(0.0, 0.0, 1.0)], 0.01).unwrap();
        let ring = &cells[0].polygon;
        assert_eq!(ring.len(), 7);
        assert_eq!(ring[0], ring[6]);
        // first vertex due east at 0.8 × cell size
        assert!((ring[0].lng - 0.008).abs() < 1e-12);
        assert!(ring[0].lat.abs() < 1e-12);
        for v in &ring[..6] {
            let r = (v.lat.powi(2) + v.lng.powi(2)).sqrt();
            assert!((r - 0.008).abs() < 1e-12);
        }
        let c = cells[0].centroid().unwrap();
        assert!(c.lat.abs() < 1e-12 && c.lng.abs() < 1e-12);
    }

    #[test]
    fn test_non_finite_points_skipped() {
        let points = [
            PopulationPoint::new(f64::NAN, 74.59, 100.0),
            PopulationPoint::new(42.87, 74.59, 1.0),
        ];
        let cells = bin_points_to_hexagons(&points, 0.01).unwrap();
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].population, 1.0);
    }

    #[test]
    fn test_layer_max_population() {
        let empty = HexagonLayer::from_cells(Vec::new());
        assert_eq!(empty.max_population, HexagonLayer::EMPTY_MAX_POPULATION);

        let points = [
            PopulationPoint::new(42.87, 74.59, 0.2),
            PopulationPoint::new(42.80, 74.50, 0.5),
        ];
        let tiny = HexagonLayer::from_cells(bin_points_to_hexagons(&points, 0.01).unwrap());
        assert_eq!(tiny.max_population, 1.0);
        assert!((tiny.total_population() - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_grid_centers_cover_bbox() {
        let bbox = BoundingBox::BISHKEK;
        let centers = hex_grid_centers(&bbox, 1000.0).unwrap();
        assert!(!centers.is_empty());
        assert!(centers.iter().all(|c| bbox.contains(c)));
        // ~11 km tall / 0.75 km rows, ~16 km wide / 1 km columns
        assert!(centers.len() > 150 && centers.len() < 300, "{}", centers.len());
    }

    #[test]
    fn test_grid_rejects_bad_input() {
        assert!(hex_grid_centers(&BoundingBox::BISHKEK, 0.0).is_err());
        assert!(hex_grid_centers(&BoundingBox::BISHKEK, 0.001).is_err());
        assert!(hex_grid_centers(&BoundingBox::new(1.0, 2.0, 3.0, 4.0), 1000.0).is_err());
    }

    #[cfg(feature = "h3")]
    #[test]
    fn test_h3_binning() {
        let points = [
            PopulationPoint::new(42.8746, 74.5698, 10.0),
            PopulationPoint::new(42.8747, 74.5699, 5.0),
            PopulationPoint::new(42.8000, 74.5000, 1.0),
        ];
        let cells = bin_points_to_h3(&points, 8).unwrap();
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].population, 15.0);
        assert_eq!(cells[0].id.len(), 15);
        assert_eq!(cells[0].polygon.len(), 7);

        let c = cells[0].centroid().unwrap();
        assert!(crate::point_in_polygon(&points[0].location(), &cells[0].polygon));
        assert!(crate::haversine_distance(&c, &points[0].location()) < 1000.0);
    }

    #[cfg(feature = "h3")]
    #[test]
    fn test_h3_invalid_resolution() {
        assert!(matches!(
            bin_points_to_h3(&[], 16),
            Err(GeoError::InvalidResolution(16))
        ));
    }

    fn population_by_id(cells: &[HexagonCell]) -> HashMap<String, f64> {
        cells.iter().map(|c| (c.id.clone(), c.population)).collect()
    }

    proptest! {
        #[test]
        fn prop_population_is_order_invariant(
            raw in prop::collection::vec((42.8f64..42.9, 74.5f64..74.7, 0u32..100), 0..60)
        ) {
            let points: Vec<_> = raw
                .iter()
                .map(|(lat, lng, w)| PopulationPoint::new(*lat, *lng, f64::from(*w)))
                .collect();
            let mut reversed = points.clone();
            reversed.reverse();

            let forward = population_by_id(&bin_points_to_hexagons(&points, 0.01).unwrap());
            let backward = population_by_id(&bin_points_to_hexagons(&reversed, 0.01).unwrap());
            prop_assert_eq!(forward, backward);
        }

        #[test]
        fn prop_total_population_preserved(
            raw in prop::collection::vec((42.8f64..42.9, 74.5f64..74.7, 0u32..100), 0..60)
        ) {
            let points: Vec<_> = raw
                .iter()
                .map(|(lat, lng, w)| PopulationPoint::new(*lat, *lng, f64::from(*w)))
                .collect();
            let expected: f64 = points.iter().map(|p| p.intensity).sum();
            let layer = HexagonLayer::from_cells(bin_points_to_hexagons(&points, 0.01).unwrap());
            prop_assert!((layer.total_population() - expected).abs() < 1e-6);
        }
    }
}
