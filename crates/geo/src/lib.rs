//! Geospatial transforms for infrastructure placement analysis.
//!
//! This crate provides:
//! - Haversine distances and Web Mercator conversion
//! - Polygon centroid and point-in-polygon tests
//! - Coverage zones per facility type
//! - Population binning into hexagon cells (rounding fallback and H3)
//! - Color scales for density and score visualization
//! - Bounding box area estimation
//! - GeoJSON ingestion of population and recommendation layers
//! - WASM bindings for browser usage
//!
//! # Example
//!
//! ```
//! use infraplan_geo::{haversine_distance, GeoPoint};
//!
//! let center = GeoPoint::new(42.8746, 74.5698); // Bishkek, Ala-Too square
//! let airport = GeoPoint::new(43.0613, 74.4776); // Manas airport
//!
//! let meters = haversine_distance(&center, &airport);
//! assert!((meters - 22_000.0).abs() < 1_000.0);
//! ```

mod area;
mod color;
mod error;
mod haversine;
mod mercator;
mod polygon;

pub mod analysis;
pub mod batch;
pub mod coverage;
pub mod geojson;
pub mod hexbin;

#[cfg(feature = "wasm")]
mod wasm;

pub use analysis::{CoverageStats, RecommendationLocation, Scenario};
pub use area::bounding_box_area_km2;
pub use color::{
    color_for_value, color_scale, legend_breaks, score_color, ColorScale, LegendEntry,
    DENSITY_COLORS, SCALE_COLORS,
};
pub use coverage::{
    derive_coverage, derive_coverage_layers, CoverageLayer, CoverageTable, Facility, FacilityId,
    FacilityProfile, FacilityType,
};
pub use error::{GeoError, GeoErrorCode, Result};
pub use haversine::{
    approximate_distance, haversine_distance, haversine_distance_km, EARTH_RADIUS_KM,
    EARTH_RADIUS_M,
};
pub use hexbin::{
    bin_points_to_hexagons, hex_grid_centers, HexagonCell, HexagonLayer, PopulationPoint,
};
pub use mercator::{
    geographic_to_web_mercator, web_mercator_to_geographic, web_mercator_to_geographic_clamped,
    MAX_MERCATOR_LATITUDE, WEB_MERCATOR_RADIUS_M,
};
pub use polygon::{point_in_polygon, polygon_centroid, ring_bounds};

use serde::{Deserialize, Serialize};

/// A geographic point in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees (-90 to 90)
    pub lat: f64,
    /// Longitude in degrees (-180 to 180)
    pub lng: f64,
}

impl GeoPoint {
    /// Creates a new point. Ranges are not enforced; see [`GeoPoint::is_valid`].
    #[inline]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns true if the point lies within geographic ranges.
    #[inline]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }

    /// Like [`GeoPoint::is_valid`], but reports the offending point.
    pub fn validate(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(GeoError::InvalidCoordinate(format!(
                "({}, {}) is outside lat [-90, 90], lng [-180, 180]",
                self.lat, self.lng
            )))
        }
    }

    /// Converts degrees to radians for internal calculations.
    #[inline]
    pub(crate) fn to_radians(self) -> (f64, f64) {
        (self.lat.to_radians(), self.lng.to_radians())
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

/// An axis-aligned latitude/longitude box, as reported by the map viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

/// The `min_lat`/`max_lat` query shape the backend expects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaQuery {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Bishkek city extent, used when no viewport is known yet.
    pub const BISHKEK: BoundingBox = BoundingBox {
        north: 42.9,
        south: 42.8,
        east: 74.7,
        west: 74.5,
    };

    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// Rejects non-finite edges and boxes with zero or negative extent.
    pub fn validate(&self) -> Result<()> {
        let edges = [self.north, self.south, self.east, self.west];
        if edges.iter().any(|v| !v.is_finite()) {
            return Err(GeoError::InvalidBoundingBox(format!(
                "non-finite edge in {:?}",
                self
            )));
        }
        if self.north <= self.south {
            return Err(GeoError::InvalidBoundingBox(format!(
                "north ({}) must be greater than south ({})",
                self.north, self.south
            )));
        }
        if self.east <= self.west {
            return Err(GeoError::InvalidBoundingBox(format!(
                "east ({}) must be greater than west ({})",
                self.east, self.west
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.north + self.south) / 2.0,
            (self.east + self.west) / 2.0,
        )
    }

    /// Inclusive containment test.
    #[inline]
    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.lat >= self.south
            && point.lat <= self.north
            && point.lng >= self.west
            && point.lng <= self.east
    }

    pub fn to_query(&self) -> AreaQuery {
        AreaQuery {
            min_lat: self.south,
            min_lon: self.west,
            max_lat: self.north,
            max_lon: self.east,
        }
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::BISHKEK
    }
}

impl From<AreaQuery> for BoundingBox {
    fn from(q: AreaQuery) -> Self {
        Self::new(q.max_lat, q.min_lat, q.max_lon, q.min_lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_creation() {
        let p = GeoPoint::new(42.87, 74.59);
        assert_eq!(p.lat, 42.87);
        assert_eq!(p.lng, 74.59);
    }

    #[test]
    fn test_point_validation() {
        assert!(GeoPoint::new(0.0, 0.0).is_valid());
        assert!(GeoPoint::new(90.0, 180.0).is_valid());
        assert!(GeoPoint::new(-90.0, -180.0).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, 181.0).is_valid());
    }

    #[test]
    fn test_point_validate_reports_coordinate() {
        assert!(GeoPoint::new(42.87, 74.59).validate().is_ok());
        let err = GeoPoint::new(74.59, 242.87).validate().unwrap_err();
        assert_eq!(err.code(), GeoErrorCode::InvalidCoordinate);
        assert!(err.to_string().contains("242.87"));
        assert!(GeoPoint::new(f64::NAN, 0.0).validate().is_err());
    }

    #[test]
    fn test_point_from_tuple() {
        let p: GeoPoint = (42.87, 74.59).into();
        assert_eq!(p.lat, 42.87);
    }

    #[test]
    fn test_bbox_validation() {
        assert!(BoundingBox::BISHKEK.validate().is_ok());
        assert!(BoundingBox::new(42.8, 42.9, 74.7, 74.5).validate().is_err());
        assert!(BoundingBox::new(42.9, 42.8, 74.5, 74.5).validate().is_err());
        assert!(BoundingBox::new(f64::NAN, 42.8, 74.7, 74.5).validate().is_err());
    }

    #[test]
    fn test_bbox_center_and_contains() {
        let bbox = BoundingBox::BISHKEK;
        let c = bbox.center();
        assert!((c.lat - 42.85).abs() < 1e-9);
        assert!((c.lng - 74.6).abs() < 1e-9);
        assert!(bbox.contains(&c));
        assert!(!bbox.contains(&GeoPoint::new(43.5, 74.6)));
    }

    #[test]
    fn test_bbox_query_roundtrip() {
        let q = BoundingBox::BISHKEK.to_query();
        assert_eq!(q.min_lat, 42.8);
        assert_eq!(q.max_lon, 74.7);
        assert_eq!(BoundingBox::from(q), BoundingBox::BISHKEK);
    }
}
