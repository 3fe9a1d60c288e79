//! WASM bindings for the geo crate.
//!
//! JSON strings in, JSON strings out, so the map front end can call the
//! transforms without sharing Rust types.

use crate::geojson::parse_population_layer;
use crate::{
    bin_points_to_hexagons, bounding_box_area_km2, color_for_value, haversine_distance,
    web_mercator_to_geographic_clamped, BoundingBox, CoverageTable, Facility, GeoError,
    GeoPoint, PopulationPoint,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| js_error(format!("JSON serialize error: {}", e)))
}

/// Great-circle distance in meters.
#[wasm_bindgen]
pub fn distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    haversine_distance(&GeoPoint::new(lat1, lng1), &GeoPoint::new(lat2, lng2))
}

/// Web Mercator meters to `{"lat", "lng"}`, clamped to geographic range.
#[wasm_bindgen]
pub fn mercator_to_lat_lng(x: f64, y: f64) -> Result<String, JsValue> {
    to_json(&web_mercator_to_geographic_clamped(x, y))
}

/// Coverage layers for a JSON array of facilities.
#[wasm_bindgen]
pub fn coverage_layers(facilities_json: &str) -> Result<String, JsValue> {
    let facilities: Vec<Facility> = serde_json::from_str(facilities_json)
        .map_err(|e| js_error(GeoError::from(e)))?;

    to_json(&CoverageTable::standard().derive_all(&facilities))
}

/// Hexagon cells for a JSON array of `{lat, lng, intensity}` points.
#[wasm_bindgen]
pub fn bin_hexagons(points_json: &str, cell_size_degrees: f64) -> Result<String, JsValue> {
    let points: Vec<PopulationPoint> = serde_json::from_str(points_json)
        .map_err(|e| js_error(GeoError::from(e)))?;

    let cells = bin_points_to_hexagons(&points, cell_size_degrees).map_err(js_error)?;
    to_json(&cells)
}

/// Density color for a cell population.
#[wasm_bindgen]
pub fn hexagon_color(value: f64, max_value: f64) -> Result<String, JsValue> {
    color_for_value(value, max_value)
        .map(str::to_owned)
        .map_err(js_error)
}

/// Approximate viewport area in km².
#[wasm_bindgen]
pub fn area_km2(north: f64, south: f64, east: f64, west: f64) -> Result<f64, JsValue> {
    bounding_box_area_km2(&BoundingBox::new(north, south, east, west)).map_err(js_error)
}

/// Parses a population GeoJSON FeatureCollection into `{cells, max_population}`.
#[wasm_bindgen]
pub fn population_layer(geojson: &str) -> Result<String, JsValue> {
    let value: serde_json::Value =
        serde_json::from_str(geojson).map_err(|e| js_error(GeoError::from(e)))?;

    let layer = parse_population_layer(&value).map_err(js_error)?;
    to_json(&layer)
}
