//! GeoJSON ingestion and export.
//!
//! Supports:
//! - Population polygon layers (`properties.population`, optional `properties.h3`),
//!   in WGS84 degrees or Web Mercator meters
//! - Recommendation point collections from the AI endpoint
//! - Single points as GeoJSON `{"coordinates": [lng, lat]}` or WKT `POINT(lng lat)`

use crate::analysis::RecommendationLocation;
use crate::hexbin::{HexagonCell, HexagonLayer};
use crate::{web_mercator_to_geographic_clamped, GeoError, GeoPoint, Result};
use serde_json::{json, Map, Value};

/// Parses a population FeatureCollection into hexagon cells.
///
/// Features that are not single polygons (MultiPolygon included), lack a numeric
/// population or have a malformed outer ring are skipped. Coordinates are treated as Web Mercator meters when the
/// collection's `crs` names EPSG:3857 or any coordinate lies outside geographic range.
///
/// # Example
/// ```
/// use infraplan_geo::geojson::parse_population_layer;
/// use serde_json::json;
///
/// let fc = json!({
///     "type": "FeatureCollection",
///     "features": [{
///         "type": "Feature",
///         "properties": {"population": 420, "h3": "882c2a1a1dfffff"},
///         "geometry": {
///             "type": "Polygon",
///             "coordinates": [[[74.59, 42.87], [74.60, 42.87], [74.60, 42.88], [74.59, 42.87]]]
///         }
///     }]
/// });
/// let layer = parse_population_layer(&fc).unwrap();
/// assert_eq!(layer.cells[0].id, "882c2a1a1dfffff");
/// assert_eq!(layer.max_population, 420.0);
/// ```
pub fn parse_population_layer(value: &Value) -> Result<HexagonLayer> {
    let features = feature_array(value)?;
    let mercator = declares_web_mercator(value) || features.iter().any(has_projected_coordinates);

    let mut skipped = 0usize;
    let cells: Vec<HexagonCell> = features
        .iter()
        .enumerate()
        .filter_map(|(index, feature)| {
            let cell = population_cell(feature, index, mercator);
            if cell.is_none() {
                skipped += 1;
            }
            cell
        })
        .collect();

    tracing::debug!(
        cells = cells.len(),
        skipped,
        mercator,
        "parsed population layer"
    );

    Ok(HexagonLayer::from_cells(cells))
}

/// Parses Point features into recommendations. `properties.score` defaults to 1.0.
pub fn parse_recommendation_collection(value: &Value) -> Result<Vec<RecommendationLocation>> {
    let features = feature_array(value)?;

    Ok(features
        .iter()
        .filter_map(|feature| {
            let geometry = feature.get("geometry")?;
            if geometry.get("type").and_then(Value::as_str) != Some("Point") {
                return None;
            }
            let point = parse_point(geometry)?;
            let props = feature.get("properties").and_then(Value::as_object);
            let text = |key: &str| {
                props
                    .and_then(|p| p.get(key))
                    .and_then(Value::as_str)
                    .map(str::to_owned)
            };

            Some(RecommendationLocation {
                latitude: point.lat,
                longitude: point.lng,
                score: props
                    .and_then(|p| p.get("score"))
                    .and_then(Value::as_f64)
                    .unwrap_or(1.0),
                name: text("name"),
                reason: text("reason"),
            })
        })
        .collect())
}

/// Parses a point from a JSON value.
///
/// Accepts a GeoJSON geometry `{"coordinates": [lng, lat]}` or a WKT string
/// `"POINT(lng lat)"`. Returns `None` for null or unparseable input.
///
/// # Example
/// ```
/// use infraplan_geo::geojson::parse_point;
/// use serde_json::json;
///
/// let p = parse_point(&json!({"type": "Point", "coordinates": [74.5698, 42.8746]})).unwrap();
/// assert!((p.lat - 42.8746).abs() < 1e-9);
///
/// let q = parse_point(&json!("POINT(74.5698 42.8746)")).unwrap();
/// assert_eq!(p, q);
/// ```
pub fn parse_point(value: &Value) -> Option<GeoPoint> {
    if let Some(coords) = value.get("coordinates").and_then(Value::as_array) {
        return position(coords);
    }
    value.as_str().and_then(|wkt| parse_wkt_point(wkt).ok())
}

/// Parses a WKT `POINT(lng lat)` string.
pub fn parse_wkt_point(wkt: &str) -> Result<GeoPoint> {
    let wkt = wkt.trim();
    let body = wkt
        .strip_prefix("POINT")
        .map(str::trim_start)
        .ok_or_else(|| GeoError::InvalidWkt(format!("Expected POINT, got: {}", wkt)))?;

    let inner = body
        .strip_prefix('(')
        .and_then(|b| b.strip_suffix(')'))
        .ok_or_else(|| GeoError::InvalidWkt(format!("Unbalanced parentheses: {}", wkt)))?;

    let parts: Vec<&str> = inner.split_whitespace().collect();
    let [lng, lat] = parts[..] else {
        return Err(GeoError::InvalidWkt(format!(
            "Expected 2 coordinates, got {}",
            parts.len()
        )));
    };

    let lng: f64 = lng
        .parse()
        .map_err(|_| GeoError::InvalidWkt(format!("Invalid longitude: {}", lng)))?;
    let lat: f64 = lat
        .parse()
        .map_err(|_| GeoError::InvalidWkt(format!("Invalid latitude: {}", lat)))?;

    Ok(GeoPoint::new(lat, lng))
}

/// Exports cells as a FeatureCollection of WGS84 polygons.
pub fn hexagons_to_feature_collection(cells: &[HexagonCell]) -> Value {
    let features: Vec<Value> = cells
        .iter()
        .map(|cell| {
            let ring: Vec<[f64; 2]> = cell.polygon.iter().map(|p| [p.lng, p.lat]).collect();
            json!({
                "type": "Feature",
                "id": cell.id,
                "properties": {
                    "h3": cell.id,
                    "population": cell.population,
                },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [ring],
                },
            })
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

fn feature_array(value: &Value) -> Result<&Vec<Value>> {
    match value.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => {}
        other => {
            return Err(GeoError::InvalidGeoJson(format!(
                "expected FeatureCollection, got {:?}",
                other
            )))
        }
    }
    value
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| GeoError::InvalidGeoJson("missing features array".into()))
}

fn declares_web_mercator(value: &Value) -> bool {
    value
        .pointer("/crs/properties/name")
        .and_then(Value::as_str)
        .is_some_and(|name| name.contains("3857"))
}

fn has_projected_coordinates(feature: &Value) -> bool {
    outer_ring(feature).is_some_and(|ring| {
        ring.iter()
            .filter_map(|p| p.as_array())
            .filter_map(|p| position(p))
            .any(|p| !p.is_valid())
    })
}

fn outer_ring(feature: &Value) -> Option<&Vec<Value>> {
    let geometry = feature.get("geometry")?;
    let coords = geometry.get("coordinates")?.as_array()?;
    // A MultiPolygon's population cannot be split between its parts.
    match geometry.get("type")?.as_str()? {
        "Polygon" => coords.first()?.as_array(),
        _ => None,
    }
}

fn population_cell(feature: &Value, index: usize, mercator: bool) -> Option<HexagonCell> {
    let props: &Map<String, Value> = feature.get("properties")?.as_object()?;
    let population = props.get("population")?.as_f64()?;

    let mut polygon = outer_ring(feature)?
        .iter()
        .map(|p| {
            let raw = position(p.as_array()?)?;
            Some(if mercator {
                web_mercator_to_geographic_clamped(raw.lng, raw.lat)
            } else {
                raw
            })
        })
        .collect::<Option<Vec<GeoPoint>>>()?;

    if polygon.len() < 3 {
        return None;
    }
    if polygon.first() != polygon.last() {
        polygon.push(polygon[0]);
    }

    let id = props
        .get("h3")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .or_else(|| match feature.get("id") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_else(|| format!("feature_{index}"));

    Some(HexagonCell {
        id,
        population,
        polygon,
    })
}

/// `[x, y]` position as a point with `lng = x`, `lat = y`.
fn position(coords: &[Value]) -> Option<GeoPoint> {
    match coords {
        [x, y, ..] => Some(GeoPoint::new(y.as_f64()?, x.as_f64()?)),
        _ => None,
    }
}
