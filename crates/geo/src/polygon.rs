//! Polygon centroid and point-in-polygon tests over lat/lng rings.

use crate::{BoundingBox, GeoError, GeoPoint, Result};

/// Arithmetic mean of the ring's vertices.
///
/// This is the vertex mean, not the area-weighted centroid: accurate for
/// small regular cells such as hexagons, biased for irregular polygons.
/// A trailing vertex equal to the first is ignored, so open and closed rings
/// give the same result.
///
/// # Example
/// ```
/// use infraplan_geo::{polygon_centroid, GeoPoint};
///
/// let square = [
///     GeoPoint::new(0.0, 0.0),
///     GeoPoint::new(0.0, 2.0),
///     GeoPoint::new(2.0, 2.0),
///     GeoPoint::new(2.0, 0.0),
/// ];
/// let c = polygon_centroid(&square).unwrap();
/// assert_eq!((c.lat, c.lng), (1.0, 1.0));
/// ```
pub fn polygon_centroid(ring: &[GeoPoint]) -> Result<GeoPoint> {
    let vertices = open_ring(ring);
    if vertices.is_empty() {
        return Err(GeoError::EmptyRing);
    }

    let n = vertices.len() as f64;
    let (sum_lat, sum_lng) = vertices
        .iter()
        .fold((0.0, 0.0), |(la, ln), p| (la + p.lat, ln + p.lng));

    Ok(GeoPoint::new(sum_lat / n, sum_lng / n))
}

/// Ray-casting (crossing number) test against an implicitly closed ring.
///
/// Points exactly on an edge may land on either side. Rings with fewer than
/// three vertices contain nothing.
pub fn point_in_polygon(point: &GeoPoint, ring: &[GeoPoint]) -> bool {
    let vertices = open_ring(ring);
    if vertices.len() < 3 {
        return false;
    }

    let (x, y) = (point.lng, point.lat);
    let mut inside = false;
    let mut j = vertices.len() - 1;

    for i in 0..vertices.len() {
        let (xi, yi) = (vertices[i].lng, vertices[i].lat);
        let (xj, yj) = (vertices[j].lng, vertices[j].lat);

        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Smallest box enclosing the ring, or `None` for an empty ring.
pub fn ring_bounds(ring: &[GeoPoint]) -> Option<BoundingBox> {
    let first = ring.first()?;
    let init = BoundingBox::new(first.lat, first.lat, first.lng, first.lng);

    Some(ring.iter().skip(1).fold(init, |b, p| BoundingBox {
        north: b.north.max(p.lat),
        south: b.south.min(p.lat),
        east: b.east.max(p.lng),
        west: b.west.min(p.lng),
    }))
}

/// Drops the closing vertex of an explicitly closed ring.
fn open_ring(ring: &[GeoPoint]) -> &[GeoPoint] {
    match (ring.first(), ring.last()) {
        (Some(first), Some(last)) if ring.len() > 1 && first == last => &ring[..ring.len() - 1],
        _ => ring,
    }
}
