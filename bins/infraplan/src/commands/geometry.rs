//! Point, polygon and projection commands

use super::{parse_ring, Context};
use crate::BboxArgs;
use anyhow::Result;
use infraplan_cli::output::{format_area, format_coords, format_distance, key_value_table};
use infraplan_geo::{
    bounding_box_area_km2, geographic_to_web_mercator, haversine_distance, point_in_polygon,
    polygon_centroid, web_mercator_to_geographic, web_mercator_to_geographic_clamped, GeoPoint,
};
use serde_json::json;

pub fn distance(ctx: &Context, lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> Result<()> {
    let from = GeoPoint::new(lat1, lng1);
    let to = GeoPoint::new(lat2, lng2);
    let meters = haversine_distance(&from, &to);

    ctx.emit(&json!({ "from": from, "to": to, "meters": meters }), || {
        println!("{}", format_distance(meters));
    })
}

pub fn unproject(ctx: &Context, x: f64, y: f64, clamp: bool) -> Result<()> {
    let point = if clamp {
        web_mercator_to_geographic_clamped(x, y)
    } else {
        web_mercator_to_geographic(x, y)
    };

    ctx.emit(&point, || println!("{}", format_coords(point.lat, point.lng)))
}

pub fn project(ctx: &Context, lat: f64, lng: f64) -> Result<()> {
    let (x, y) = geographic_to_web_mercator(&GeoPoint::new(lat, lng));
    ctx.emit(&json!({ "x": x, "y": y }), || println!("{x:.2}, {y:.2}"))
}

pub fn centroid(ctx: &Context, ring: &str) -> Result<()> {
    let ring = parse_ring(ring)?;
    let center = polygon_centroid(&ring)?;
    ctx.emit(&center, || println!("{}", format_coords(center.lat, center.lng)))
}

pub fn contains(ctx: &Context, lat: f64, lng: f64, ring: &str) -> Result<()> {
    let ring = parse_ring(ring)?;
    let inside = point_in_polygon(&GeoPoint::new(lat, lng), &ring);
    ctx.emit(&json!({ "inside": inside }), || {
        println!("{}", if inside { "inside" } else { "outside" });
    })
}

pub fn area(ctx: &Context, bbox: &BboxArgs) -> Result<()> {
    let bbox = bbox.resolve(ctx.area());
    let km2 = bounding_box_area_km2(&bbox)?;
    let center = bbox.center();

    ctx.emit(&json!({ "bounds": bbox, "area_km2": km2 }), || {
        println!(
            "{}",
            key_value_table(&[
                ("Area", format_area(km2)),
                ("Center", format_coords(center.lat, center.lng)),
                ("North/South", format!("{} / {}", bbox.north, bbox.south)),
                ("East/West", format!("{} / {}", bbox.east, bbox.west)),
            ])
        );
    })
}
