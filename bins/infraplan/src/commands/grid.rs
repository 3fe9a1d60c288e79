//! Coverage, color and density grid commands

use super::{read_input, Context};
use anyhow::{Context as _, Result};
use infraplan_cli::output::{
    format_coords, format_count, format_distance, key_value_table, swatch, Status,
};
use infraplan_geo::geojson::{hexagons_to_feature_collection, parse_population_layer};
use infraplan_geo::hexbin::bin_points_to_h3;
use infraplan_geo::{
    bin_points_to_hexagons, color_for_value, legend_breaks, Facility, FacilityId, FacilityType,
    GeoError, HexagonLayer, PopulationPoint,
};
use serde_json::{json, Value};
use std::path::Path;

/// How points are grouped into cells
#[derive(Debug, Clone, Copy)]
pub enum Binning {
    /// Rounded coordinate buckets of this many degrees
    Rounded(f64),
    /// H3 cells at this resolution
    H3(u8),
}

pub fn coverage(ctx: &Context, facility_type: FacilityType, lat: f64, lng: f64) -> Result<()> {
    if !facility_type.is_known() {
        tracing::warn!("unrecognized facility type, using the default radius");
    }
    let facility = Facility::new(
        FacilityId::from("cli"),
        ctx.table.profile(facility_type).label,
        facility_type,
        lat,
        lng,
    );
    let layer = ctx.table.derive(&facility);

    ctx.emit(&layer, || {
        println!(
            "{}",
            key_value_table(&[
                ("Type", layer.name.clone()),
                ("Center", format_coords(layer.center.lat, layer.center.lng)),
                ("Inner radius", format_distance(layer.min_radius)),
                ("Outer radius", format_distance(layer.max_radius)),
                ("Color", swatch(&layer.color)),
            ])
        );
    })
}

pub fn radii(ctx: &Context) -> Result<()> {
    let types = FacilityType::ALL
        .iter()
        .copied()
        .chain(std::iter::once(FacilityType::Unknown));
    let profiles: Vec<Value> = types
        .clone()
        .map(|t| {
            let p = ctx.table.profile(t);
            json!({
                "type": t,
                "label": p.label,
                "radius_km": p.radius_km,
                "color": p.color,
                "recommendation_color": p.recommendation_color,
            })
        })
        .collect();

    ctx.emit(&profiles, || {
        let rows: Vec<(&str, String)> = types
            .map(|t| {
                let p = ctx.table.profile(t);
                (p.label, format!("{:>4} km  {}", p.radius_km, swatch(p.color)))
            })
            .collect();
        println!("{}", key_value_table(&rows));
    })
}

pub fn color(ctx: &Context, value: f64, max: f64) -> Result<()> {
    let color = color_for_value(value, max)?;
    ctx.emit(&json!({ "value": value, "max": max, "color": color }), || {
        println!("{}", swatch(color));
    })
}

pub fn legend(ctx: &Context, max: f64) -> Result<()> {
    let entries = legend_breaks(max)?;
    ctx.emit(&entries, || {
        for e in &entries {
            println!("{}  {:>8.0} - {:<8.0}", swatch(e.color), e.min, e.max);
        }
    })
}

fn read_points(input: &Path) -> Result<Vec<PopulationPoint>> {
    let text = read_input(input)?;
    serde_json::from_str(&text).with_context(|| {
        format!(
            "{} is not a JSON array of {{lat, lng, intensity}}",
            input.display()
        )
    })
}

pub fn hexbin(ctx: &Context, input: &Path, binning: Binning, geojson: bool) -> Result<()> {
    let points = read_points(input)?;
    let cells = match binning {
        Binning::Rounded(size) => bin_points_to_hexagons(&points, size)?,
        Binning::H3(resolution) => bin_points_to_h3(&points, resolution)?,
    };
    let layer = HexagonLayer::from_cells(cells);
    print_layer(ctx, &layer, geojson, points.len())
}

pub fn population_layer(ctx: &Context, input: &Path, geojson: bool) -> Result<()> {
    let text = read_input(input)?;
    let value: Value = serde_json::from_str(&text).map_err(GeoError::from)?;
    let layer = parse_population_layer(&value)?;
    if layer.cells.is_empty() {
        Status::warning("No polygon features found");
    }
    let count = layer.cells.len();
    print_layer(ctx, &layer, geojson, count)
}

fn print_layer(ctx: &Context, layer: &HexagonLayer, geojson: bool, inputs: usize) -> Result<()> {
    if geojson {
        let collection = hexagons_to_feature_collection(&layer.cells);
        println!("{}", serde_json::to_string_pretty(&collection)?);
        return Ok(());
    }

    let summary = json!({
        "cells": layer.cells.len(),
        "total_population": layer.total_population(),
        "max_population": layer.max_population,
        "opacity": ctx.config.schema.hexagon.opacity,
    });
    ctx.emit(&summary, || {
        println!(
            "{}",
            key_value_table(&[
                ("Inputs", inputs.to_string()),
                ("Cells", format_count(layer.cells.len(), "cell", "cells")),
                ("Total population", format!("{:.0}", layer.total_population())),
                ("Max per cell", format!("{:.0}", layer.max_population)),
            ])
        );
        let mut densest: Vec<_> = layer.cells.iter().collect();
        densest.sort_by(|a, b| b.population.total_cmp(&a.population));
        for cell in densest.iter().take(5) {
            let color = color_for_value(cell.population, layer.max_population).unwrap_or("#999999");
            println!("  {} {:<24} {:>8.0}", swatch(color), cell.id, cell.population);
        }
    })
}
