//! Subcommand implementations

pub mod backend;
pub mod geometry;
pub mod grid;

use anyhow::{bail, Context as _, Result};
use infraplan_core::config::Config;
use infraplan_geo::{BoundingBox, CoverageTable, GeoPoint};
use serde::Serialize;
use std::io::Read;
use std::path::Path;

/// Settings shared by every command
pub struct Context {
    pub config: Config,
    pub table: CoverageTable,
    pub json: bool,
}

impl Context {
    pub fn new(config: Config, json: bool) -> Result<Self> {
        let table = config.schema.coverage_table()?;
        Ok(Self {
            config,
            table,
            json,
        })
    }

    /// Configured default area
    pub fn area(&self) -> BoundingBox {
        self.config.schema.area.bounding_box()
    }

    /// Print `value` as pretty JSON when `--json` is set, otherwise run `human`
    pub fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce()) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            human();
        }
        Ok(())
    }
}

/// Parse `lat,lng`
pub fn parse_point(s: &str) -> Result<GeoPoint> {
    let Some((lat, lng)) = s.split_once(',') else {
        bail!("expected `lat,lng`, got `{s}`");
    };
    let lat: f64 = lat
        .trim()
        .parse()
        .with_context(|| format!("bad latitude in `{s}`"))?;
    let lng: f64 = lng
        .trim()
        .parse()
        .with_context(|| format!("bad longitude in `{s}`"))?;
    let point = GeoPoint::new(lat, lng);
    point.validate()?;
    Ok(point)
}

/// Parse a ring written as `lat,lng;lat,lng;...`
pub fn parse_ring(s: &str) -> Result<Vec<GeoPoint>> {
    s.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(parse_point)
        .collect()
}

/// Read a whole file, or stdin for `-`
pub fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
            .map_err(infraplan_core::Error::from)
            .map_err(|e| e.with_context(format!("Failed to read {}", path.display())))
            .map_err(Into::into)
    }
}
