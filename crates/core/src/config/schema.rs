//! Configuration schema definitions
//!
//! Mirrors the sections of `infraplan.toml`. Every section and field has a
//! default, so an empty file is a valid configuration.

use crate::error::{Error, Result};
use infraplan_geo::{BoundingBox, CoverageTable, FacilityType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default backend location.
pub const DEFAULT_API_URL: &str = "http://localhost:8001";

/// Coverage key that overrides the radius used for unrecognized facility types.
const DEFAULT_COVERAGE_KEY: &str = "default";

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ConfigSchema {
    /// Backend connection settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Default analysis area
    #[serde(default)]
    pub area: AreaConfig,

    /// Density grid settings
    #[serde(default)]
    pub hexagon: HexagonConfig,

    /// Per-type coverage radius overrides in km, keyed by facility type tag
    #[serde(default)]
    pub coverage: BTreeMap<String, f64>,
}

/// Backend connection settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    /// Base URL of the recommendation backend
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Total attempts per request, including the first
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Serve generated data when the backend is unreachable
    #[serde(default = "default_true")]
    pub mock_fallback: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            retry_attempts: default_retry_attempts(),
            mock_fallback: true,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retry_attempts() -> u32 {
    2
}

fn default_true() -> bool {
    true
}

/// Default analysis area, Bishkek unless configured
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AreaConfig {
    /// Northern edge latitude
    #[serde(default = "default_north")]
    pub north: f64,
    /// Southern edge latitude
    #[serde(default = "default_south")]
    pub south: f64,
    /// Eastern edge longitude
    #[serde(default = "default_east")]
    pub east: f64,
    /// Western edge longitude
    #[serde(default = "default_west")]
    pub west: f64,
}

impl Default for AreaConfig {
    fn default() -> Self {
        Self {
            north: default_north(),
            south: default_south(),
            east: default_east(),
            west: default_west(),
        }
    }
}

impl AreaConfig {
    /// The area as a geo bounding box
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::new(self.north, self.south, self.east, self.west)
    }
}

fn default_north() -> f64 {
    BoundingBox::BISHKEK.north
}

fn default_south() -> f64 {
    BoundingBox::BISHKEK.south
}

fn default_east() -> f64 {
    BoundingBox::BISHKEK.east
}

fn default_west() -> f64 {
    BoundingBox::BISHKEK.west
}

/// Density grid settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HexagonConfig {
    /// Bucket size for rounding-based binning, in degrees
    #[serde(default = "default_cell_size")]
    pub cell_size_degrees: f64,

    /// H3 resolution for indexed binning (0-15)
    #[serde(default = "default_h3_resolution")]
    pub h3_resolution: u8,

    /// Fill opacity handed to the renderer
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

impl Default for HexagonConfig {
    fn default() -> Self {
        Self {
            cell_size_degrees: default_cell_size(),
            h3_resolution: default_h3_resolution(),
            opacity: default_opacity(),
        }
    }
}

fn default_cell_size() -> f64 {
    0.01
}

fn default_h3_resolution() -> u8 {
    8
}

fn default_opacity() -> f64 {
    0.7
}

impl ConfigSchema {
    /// Check every section, returning the first problem found
    pub fn validate(&self) -> Result<()> {
        let url = self.api.base_url.trim();
        if url.is_empty() {
            return Err(Error::invalid_config("api.base_url", "cannot be empty"));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(Error::invalid_config(
                "api.base_url",
                "must start with http:// or https://",
            ));
        }
        if self.api.timeout_secs == 0 {
            return Err(Error::invalid_config("api.timeout_secs", "cannot be zero"));
        }
        if self.api.retry_attempts == 0 {
            return Err(Error::invalid_config("api.retry_attempts", "must be at least 1"));
        }

        self.area
            .bounding_box()
            .validate()
            .map_err(|e| Error::invalid_config("area", e.to_string()))?;

        let cell = self.hexagon.cell_size_degrees;
        if !cell.is_finite() || cell <= 0.0 {
            return Err(Error::invalid_config(
                "hexagon.cell_size_degrees",
                format!("must be positive, got {cell}"),
            ));
        }
        if self.hexagon.h3_resolution > 15 {
            return Err(Error::invalid_config(
                "hexagon.h3_resolution",
                format!("must be between 0 and 15, got {}", self.hexagon.h3_resolution),
            ));
        }
        if !(0.0..=1.0).contains(&self.hexagon.opacity) {
            return Err(Error::invalid_config(
                "hexagon.opacity",
                format!("must be between 0 and 1, got {}", self.hexagon.opacity),
            ));
        }

        self.coverage_table().map(|_| ())
    }

    /// Standard coverage table with the `[coverage]` overrides applied.
    ///
    /// Keys are facility type tags (`school`, `fire_station`, ...) or `default`
    /// for the fallback radius.
    pub fn coverage_table(&self) -> Result<CoverageTable> {
        let mut table = CoverageTable::standard().clone();

        for (key, &radius_km) in &self.coverage {
            let field = format!("coverage.{key}");
            if !radius_km.is_finite() || radius_km <= 0.0 {
                return Err(Error::invalid_config(
                    &field,
                    format!("radius must be positive, got {radius_km}"),
                ));
            }

            let facility_type = if key == DEFAULT_COVERAGE_KEY {
                FacilityType::Unknown
            } else {
                key.parse::<FacilityType>().map_err(|_| {
                    Error::invalid_config(&field, "unknown facility type").with_suggestion(
                        format!(
                            "Use one of: {}, {}",
                            FacilityType::ALL.map(|t| t.as_str()).join(", "),
                            DEFAULT_COVERAGE_KEY
                        ),
                    )
                })?
            };
            table = table.with_radius(facility_type, radius_km);
        }

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let schema = ConfigSchema::default();
        assert!(schema.validate().is_ok());
        assert_eq!(schema.api.base_url, "http://localhost:8001");
        assert_eq!(schema.area.bounding_box(), BoundingBox::BISHKEK);
        assert_eq!(schema.hexagon.h3_resolution, 8);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let schema: ConfigSchema = toml::from_str(
            r#"
            [api]
            mock_fallback = false

            [hexagon]
            cell_size_degrees = 0.005

            [coverage]
            hospital = 4.0
            "#,
        )
        .unwrap();

        assert!(!schema.api.mock_fallback);
        assert_eq!(schema.api.timeout_secs, 30);
        assert_eq!(schema.hexagon.cell_size_degrees, 0.005);
        assert_eq!(schema.hexagon.opacity, 0.7);
        assert_eq!(schema.coverage.get("hospital"), Some(&4.0));
    }

    #[test]
    fn test_coverage_overrides() {
        let mut schema = ConfigSchema::default();
        schema.coverage.insert("hospital".into(), 4.0);
        schema.coverage.insert("default".into(), 1.0);

        let table = schema.coverage_table().unwrap();
        assert_eq!(table.radius_km(FacilityType::Hospital), 4.0);
        assert_eq!(table.radius_km(FacilityType::Unknown), 1.0);
        assert_eq!(table.radius_km(FacilityType::School), 2.0);
    }

    #[test]
    fn test_rejects_unknown_coverage_key() {
        let mut schema = ConfigSchema::default();
        schema.coverage.insert("stadium".into(), 4.0);
        let err = schema.validate().unwrap_err();
        assert!(err.message.contains("coverage.stadium"));
        assert!(err.suggestion.is_some());
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut schema = ConfigSchema::default();
        schema.api.base_url = "localhost:8001".into();
        assert!(schema.validate().is_err());

        let mut schema = ConfigSchema::default();
        schema.api.timeout_secs = 0;
        assert!(schema.validate().is_err());

        let mut schema = ConfigSchema::default();
        schema.area.north = schema.area.south;
        assert!(schema.validate().is_err());

        let mut schema = ConfigSchema::default();
        schema.hexagon.cell_size_degrees = 0.0;
        assert!(schema.validate().is_err());

        let mut schema = ConfigSchema::default();
        schema.hexagon.h3_resolution = 16;
        assert!(schema.validate().is_err());

        let mut schema = ConfigSchema::default();
        schema.coverage.insert("school".into(), -1.0);
        assert!(schema.validate().is_err());
    }
}
