//! Facility types and their coverage zones.
//!
//! Every facility type has a fixed service radius. A facility's coverage is drawn
//! as two concentric circles: the inner one at half the radius, the outer one at
//! the full radius.

use crate::GeoPoint;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Radius used for types without an entry in the table.
pub const DEFAULT_RADIUS_KM: f64 = 2.0;

static STANDARD_TABLE: Lazy<CoverageTable> = Lazy::new(CoverageTable::build_standard);

/// Kinds of public infrastructure the planner knows about.
///
/// Tags the backend sends that are not listed here deserialize to
/// [`FacilityType::Unknown`] and use the default profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacilityType {
    School,
    Hospital,
    Clinic,
    Kindergarten,
    College,
    University,
    FireStation,
    #[serde(other)]
    Unknown,
}

impl FacilityType {
    /// All known types, in menu order.
    pub const ALL: [FacilityType; 7] = [
        FacilityType::School,
        FacilityType::Hospital,
        FacilityType::Clinic,
        FacilityType::Kindergarten,
        FacilityType::College,
        FacilityType::University,
        FacilityType::FireStation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FacilityType::School => "school",
            FacilityType::Hospital => "hospital",
            FacilityType::Clinic => "clinic",
            FacilityType::Kindergarten => "kindergarten",
            FacilityType::College => "college",
            FacilityType::University => "university",
            FacilityType::FireStation => "fire_station",
            FacilityType::Unknown => "unknown",
        }
    }

    /// Lenient conversion used at data boundaries: anything unrecognized is `Unknown`.
    pub fn from_tag(tag: &str) -> Self {
        tag.parse().unwrap_or(FacilityType::Unknown)
    }

    pub fn is_known(&self) -> bool {
        *self != FacilityType::Unknown
    }
}

impl fmt::Display for FacilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FacilityType {
    type Err = String;

    /// Strict parse; rejects unknown tags.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        FacilityType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| format!("unknown facility type: {s}"))
    }
}

/// Facility identifier; the backend sends integers, mock and simulated facilities use strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FacilityId {
    Number(i64),
    Text(String),
}

impl fmt::Display for FacilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacilityId::Number(n) => write!(f, "{n}"),
            FacilityId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for FacilityId {
    fn from(n: i64) -> Self {
        FacilityId::Number(n)
    }
}

impl From<&str> for FacilityId {
    fn from(s: &str) -> Self {
        FacilityId::Text(s.to_string())
    }
}

/// An existing (or simulated) facility as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub id: FacilityId,
    pub name: String,
    #[serde(rename = "type", alias = "facility_type")]
    pub facility_type: FacilityType,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Facility {
    pub fn new(
        id: impl Into<FacilityId>,
        name: impl Into<String>,
        facility_type: FacilityType,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            facility_type,
            latitude,
            longitude,
            address: None,
        }
    }

    #[inline]
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// Display and service settings of one facility type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FacilityProfile {
    /// Service radius in kilometers
    pub radius_km: f64,
    /// Marker and circle color of existing facilities
    pub color: &'static str,
    /// Marker color of recommended locations
    pub recommendation_color: &'static str,
    /// Human-readable name
    pub label: &'static str,
}

const DEFAULT_PROFILE: FacilityProfile = FacilityProfile {
    radius_km: DEFAULT_RADIUS_KM,
    color: "#607D8B",
    recommendation_color: "#FF0000",
    label: "Объект",
};

/// Coverage circles around one facility. Radii are in meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageLayer {
    pub center: GeoPoint,
    #[serde(rename = "type")]
    pub facility_type: FacilityType,
    pub name: String,
    pub color: String,
    pub min_radius: f64,
    pub max_radius: f64,
}

impl CoverageLayer {
    /// True if `point` lies within the outer circle.
    #[inline]
    pub fn covers(&self, point: &GeoPoint) -> bool {
        crate::haversine_distance(&self.center, point) <= self.max_radius
    }
}

/// Immutable lookup of facility profiles.
///
/// Build once and pass by reference; [`CoverageTable::standard`] is shared
/// process-wide.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageTable {
    profiles: HashMap<FacilityType, FacilityProfile>,
    fallback: FacilityProfile,
}

impl CoverageTable {
    /// The standard table shared by the whole process.
    pub fn standard() -> &'static CoverageTable {
        &STANDARD_TABLE
    }

    fn build_standard() -> Self {
        let entries = [
            (FacilityType::School, 2.0, "#4CAF50", "#FF3D3D", "Школа"),
            (FacilityType::Hospital, 3.0, "#F44336", "#FF1C1C", "Больница"),
            (FacilityType::Clinic, 2.0, "#FF9800", "#FF5252", "Клиника"),
            (FacilityType::Kindergarten, 1.5, "#9C27B0", "#FF0000", "Детский сад"),
            (FacilityType::College, 2.0, "#2196F3", "#E60000", "Колледж"),
            (FacilityType::University, 3.0, "#3F51B5", "#FF6666", "Университет"),
            (FacilityType::FireStation, 3.0, "#FF5722", "#CC0000", "Пожарная станция"),
        ];

        let profiles = entries
            .into_iter()
            .map(|(t, radius_km, color, recommendation_color, label)| {
                (
                    t,
                    FacilityProfile {
                        radius_km,
                        color,
                        recommendation_color,
                        label,
                    },
                )
            })
            .collect();

        Self {
            profiles,
            fallback: DEFAULT_PROFILE,
        }
    }

    /// Copy of this table with the radius of `facility_type` replaced.
    ///
    /// Overriding `Unknown` changes the fallback radius.
    #[must_use]
    pub fn with_radius(mut self, facility_type: FacilityType, radius_km: f64) -> Self {
        match facility_type {
            FacilityType::Unknown => self.fallback.radius_km = radius_km,
            t => {
                let fallback = self.fallback;
                self.profiles.entry(t).or_insert(fallback).radius_km = radius_km;
            }
        }
        self
    }

    pub fn profile(&self, facility_type: FacilityType) -> &FacilityProfile {
        self.profiles.get(&facility_type).unwrap_or(&self.fallback)
    }

    #[inline]
    pub fn radius_km(&self, facility_type: FacilityType) -> f64 {
        self.profile(facility_type).radius_km
    }

    /// Coverage circles for one facility. Total: unknown types use the default radius.
    pub fn derive(&self, facility: &Facility) -> CoverageLayer {
        let profile = self.profile(facility.facility_type);
        let radius_m = profile.radius_km * 1000.0;

        CoverageLayer {
            center: facility.location(),
            facility_type: facility.facility_type,
            name: facility.name.clone(),
            color: profile.color.to_string(),
            min_radius: radius_m * 0.5,
            max_radius: radius_m,
        }
    }

    /// Coverage circles for many facilities, in input order.
    pub fn derive_all(&self, facilities: &[Facility]) -> Vec<CoverageLayer> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            facilities.par_iter().map(|f| self.derive(f)).collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            facilities.iter().map(|f| self.derive(f)).collect()
        }
    }
}

impl Default for CoverageTable {
    fn default() -> Self {
        Self::build_standard()
    }
}

/// Coverage circles for a facility using the standard table.
///
/// # Example
/// ```
/// use infraplan_geo::{derive_coverage, Facility, FacilityType};
///
/// let school = Facility::new(1_i64, "School #1", FacilityType::School, 42.87, 74.59);
/// let layer = derive_coverage(&school);
/// assert_eq!(layer.max_radius, 2000.0);
/// assert_eq!(layer.min_radius, 1000.0);
/// ```
pub fn derive_coverage(facility: &Facility) -> CoverageLayer {
    CoverageTable::standard().derive(facility)
}

/// Coverage circles for many facilities using the standard table.
pub fn derive_coverage_layers(facilities: &[Facility]) -> Vec<CoverageLayer> {
    CoverageTable::standard().derive_all(facilities)
}
