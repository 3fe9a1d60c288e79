//! Population coverage statistics and placement scenarios.

use crate::coverage::{CoverageLayer, CoverageTable, Facility, FacilityId, FacilityType};
use crate::hexbin::PopulationPoint;
use crate::GeoPoint;
use serde::{Deserialize, Serialize};

/// Multiplier turning a mean recommendation score into an improvement estimate.
const IMPROVEMENT_PER_SCORE: f64 = 35.0;

/// A proposed facility site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationLocation {
    pub latitude: f64,
    pub longitude: f64,
    /// Suitability in [0, 1]
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl RecommendationLocation {
    #[inline]
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// Intensity-weighted coverage of a population sample.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CoverageStats {
    pub total: f64,
    pub covered: f64,
    /// `covered / total`, 0 for an empty population
    pub ratio: f64,
}

/// Sums the intensity of points inside any layer's outer circle.
pub fn population_coverage(points: &[PopulationPoint], layers: &[CoverageLayer]) -> CoverageStats {
    let (total, covered) = points.iter().fold((0.0, 0.0), |(total, covered), p| {
        let loc = p.location();
        if layers.iter().any(|l| l.covers(&loc)) {
            (total + p.intensity, covered + p.intensity)
        } else {
            (total + p.intensity, covered)
        }
    });

    CoverageStats {
        total,
        covered,
        ratio: if total > 0.0 { covered / total } else { 0.0 },
    }
}

/// Share (0-100) of previously uncovered population that `proposed` newly covers.
///
/// Returns 0 when nothing was uncovered to begin with.
pub fn improvement_score(
    existing: &[CoverageLayer],
    proposed: &[CoverageLayer],
    points: &[PopulationPoint],
) -> f64 {
    let mut total = 0.0;
    let mut before = 0.0;
    let mut after = 0.0;

    for p in points {
        let loc = p.location();
        total += p.intensity;
        if existing.iter().any(|l| l.covers(&loc)) {
            before += p.intensity;
            after += p.intensity;
        } else if proposed.iter().any(|l| l.covers(&loc)) {
            after += p.intensity;
        }
    }

    let uncovered = total - before;
    if uncovered <= 0.0 {
        return 0.0;
    }
    ((after - before) / uncovered * 100.0).clamp(0.0, 100.0)
}

/// Rough improvement estimate shown next to recommendations: `round(mean score × 35)`.
pub fn estimated_improvement_percent(recommendations: &[RecommendationLocation]) -> f64 {
    if recommendations.is_empty() {
        return 0.0;
    }
    let mean = recommendations.iter().map(|r| r.score).sum::<f64>() / recommendations.len() as f64;
    (mean * IMPROVEMENT_PER_SCORE).round()
}

/// Fetched facilities plus locally placed ones, never persisted.
#[derive(Debug, Clone)]
pub struct Scenario {
    existing: Vec<Facility>,
    simulated: Vec<Facility>,
    table: CoverageTable,
    next_id: u64,
}

impl Scenario {
    pub fn new(existing: Vec<Facility>) -> Self {
        Self::with_table(existing, CoverageTable::standard().clone())
    }

    pub fn with_table(existing: Vec<Facility>, table: CoverageTable) -> Self {
        Self {
            existing,
            simulated: Vec::new(),
            table,
            next_id: 1,
        }
    }

    pub fn existing(&self) -> &[Facility] {
        &self.existing
    }

    pub fn simulated(&self) -> &[Facility] {
        &self.simulated
    }

    /// Places a new facility and returns its local id (`sim-N`).
    pub fn add_simulated(&mut self, facility_type: FacilityType, location: GeoPoint) -> FacilityId {
        let n = self.next_id;
        self.next_id += 1;

        let label = self.table.profile(facility_type).label;
        let id = FacilityId::Text(format!("sim-{n}"));
        self.simulated.push(Facility::new(
            id.clone(),
            format!("{label} (план) #{n}"),
            facility_type,
            location.lat,
            location.lng,
        ));
        id
    }

    /// Moves a simulated facility. Returns false if `id` is unknown.
    pub fn move_simulated(&mut self, id: &FacilityId, to: GeoPoint) -> bool {
        match self.simulated.iter_mut().find(|f| &f.id == id) {
            Some(f) => {
                f.latitude = to.lat;
                f.longitude = to.lng;
                true
            }
            None => false,
        }
    }

    pub fn remove_simulated(&mut self, id: &FacilityId) -> Option<Facility> {
        let idx = self.simulated.iter().position(|f| &f.id == id)?;
        Some(self.simulated.remove(idx))
    }

    /// Layers for existing facilities followed by simulated ones, the latter in
    /// their type's recommendation color.
    pub fn coverage_layers(&self) -> Vec<CoverageLayer> {
        let mut layers = self.table.derive_all(&self.existing);
        layers.extend(self.simulated_layers());
        layers
    }

    /// Improvement the simulated facilities bring over the existing ones.
    pub fn improvement(&self, points: &[PopulationPoint]) -> f64 {
        let existing = self.table.derive_all(&self.existing);
        improvement_score(&existing, &self.simulated_layers(), points)
    }

    fn simulated_layers(&self) -> Vec<CoverageLayer> {
        self.simulated
            .iter()
            .map(|f| {
                let mut layer = self.table.derive(f);
                layer.color = self.table.profile(f.facility_type).recommendation_color.to_string();
                layer
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive_coverage;

    const CENTER: GeoPoint = GeoPoint { lat: 42.8746, lng: 74.5698 };

    fn school_at(lat: f64, lng: f64) -> Facility {
        Facility::new(1_i64, "Школа №1", FacilityType::School, lat, lng)
    }

    fn population() -> Vec<PopulationPoint> {
        vec![
            // within 2 km of CENTER
            PopulationPoint::new(42.8746, 74.5698, 60.0),
            PopulationPoint::new(42.8800, 74.5750, 20.0),
            // ~11 km north
            PopulationPoint::new(42.9746, 74.5698, 20.0),
        ]
    }

    #[test]
    fn test_population_coverage() {
        let layers = vec![derive_coverage(&school_at(CENTER.lat, CENTER.lng))];
        let stats = population_coverage(&population(), &layers);
        assert_eq!(stats.total, 100.0);
        assert_eq!(stats.covered, 80.0);
        assert!((stats.ratio - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_coverage_empty_population() {
        let stats = population_coverage(&[], &[]);
        assert_eq!(stats, CoverageStats::default());
    }

    #[test]
    fn test_improvement_score() {
        let existing = vec![derive_coverage(&school_at(CENTER.lat, CENTER.lng))];
        let proposed = vec![derive_coverage(&school_at(42.9746, 74.5698))];
        let score = improvement_score(&existing, &proposed, &population());
        assert!((score - 100.0).abs() < 1e-9);

        assert_eq!(improvement_score(&existing, &[], &population()), 0.0);
        // duplicating existing coverage gains nothing
        assert_eq!(improvement_score(&existing, &existing, &population()), 0.0);
    }

    #[test]
    fn test_improvement_when_everything_covered() {
        let everywhere = vec![derive_coverage(&school_at(42.9246, 74.5698))];
        let mut big = everywhere[0].clone();
        big.max_radius = 50_000.0;
        assert_eq!(improvement_score(&[big], &everywhere, &population()), 0.0);
        assert_eq!(improvement_score(&[], &everywhere, &[]), 0.0);
    }

    #[test]
    fn test_estimated_improvement() {
        let rec = |score| RecommendationLocation {
            latitude: 0.0,
            longitude: 0.0,
            score,
            name: None,
            reason: None,
        };
        assert_eq!(estimated_improvement_percent(&[]), 0.0);
        assert_eq!(estimated_improvement_percent(&[rec(1.0)]), 35.0);
        assert_eq!(estimated_improvement_percent(&[rec(0.8), rec(0.9)]), 30.0);
    }

    #[test]
    fn test_scenario_lifecycle() {
        let mut scenario = Scenario::new(vec![school_at(CENTER.lat, CENTER.lng)]);
        assert_eq!(scenario.improvement(&population()), 0.0);

        let id = scenario.add_simulated(FacilityType::School, GeoPoint::new(42.5, 74.0));
        assert_eq!(id, FacilityId::Text("sim-1".into()));
        assert_eq!(scenario.coverage_layers().len(), 2);
        assert_eq!(scenario.improvement(&population()), 0.0);

        assert!(scenario.move_simulated(&id, GeoPoint::new(42.9746, 74.5698)));
        assert!((scenario.improvement(&population()) - 100.0).abs() < 1e-9);

        let layers = scenario.coverage_layers();
        assert_eq!(layers[1].color, "#FF3D3D");
        assert_eq!(layers[0].color, "#4CAF50");

        assert!(scenario.remove_simulated(&id).is_some());
        assert!(scenario.remove_simulated(&id).is_none());
        assert!(!scenario.move_simulated(&id, CENTER));
        assert!(scenario.simulated().is_empty());
        assert_eq!(scenario.existing().len(), 1);
    }

    #[test]
    fn test_simulated_ids_are_unique() {
        let mut scenario = Scenario::new(Vec::new());
        let a = scenario.add_simulated(FacilityType::Clinic, CENTER);
        scenario.remove_simulated(&a);
        let b = scenario.add_simulated(FacilityType::Clinic, CENTER);
        assert_ne!(a, b);
    }
}
