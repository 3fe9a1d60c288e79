//! Generated stand-in data for when the backend is unreachable
//!
//! Everything is placed uniformly inside the requested bounds. Generators take
//! the RNG as a parameter so tests can seed it.

use infraplan_geo::{BoundingBox, Facility, FacilityType, GeoPoint, PopulationPoint, RecommendationLocation};
use rand::Rng;
use std::ops::Range;

/// Number of mock facilities per request
pub const FACILITY_COUNT: Range<i64> = 5..15;

/// Number of mock population points per request
pub const POPULATION_POINTS: usize = 200;

/// Number of mock recommendations per request
pub const RECOMMENDATION_COUNT: Range<usize> = 3..6;

/// Mock recommendation scores
pub const SCORE_RANGE: Range<f64> = 0.7..0.99;

/// Mock improvement scores, in percent
pub const IMPROVEMENT_RANGE: Range<f64> = 25.0..75.0;

fn point_in<R: Rng + ?Sized>(rng: &mut R, bbox: &BoundingBox) -> GeoPoint {
    GeoPoint::new(
        bbox.south + rng.random::<f64>() * (bbox.north - bbox.south),
        bbox.west + rng.random::<f64>() * (bbox.east - bbox.west),
    )
}

/// `fire_station` -> `Fire_station`
fn display_tag(facility_type: FacilityType) -> String {
    let tag = facility_type.as_str();
    let mut chars = tag.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// 5 to 14 facilities named `"<Type> #n"` with numbered street addresses
pub fn facilities<R: Rng + ?Sized>(
    rng: &mut R,
    facility_type: FacilityType,
    bbox: &BoundingBox,
) -> Vec<Facility> {
    let count = rng.random_range(FACILITY_COUNT);
    let label = display_tag(facility_type);

    (1..=count)
        .map(|n| {
            let at = point_in(rng, bbox);
            let mut facility =
                Facility::new(n, format!("{label} #{n}"), facility_type, at.lat, at.lng);
            facility.address = Some(format!(
                "ул. Примерная, д. {}",
                rng.random_range(1..=100)
            ));
            facility
        })
        .collect()
}

/// 200 density points with intensity in [0, 100)
pub fn population<R: Rng + ?Sized>(rng: &mut R, bbox: &BoundingBox) -> Vec<PopulationPoint> {
    (0..POPULATION_POINTS)
        .map(|_| {
            let at = point_in(rng, bbox);
            PopulationPoint::new(at.lat, at.lng, rng.random::<f64>() * 100.0)
        })
        .collect()
}

/// 3 to 5 recommended sites with scores in [0.7, 0.99)
pub fn recommendations<R: Rng + ?Sized>(
    rng: &mut R,
    bbox: &BoundingBox,
) -> Vec<RecommendationLocation> {
    let count = rng.random_range(RECOMMENDATION_COUNT);

    (0..count)
        .map(|_| {
            let at = point_in(rng, bbox);
            RecommendationLocation {
                latitude: at.lat,
                longitude: at.lng,
                score: rng.random_range(SCORE_RANGE),
                name: None,
                reason: Some(format!(
                    "Высокая концентрация населения, отсутствие подобных объектов в радиусе {} км",
                    rng.random_range(1..=5)
                )),
            }
        })
        .collect()
}

/// Improvement percentage reported next to mock recommendations
pub fn improvement_score<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.random_range(IMPROVEMENT_RANGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use infraplan_geo::FacilityId;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_facilities_shape() {
        let mut rng = rng();
        for _ in 0..20 {
            let list = facilities(&mut rng, FacilityType::School, &BoundingBox::BISHKEK);
            assert!((5..15).contains(&list.len()));

            for (i, f) in list.iter().enumerate() {
                let n = i as i64 + 1;
                assert_eq!(f.id, FacilityId::Number(n));
                assert_eq!(f.name, format!("School #{n}"));
                assert_eq!(f.facility_type, FacilityType::School);
                assert!(BoundingBox::BISHKEK.contains(&f.location()));
                assert!(f.address.as_deref().unwrap().starts_with("ул. Примерная, д. "));
            }
        }
    }

    #[test]
    fn test_facility_names_keep_tag() {
        let list = facilities(&mut rng(), FacilityType::FireStation, &BoundingBox::BISHKEK);
        assert_eq!(list[0].name, "Fire_station #1");
    }

    #[test]
    fn test_population_shape() {
        let bbox = BoundingBox::new(1.0, 0.0, 1.0, 0.0);
        let points = population(&mut rng(), &bbox);
        assert_eq!(points.len(), POPULATION_POINTS);
        assert!(points
            .iter()
            .all(|p| (0.0..100.0).contains(&p.intensity) && bbox.contains(&p.location())));
    }

    #[test]
    fn test_recommendations_shape() {
        let mut rng = rng();
        for _ in 0..20 {
            let recs = recommendations(&mut rng, &BoundingBox::BISHKEK);
            assert!((3..=5).contains(&recs.len()));
            assert!(recs.iter().all(|r| (0.7..0.99).contains(&r.score)));
            assert!(recs.iter().all(|r| r.reason.is_some()));

            let score = improvement_score(&mut rng);
            assert!((25.0..75.0).contains(&score));
        }
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let a = population(&mut rng(), &BoundingBox::BISHKEK);
        let b = population(&mut rng(), &BoundingBox::BISHKEK);
        assert_eq!(a, b);
    }
}
