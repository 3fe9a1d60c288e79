//! Placement recommendation endpoints
//!
//! `POST /recommend` answers with plain JSON locations; `POST /ai/recommend`
//! answers with a GeoJSON `FeatureCollection` of Point features.

use crate::client::{Fetched, InfraplanClient};
use crate::error::ApiResult;
use crate::mock;
use infraplan_geo::analysis::estimated_improvement_percent;
use infraplan_geo::geojson::parse_recommendation_collection;
use infraplan_geo::{
    bounding_box_area_km2, AreaQuery, BoundingBox, Facility, FacilityType, GeoPoint,
    RecommendationLocation,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Suggestions requested from the AI endpoint unless told otherwise
pub const DEFAULT_RECOMMENDATIONS_COUNT: u32 = 5;

const OPTIMAL_PLACEMENT: &str = "optimal_placement";

/// Body of `POST /recommend`
#[derive(Debug, Clone, Serialize)]
struct RecommendRequest {
    facility_type: FacilityType,
    area_bounds: AreaQuery,
}

/// Suggested sites plus the expected coverage gain in percent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendResponse {
    /// Suggested sites
    pub locations: Vec<RecommendationLocation>,
    /// Expected coverage gain in percent
    #[serde(default)]
    pub improvement_score: f64,
}

/// An existing facility as the AI endpoint expects it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AiFacility {
    #[serde(rename = "type")]
    pub facility_type: FacilityType,
    /// `[lng, lat]`
    pub coordinates: [f64; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl From<&Facility> for AiFacility {
    fn from(f: &Facility) -> Self {
        Self {
            facility_type: f.facility_type,
            coordinates: [f.longitude, f.latitude],
            name: Some(f.name.clone()),
        }
    }
}

/// Description of the analysed area
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaInformation {
    pub bounds: BoundingBox,
    pub center: GeoPoint,
    pub area_size_km2: f64,
}

/// Body of `POST /ai/recommend`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AiRecommendRequest {
    pub target_facility_type: FacilityType,
    pub recommendations_count: u32,
    pub existing_facilities: Vec<AiFacility>,
    pub area_information: AreaInformation,
    pub request_type: String,
}

impl AiRecommendRequest {
    /// Request for an optimal placement of `target` inside `bbox`
    pub fn new(
        target: FacilityType,
        bbox: &BoundingBox,
        existing: &[Facility],
    ) -> ApiResult<Self> {
        let area_size_km2 = bounding_box_area_km2(bbox)?;
        Ok(Self {
            target_facility_type: target,
            recommendations_count: DEFAULT_RECOMMENDATIONS_COUNT,
            existing_facilities: existing.iter().map(AiFacility::from).collect(),
            area_information: AreaInformation {
                bounds: *bbox,
                center: bbox.center(),
                area_size_km2,
            },
            request_type: OPTIMAL_PLACEMENT.to_string(),
        })
    }

    /// Ask for a different number of suggestions (at least one)
    #[must_use]
    pub fn with_count(mut self, count: u32) -> Self {
        self.recommendations_count = count.max(1);
        self
    }
}

/// Turn an AI `FeatureCollection` into a response. A missing
/// `improvement_score` is estimated from the suggestion scores.
fn ai_response(value: &Value) -> ApiResult<RecommendResponse> {
    let locations = parse_recommendation_collection(value)?;
    let improvement_score = value
        .get("improvement_score")
        .and_then(Value::as_f64)
        .unwrap_or_else(|| estimated_improvement_percent(&locations));
    Ok(RecommendResponse {
        locations,
        improvement_score,
    })
}

fn mock_response(bbox: &BoundingBox) -> RecommendResponse {
    let mut rng = rand::rng();
    RecommendResponse {
        locations: mock::recommendations(&mut rng, bbox),
        improvement_score: mock::improvement_score(&mut rng),
    }
}

/// Recommendation API interface
#[derive(Clone)]
pub struct RecommendationsApi {
    client: InfraplanClient,
}

impl RecommendationsApi {
    /// Create a new recommendations API interface
    pub(crate) fn new(client: InfraplanClient) -> Self {
        Self { client }
    }

    /// Suggested sites for a facility type inside `bbox`
    pub async fn fetch(
        &self,
        facility_type: FacilityType,
        bbox: &BoundingBox,
    ) -> ApiResult<RecommendResponse> {
        bbox.validate()?;
        let body = RecommendRequest {
            facility_type,
            area_bounds: bbox.to_query(),
        };
        self.client.post("recommend", &body).await
    }

    /// Like [`fetch`](Self::fetch), with generated suggestions when the backend is down
    pub async fn fetch_or_mock(
        &self,
        facility_type: FacilityType,
        bbox: &BoundingBox,
    ) -> ApiResult<Fetched<RecommendResponse>> {
        bbox.validate()?;
        let result = self.fetch(facility_type, bbox).await;
        self.client
            .or_mock("recommend", result, || mock_response(bbox))
    }

    /// Suggestions from the AI endpoint, which also weighs existing facilities
    pub async fn fetch_ai(&self, request: &AiRecommendRequest) -> ApiResult<RecommendResponse> {
        request.area_information.bounds.validate()?;
        let value: Value = self.client.post("ai/recommend", request).await?;
        ai_response(&value)
    }

    /// Like [`fetch_ai`](Self::fetch_ai), with generated suggestions when the backend is down
    pub async fn fetch_ai_or_mock(
        &self,
        request: &AiRecommendRequest,
    ) -> ApiResult<Fetched<RecommendResponse>> {
        let bbox = request.area_information.bounds;
        bbox.validate()?;
        let result = self.fetch_ai(request).await;
        self.client
            .or_mock("ai/recommend", result, || mock_response(&bbox))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::unreachable_client;
    use serde_json::json;

    #[test]
    fn test_recommend_request_body() {
        let body = RecommendRequest {
            facility_type: FacilityType::FireStation,
            area_bounds: BoundingBox::BISHKEK.to_query(),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "facility_type": "fire_station",
                "area_bounds": {"min_lat": 42.8, "min_lon": 74.5, "max_lat": 42.9, "max_lon": 74.7}
            })
        );
    }

    #[test]
    fn test_recommend_response_parsing() {
        let response: RecommendResponse = serde_json::from_value(json!({
            "locations": [{"latitude": 42.85, "longitude": 74.6, "score": 0.9}],
            "improvement_score": 41.5
        }))
        .unwrap();
        assert_eq!(response.locations.len(), 1);
        assert_eq!(response.improvement_score, 41.5);
    }

    #[test]
    fn test_ai_request_body() {
        let existing = vec![Facility::new(
            7_i64,
            "Школа №7",
            FacilityType::School,
            42.87,
            74.59,
        )];
        let request =
            AiRecommendRequest::new(FacilityType::School, &BoundingBox::BISHKEK, &existing)
                .unwrap()
                .with_count(3);
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["target_facility_type"], "school");
        assert_eq!(body["recommendations_count"], 3);
        assert_eq!(body["request_type"], "optimal_placement");
        assert_eq!(body["existing_facilities"][0]["type"], "school");
        assert_eq!(body["existing_facilities"][0]["coordinates"], json!([74.59, 42.87]));
        assert_eq!(body["area_information"]["bounds"]["north"], 42.9);
        assert!((body["area_information"]["center"]["lat"].as_f64().unwrap() - 42.85).abs() < 1e-9);
        assert!(body["area_information"]["area_size_km2"].as_f64().unwrap() > 100.0);
    }

    #[test]
    fn test_ai_request_rejects_bad_bounds() {
        let bad = BoundingBox::new(42.8, 42.9, 74.7, 74.5);
        assert!(AiRecommendRequest::new(FacilityType::School, &bad, &[]).is_err());
    }

    #[test]
    fn test_ai_response_parsing() {
        let value = json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [74.61, 42.86]},
                "properties": {"name": "Новая школа", "score": 0.8, "reason": "нет школ рядом"}
            }],
            "improvement_score": 62.0
        });
        let response = ai_response(&value).unwrap();
        assert_eq!(response.improvement_score, 62.0);
        assert_eq!(response.locations[0].latitude, 42.86);
        assert_eq!(response.locations[0].longitude, 74.61);
        assert_eq!(response.locations[0].name.as_deref(), Some("Новая школа"));
    }

    #[test]
    fn test_ai_response_estimates_missing_score() {
        let value = json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [74.61, 42.86]},
                "properties": {"score": 1.0}
            }]
        });
        assert_eq!(ai_response(&value).unwrap().improvement_score, 35.0);
    }

    #[tokio::test]
    async fn test_fallback_when_backend_unreachable() {
        let client = unreachable_client(true);
        let fetched = client
            .recommendations()
            .fetch_or_mock(FacilityType::Kindergarten, &BoundingBox::BISHKEK)
            .await
            .unwrap();

        assert!(fetched.is_mock());
        assert!((3..=5).contains(&fetched.data.locations.len()));
        assert!((25.0..75.0).contains(&fetched.data.improvement_score));
    }

    #[tokio::test]
    async fn test_ai_fallback_uses_request_bounds() {
        let client = unreachable_client(true);
        let bbox = BoundingBox::new(40.6, 40.4, 72.9, 72.7);
        let request = AiRecommendRequest::new(FacilityType::Clinic, &bbox, &[]).unwrap();
        let fetched = client
            .recommendations()
            .fetch_ai_or_mock(&request)
            .await
            .unwrap();

        assert!(fetched.is_mock());
        assert!(fetched
            .data
            .locations
            .iter()
            .all(|r| bbox.contains(&r.location())));
    }
}
