//! Population density endpoint

use crate::client::{Fetched, InfraplanClient};
use crate::error::ApiResult;
use crate::mock;
use infraplan_geo::{BoundingBox, PopulationPoint};

/// Population density API interface
#[derive(Clone)]
pub struct PopulationApi {
    client: InfraplanClient,
}

impl PopulationApi {
    /// Create a new population API interface
    pub(crate) fn new(client: InfraplanClient) -> Self {
        Self { client }
    }

    /// Density points inside `bbox`
    pub async fn fetch(&self, bbox: &BoundingBox) -> ApiResult<Vec<PopulationPoint>> {
        bbox.validate()?;
        self.client
            .get("population-density", &bbox.to_query())
            .await
    }

    /// Like [`fetch`](Self::fetch), with generated points when the backend is down
    pub async fn fetch_or_mock(
        &self,
        bbox: &BoundingBox,
    ) -> ApiResult<Fetched<Vec<PopulationPoint>>> {
        bbox.validate()?;
        let result = self.fetch(bbox).await;
        self.client.or_mock("population-density", result, || {
            mock::population(&mut rand::rng(), bbox)
        })
    }
}
