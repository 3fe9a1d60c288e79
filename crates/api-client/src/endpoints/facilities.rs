//! Facility listing endpoint

use crate::client::{DataSource, Fetched, InfraplanClient};
use crate::error::ApiResult;
use crate::mock;
use infraplan_geo::{BoundingBox, Facility, FacilityType};

/// Facility API interface
#[derive(Clone)]
pub struct FacilitiesApi {
    client: InfraplanClient,
}

impl FacilitiesApi {
    /// Create a new facilities API interface
    pub(crate) fn new(client: InfraplanClient) -> Self {
        Self { client }
    }

    /// Facilities of one type inside `bbox`
    pub async fn fetch(
        &self,
        facility_type: FacilityType,
        bbox: &BoundingBox,
    ) -> ApiResult<Vec<Facility>> {
        bbox.validate()?;
        let path = format!("facilities/{}", facility_type.as_str());
        self.client.get(&path, &bbox.to_query()).await
    }

    /// Like [`fetch`](Self::fetch), with generated facilities when the backend is down
    pub async fn fetch_or_mock(
        &self,
        facility_type: FacilityType,
        bbox: &BoundingBox,
    ) -> ApiResult<Fetched<Vec<Facility>>> {
        bbox.validate()?;
        let result = self.fetch(facility_type, bbox).await;
        self.client.or_mock("facilities", result, || {
            mock::facilities(&mut rand::rng(), facility_type, bbox)
        })
    }

    /// Facilities of several types, fetched one after another
    pub async fn fetch_many_or_mock(
        &self,
        types: &[FacilityType],
        bbox: &BoundingBox,
    ) -> ApiResult<Fetched<Vec<Facility>>> {
        let mut all = Vec::new();
        let mut source = DataSource::Backend;
        for &facility_type in types {
            let fetched = self.fetch_or_mock(facility_type, bbox).await?;
            if fetched.is_mock() {
                source = fetched.source;
            }
            all.extend(fetched.data);
        }
        Ok(Fetched { data: all, source })
    }
}
