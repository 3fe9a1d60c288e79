//! Async client for the infraplan recommendation backend
//!
//! Fetches facilities, population density and placement recommendations over
//! JSON/HTTP.
//!
//! # Features
//!
//! - **Configuration**: `[api]` settings from `infraplan.toml` plus `INFRAPLAN_*` overrides
//! - **Retry with exponential backoff**: Automatic retry for transient failures
//! - **Circuit breaker**: Stop calling a backend that keeps failing
//! - **Mock fallback**: Generated data inside the requested bounds when the backend is down
//! - **Request correlation**: Every request carries an `X-Request-ID`
//!
//! # Example
//!
//! ```rust,no_run
//! use infraplan_api_client::{ClientConfig, InfraplanClient};
//! use infraplan_geo::{BoundingBox, FacilityType};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = InfraplanClient::with_config(ClientConfig::from_env()?)?;
//!
//!     let schools = client
//!         .facilities()
//!         .fetch_or_mock(FacilityType::School, &BoundingBox::BISHKEK)
//!         .await?;
//!     println!("{} schools ({:?})", schools.data.len(), schools.source);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod mock;

pub use client::{DataSource, Fetched, InfraplanClient};
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::client::{DataSource, Fetched, InfraplanClient};
    pub use crate::config::ClientConfig;
    pub use crate::endpoints::{
        AiRecommendRequest, FacilitiesApi, PopulationApi, RecommendResponse, RecommendationsApi,
    };
    pub use crate::error::{ApiError, ApiResult};
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::{ClientConfig, InfraplanClient};
    use infraplan_core::retry::RetryConfig;

    /// Client pointed at the local discard port, where connections are refused.
    pub(crate) fn unreachable_client(mock_fallback: bool) -> InfraplanClient {
        let config = ClientConfig::development()
            .with_base_url("http://127.0.0.1:9")
            .with_retry(RetryConfig::no_retry())
            .with_mock_fallback(mock_fallback);
        InfraplanClient::with_config(config).unwrap()
    }
}
