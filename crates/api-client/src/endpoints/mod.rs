//! Endpoint-specific API implementations
//!
//! | Module | Backend route | Description |
//! |--------|---------------|-------------|
//! | `facilities` | `GET /facilities/{type}` | Existing facilities inside a box |
//! | `population` | `GET /population-density` | Population density points |
//! | `recommendations` | `POST /recommend`, `POST /ai/recommend` | Placement suggestions |
//!
//! Each API offers a strict `fetch*` method and a `*_or_mock` variant that
//! falls back to generated data when the client allows it.

pub mod facilities;
pub mod population;
pub mod recommendations;

pub use facilities::FacilitiesApi;
pub use population::PopulationApi;
pub use recommendations::{AiRecommendRequest, RecommendResponse, RecommendationsApi};
