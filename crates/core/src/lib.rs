//! Core utilities for infraplan tools
//!
//! This crate provides shared functionality used by the backend client and the CLI:
//!
//! - **Error handling**: Coded errors with context and recovery suggestions
//! - **Configuration**: `infraplan.toml` loading (backend, default area, hexagon
//!   settings, coverage radius overrides) with validation
//! - **Retry policy**: Exponential backoff settings and a circuit breaker
//!
//! # Example
//!
//! ```rust,no_run
//! use infraplan_core::config::Config;
//!
//! let config = Config::load(None).expect("invalid configuration");
//! let bbox = config.schema.area.bounding_box();
//! let table = config.schema.coverage_table().expect("invalid coverage overrides");
//! println!("{:?} with {} km hospital radius", bbox, table.radius_km("hospital".parse().unwrap()));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod retry;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, ConfigSchema};
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
    pub use crate::retry::{CircuitBreaker, CircuitBreakerConfig, CircuitState, RetryConfig};
}
