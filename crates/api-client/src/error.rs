//! Error types for the API client

use infraplan_core::error::exit_codes;
use infraplan_geo::GeoError;
use thiserror::Error;

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// API client errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Request or response geometry was unusable
    #[error("Geometry error: {0}")]
    Geo(#[from] GeoError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// API returned an error response
    #[error("API error ({status}): {message}")]
    ApiResponse {
        /// HTTP status code
        status: u16,
        /// Error message from API
        message: String,
    },

    /// Circuit breaker is open
    #[error("Circuit breaker is open - backend temporarily unavailable")]
    CircuitOpen,

    /// Request timeout
    #[error("Request timeout after {0:?}")]
    Timeout(std::time::Duration),

    /// All retry attempts exhausted
    #[error("All {attempts} retry attempts failed: {last_error}")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Last error message
        last_error: String,
    },
}

impl ApiError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an API response error
    pub fn api_response(status: u16, message: impl Into<String>) -> Self {
        Self::ApiResponse {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is retryable
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(e) => e.is_connect() || e.is_timeout(),
            Self::ApiResponse { status, .. } => *status >= 500 || *status == 429,
            Self::Timeout(_) => true,
            Self::CircuitOpen
            | Self::Config(_)
            | Self::Json(_)
            | Self::Geo(_)
            | Self::RetriesExhausted { .. } => false,
        }
    }

    /// Whether the backend could not be reached or answered with a failure,
    /// as opposed to the caller sending something unusable
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        !matches!(self, Self::Config(_) | Self::Geo(_)) && !self.is_client_error()
    }

    /// Check if this is a client error (4xx)
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiResponse { status, .. } if (400..500).contains(status))
    }

    /// Check if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiResponse { status, .. } if *status >= 500)
    }

    /// Process exit code for this error
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => exit_codes::CONFIG_ERROR,
            Self::Geo(_) => exit_codes::VALIDATION_ERROR,
            Self::Timeout(_) => exit_codes::TIMEOUT,
            _ => exit_codes::BACKEND_UNAVAILABLE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        assert!(ApiError::api_response(503, "down").is_retryable());
        assert!(ApiError::api_response(429, "slow down").is_retryable());
        assert!(!ApiError::api_response(404, "missing").is_retryable());
        assert!(!ApiError::CircuitOpen.is_retryable());
    }

    #[test]
    fn test_status_classes() {
        let not_found = ApiError::api_response(404, "missing");
        assert!(not_found.is_client_error());
        assert!(!not_found.is_server_error());
        assert!(!not_found.is_unavailable());

        let bad_gateway = ApiError::api_response(502, "bad gateway");
        assert!(bad_gateway.is_server_error());
        assert!(bad_gateway.is_unavailable());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(ApiError::config("x").exit_code(), exit_codes::CONFIG_ERROR);
        assert_eq!(
            ApiError::CircuitOpen.exit_code(),
            exit_codes::BACKEND_UNAVAILABLE
        );
        assert_eq!(
            ApiError::Geo(GeoError::InvalidCellSize(0.0)).exit_code(),
            exit_codes::VALIDATION_ERROR
        );
    }
}
