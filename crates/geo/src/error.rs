//! Error types for the geo crate.

use thiserror::Error;

/// Result type alias for geo operations.
pub type Result<T> = std::result::Result<T, GeoError>;

/// Errors that can occur during geo operations.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Polygon ring without vertices
    #[error("Polygon ring is empty")]
    EmptyRing,

    /// Degenerate or non-finite bounding box
    #[error("Invalid bounding box: {0}")]
    InvalidBoundingBox(String),

    /// Binning cell size that is zero, negative or non-finite
    #[error("Invalid cell size: {0}")]
    InvalidCellSize(f64),

    /// Color scale bounds that cannot be normalized against
    #[error("Invalid color scale: {0}")]
    InvalidScale(String),

    /// H3 resolution outside 0..=15
    #[error("Invalid H3 resolution: {0}")]
    InvalidResolution(u8),

    /// GeoJSON with an unexpected shape
    #[error("Invalid GeoJSON: {0}")]
    InvalidGeoJson(String),

    /// Invalid WKT format
    #[error("Invalid WKT format: {0}")]
    InvalidWkt(String),

    /// Invalid coordinate values
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Error code for integration with infraplan-core error handling.
/// Range: 10xxx for geo errors.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoErrorCode {
    EmptyRing = 10001,
    InvalidBoundingBox = 10002,
    InvalidCellSize = 10003,
    InvalidScale = 10004,
    InvalidResolution = 10005,
    InvalidGeoJson = 10006,
    InvalidWkt = 10007,
    InvalidCoordinate = 10008,
    JsonParsing = 10009,
}

impl GeoError {
    /// Returns the error code for this error.
    pub fn code(&self) -> GeoErrorCode {
        match self {
            GeoError::EmptyRing => GeoErrorCode::EmptyRing,
            GeoError::InvalidBoundingBox(_) => GeoErrorCode::InvalidBoundingBox,
            GeoError::InvalidCellSize(_) => GeoErrorCode::InvalidCellSize,
            GeoError::InvalidScale(_) => GeoErrorCode::InvalidScale,
            GeoError::InvalidResolution(_) => GeoErrorCode::InvalidResolution,
            GeoError::InvalidGeoJson(_) => GeoErrorCode::InvalidGeoJson,
            GeoError::InvalidWkt(_) => GeoErrorCode::InvalidWkt,
            GeoError::InvalidCoordinate(_) => GeoErrorCode::InvalidCoordinate,
            GeoError::JsonError(_) => GeoErrorCode::JsonParsing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(GeoError::EmptyRing.code() as u32, 10001);
        assert_eq!(GeoError::InvalidCellSize(0.0).code(), GeoErrorCode::InvalidCellSize);
        assert_eq!(
            GeoError::InvalidGeoJson("x".into()).code(),
            GeoErrorCode::InvalidGeoJson
        );
    }

    #[test]
    fn test_json_errors_convert() {
        let err: GeoError = serde_json::from_str::<serde_json::Value>("{\"type\":")
            .unwrap_err()
            .into();
        assert_eq!(err.code(), GeoErrorCode::JsonParsing);
        assert!(err.to_string().starts_with("JSON parsing error"));
    }

    #[test]
    fn test_error_display() {
        let err = GeoError::InvalidResolution(16);
        assert_eq!(err.to_string(), "Invalid H3 resolution: 16");
    }
}
