//! Configuration for the infraplan backend client
//!
//! Starts from `infraplan.toml` settings (or defaults) and applies environment overrides.

use crate::error::{ApiError, ApiResult};
use infraplan_core::config::{ApiConfig, DEFAULT_API_URL};
use infraplan_core::retry::RetryConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Overrides `base_url`
pub const ENV_API_URL: &str = "INFRAPLAN_API_URL";
/// Overrides `timeout`, in whole seconds
pub const ENV_TIMEOUT_SECS: &str = "INFRAPLAN_TIMEOUT_SECS";
/// Overrides `mock_fallback`; accepts `1/0`, `true/false`, `yes/no`, `on/off`
pub const ENV_MOCK_FALLBACK: &str = "INFRAPLAN_MOCK_FALLBACK";

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend base URL, e.g. `http://localhost:8001`
    pub base_url: String,
    /// Request timeout
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    /// Retry configuration
    pub retry: RetryConfig,
    /// Serve generated data instead of failing when the backend is unreachable
    pub mock_fallback: bool,
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_settings(&ApiConfig::default())
    }
}

impl ClientConfig {
    /// Build from the `[api]` section of the configuration file
    #[must_use]
    pub fn from_settings(settings: &ApiConfig) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
            retry: RetryConfig::quick().with_max_attempts(settings.retry_attempts),
            mock_fallback: settings.mock_fallback,
        }
    }

    /// Create configuration from defaults plus environment variables
    ///
    /// Reads the following environment variables:
    /// - `INFRAPLAN_API_URL`: backend base URL
    /// - `INFRAPLAN_TIMEOUT_SECS`: request timeout in seconds
    /// - `INFRAPLAN_MOCK_FALLBACK`: whether to fall back to generated data
    pub fn from_env() -> ApiResult<Self> {
        Self::default().with_env_overrides()
    }

    /// Apply environment overrides on top of this configuration
    pub fn with_env_overrides(self) -> ApiResult<Self> {
        self.with_overrides(|key| env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> ApiResult<Self> {
        if let Some(url) = lookup(ENV_API_URL) {
            self.base_url = url;
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| ApiError::config(format!("{ENV_TIMEOUT_SECS} is not a number: {raw}")))?;
            self.timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = lookup(ENV_MOCK_FALLBACK) {
            self.mock_fallback = parse_flag(&raw).ok_or_else(|| {
                ApiError::config(format!("{ENV_MOCK_FALLBACK} is not a boolean: {raw}"))
            })?;
        }

        Ok(self)
    }

    /// Local backend with a short timeout
    #[must_use]
    pub fn development() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(10),
            retry: RetryConfig::quick(),
            mock_fallback: true,
        }
    }

    /// Builder-style method to set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Builder-style method to set timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder-style method to set retry config
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Builder-style method to enable or disable the mock-data fallback
    #[must_use]
    pub fn with_mock_fallback(mut self, enabled: bool) -> Self {
        self.mock_fallback = enabled;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> ApiResult<()> {
        if self.base_url.is_empty() {
            return Err(ApiError::config("base_url cannot be empty"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ApiError::config("base_url must start with http:// or https://"));
        }

        if self.timeout.is_zero() {
            return Err(ApiError::config("timeout cannot be zero"));
        }

        Ok(())
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8001");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.retry.max_attempts, 2);
        assert!(config.mock_fallback);
    }

    #[test]
    fn test_from_settings() {
        let settings = ApiConfig {
            base_url: "https://planner.example.kg".to_string(),
            timeout_secs: 5,
            retry_attempts: 0,
            mock_fallback: false,
        };
        let config = ClientConfig::from_settings(&settings);
        assert_eq!(config.base_url, "https://planner.example.kg");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.retry.max_attempts, 1);
        assert!(!config.mock_fallback);
    }

    #[test]
    fn test_env_overrides() {
        let config = ClientConfig::default()
            .with_overrides(lookup(&[
                (ENV_API_URL, "http://10.0.0.5:8001"),
                (ENV_TIMEOUT_SECS, " 12 "),
                (ENV_MOCK_FALLBACK, "off"),
            ]))
            .unwrap();
        assert_eq!(config.base_url, "http://10.0.0.5:8001");
        assert_eq!(config.timeout, Duration::from_secs(12));
        assert!(!config.mock_fallback);
    }

    #[test]
    fn test_bad_env_values() {
        let err = ClientConfig::default()
            .with_overrides(lookup(&[(ENV_TIMEOUT_SECS, "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_TIMEOUT_SECS));

        assert!(ClientConfig::default()
            .with_overrides(lookup(&[(ENV_MOCK_FALLBACK, "maybe")]))
            .is_err());
    }

    #[test]
    fn test_builder_pattern() {
        let config = ClientConfig::default()
            .with_base_url("https://planner.example.kg")
            .with_timeout(Duration::from_secs(60))
            .with_mock_fallback(false);

        assert_eq!(config.base_url, "https://planner.example.kg");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert!(!config.mock_fallback);
    }

    #[test]
    fn test_validation() {
        assert!(ClientConfig::default().validate().is_ok());
        assert!(ClientConfig::development().validate().is_ok());
        assert!(ClientConfig::default().with_base_url("").validate().is_err());
        assert!(ClientConfig::default()
            .with_base_url("ftp://planner")
            .validate()
            .is_err());
        assert!(ClientConfig::default()
            .with_timeout(Duration::ZERO)
            .validate()
            .is_err());
    }
}
