//! Main API client implementation

use crate::config::ClientConfig;
use crate::endpoints::{FacilitiesApi, PopulationApi, RecommendationsApi};
use crate::error::{ApiError, ApiResult};
use infraplan_core::retry::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Request correlation ID header
const X_REQUEST_ID: &str = "X-Request-ID";

/// Where returned data came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// The backend answered
    Backend,
    /// The backend failed and generated data was substituted
    Mock,
}

/// Data together with its source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fetched<T> {
    /// The payload
    pub data: T,
    /// Backend or generated
    pub source: DataSource,
}

impl<T> Fetched<T> {
    /// Whether this is generated stand-in data
    #[must_use]
    pub fn is_mock(&self) -> bool {
        self.source == DataSource::Mock
    }
}

/// Backend client with retry and circuit breaking
///
/// Cheap to clone; clones share the configuration and circuit breaker.
#[derive(Clone)]
pub struct InfraplanClient {
    inner: Client,
    config: Arc<ClientConfig>,
    circuit_breaker: Arc<CircuitBreaker>,
}

impl InfraplanClient {
    /// Create a new client with default configuration plus environment overrides
    pub fn new() -> ApiResult<Self> {
        let config = ClientConfig::from_env()?;
        Self::with_config(config)
    }

    /// Create a new client with specific configuration
    pub fn with_config(config: ClientConfig) -> ApiResult<Self> {
        config.validate()?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("infraplan-api-client/", env!("CARGO_PKG_VERSION"))),
        );

        let inner = Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(ApiError::Request)?;

        Ok(Self {
            inner,
            config: Arc::new(config),
            circuit_breaker: Arc::new(CircuitBreaker::new(CircuitBreakerConfig::default())),
        })
    }

    /// Get the current configuration
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Get circuit breaker state
    #[must_use]
    pub fn circuit_state(&self) -> CircuitState {
        self.circuit_breaker.state()
    }

    /// Reset the circuit breaker
    pub fn reset_circuit(&self) {
        self.circuit_breaker.reset();
    }

    // -------------------------------------------------------------------------
    // Endpoint API accessors
    // -------------------------------------------------------------------------

    /// Access facility listing endpoints
    #[must_use]
    pub fn facilities(&self) -> FacilitiesApi {
        FacilitiesApi::new(self.clone())
    }

    /// Access population density endpoints
    #[must_use]
    pub fn population(&self) -> PopulationApi {
        PopulationApi::new(self.clone())
    }

    /// Access placement recommendation endpoints
    #[must_use]
    pub fn recommendations(&self) -> RecommendationsApi {
        RecommendationsApi::new(self.clone())
    }

    // -------------------------------------------------------------------------
    // Low-level HTTP methods with resilience
    // -------------------------------------------------------------------------

    /// Perform a GET request with query parameters
    #[instrument(skip(self, query))]
    pub async fn get<T: DeserializeOwned, Q: Serialize>(
        &self,
        path: &str,
        query: &Q,
    ) -> ApiResult<T> {
        self.request(Method::GET, path, Some(query), Option::<&()>::None)
            .await
    }

    /// Perform a POST request with a JSON body
    #[instrument(skip(self, body))]
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.request(Method::POST, path, Option::<&()>::None, Some(body))
            .await
    }

    /// Resolve a backend result, substituting generated data when the
    /// backend is unavailable and fallback is enabled
    pub(crate) fn or_mock<T>(
        &self,
        what: &'static str,
        result: ApiResult<T>,
        mock: impl FnOnce() -> T,
    ) -> ApiResult<Fetched<T>> {
        match result {
            Ok(data) => Ok(Fetched {
                data,
                source: DataSource::Backend,
            }),
            Err(e) if self.config.mock_fallback && e.is_unavailable() => {
                warn!(
                    endpoint = what,
                    base_url = %self.config.base_url,
                    error = %e,
                    "Backend unavailable, using generated data"
                );
                Ok(Fetched {
                    data: mock(),
                    source: DataSource::Mock,
                })
            }
            Err(e) => Err(e),
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Execute a request with circuit breaking and retry
    async fn request<T: DeserializeOwned, Q: Serialize, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        body: Option<&B>,
    ) -> ApiResult<T> {
        let url = self.url(path);
        let request_id = Uuid::new_v4().to_string();

        if !self.circuit_breaker.can_execute() {
            warn!(
                request_id = %request_id,
                url = %url,
                "Circuit breaker is open, rejecting request"
            );
            return Err(ApiError::CircuitOpen);
        }

        self.execute_with_retry(&request_id, method, &url, query, body)
            .await
    }

    /// Execute request with retry logic
    async fn execute_with_retry<T: DeserializeOwned, Q: Serialize, B: Serialize>(
        &self,
        request_id: &str,
        method: Method,
        url: &str,
        query: Option<&Q>,
        body: Option<&B>,
    ) -> ApiResult<T> {
        let retry_config = &self.config.retry;
        let mut last_error: Option<ApiError> = None;

        for attempt in 0..retry_config.max_attempts {
            if attempt > 0 {
                let delay = retry_config.delay_for_attempt(attempt);
                debug!(
                    request_id = %request_id,
                    attempt = attempt,
                    delay_ms = delay.as_millis(),
                    "Retrying after delay"
                );
                tokio::time::sleep(delay).await;
            }

            let start = Instant::now();
            let result = self
                .execute_single_request(request_id, method.clone(), url, query, body)
                .await;
            let elapsed = start.elapsed();

            match result {
                Ok(value) => {
                    self.circuit_breaker.record_success();
                    debug!(
                        request_id = %request_id,
                        attempt = attempt + 1,
                        elapsed_ms = elapsed.as_millis(),
                        "Request succeeded"
                    );
                    return Ok(value);
                }
                Err(e) => {
                    if e.is_unavailable() {
                        self.circuit_breaker.record_failure();
                    }

                    if e.is_retryable() && attempt + 1 < retry_config.max_attempts {
                        debug!(
                            request_id = %request_id,
                            attempt = attempt + 1,
                            error = %e,
                            "Request failed, will retry"
                        );
                        last_error = Some(e);
                    } else {
                        debug!(
                            request_id = %request_id,
                            attempt = attempt + 1,
                            error = %e,
                            "Request failed, not retrying"
                        );
                        return Err(e);
                    }
                }
            }
        }

        Err(ApiError::RetriesExhausted {
            attempts: retry_config.max_attempts,
            last_error: last_error.map_or_else(|| "Unknown error".to_string(), |e| e.to_string()),
        })
    }

    /// Execute a single request without retry
    async fn execute_single_request<T: DeserializeOwned, Q: Serialize, B: Serialize>(
        &self,
        request_id: &str,
        method: Method,
        url: &str,
        query: Option<&Q>,
        body: Option<&B>,
    ) -> ApiResult<T> {
        let mut request = self
            .inner
            .request(method, url)
            .header(X_REQUEST_ID, request_id);

        if let Some(q) = query {
            request = request.query(q);
        }

        if let Some(b) = body {
            request = request.json(b);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(self.config.timeout)
            } else {
                ApiError::Request(e)
            }
        })?;
        Self::handle_response(response).await
    }

    /// Handle HTTP response and deserialize
    async fn handle_response<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(ApiError::Request)
        } else {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(ApiError::api_response(status.as_u16(), message))
        }
    }
}
