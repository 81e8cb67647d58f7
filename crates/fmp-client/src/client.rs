//! HTTP client for the FMP API.

use crate::error::{ClientError, UpstreamError};
use crate::request::UpstreamRequest;
use crate::sink::{Event, ObservabilitySink};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;


/// FMP stable API base URL.
pub const DEFAULT_BASE_URL: &str = "https://financialmodelingprep.com/stable";

/// Upstream request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Query parameter carrying the API key.
const API_KEY_PARAM: &str = "apikey";

/// Field FMP uses to report business errors with a 200 status.
const ERROR_MESSAGE_FIELD: &str = "Error Message";

/// Name of the event emitted once per call.
pub(crate) const CALL_EVENT: &str = "fmp_api.call";

/// Result of one upstream call.
pub type UpstreamOutcome = Result<Value, UpstreamError>;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API (e.g., "https://financialmodelingprep.com/stable").
    pub base_url: String,
    /// API key appended to every request.
    pub api_key: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: "demo".to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Returns the API key with everything but the last four characters hidden.
    #[must_use]
    pub fn masked_api_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.len() > 4 {
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("***{}", tail)
        } else {
            "demo".to_string()
        }
    }
}

/// HTTP client for the FMP API.
#[derive(Clone)]
pub struct FmpClient {
    client: Client,
    base_url: String,
    api_key: String,
    sink: Arc<dyn ObservabilitySink>,
}

impl std::fmt::Debug for FmpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FmpClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl FmpClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    /// Returns error if the base URL is invalid or the HTTP client cannot be built.
    pub fn new(config: ClientConfig, sink: Arc<dyn ObservabilitySink>) -> Result<Self, ClientError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)?;

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key,
            sink,
        })
    }

    /// Creates a client for a custom base URL with the default timeout.
    ///
    /// # Errors
    /// Returns error if the base URL is invalid or the HTTP client cannot be built.
    pub fn with_base_url(
        base_url: &str,
        api_key: &str,
        sink: Arc<dyn ObservabilitySink>,
    ) -> Result<Self, ClientError> {
        Self::new(
            ClientConfig {
                base_url: base_url.to_string(),
                api_key: api_key.to_string(),
                ..Default::default()
            },
            sink,
        )
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Performs one GET call and classifies the outcome.
    ///
    /// Exactly one `fmp_api.call` event is emitted per invocation.
    pub async fn call(&self, request: &UpstreamRequest) -> UpstreamOutcome {
        let started = Instant::now();
        let result = self.execute(request).await;
        self.report(request.endpoint(), started.elapsed(), &result);
        result.map(|(_, body)| body)
    }

    async fn execute(&self, request: &UpstreamRequest) -> Result<(StatusCode, Value), UpstreamError> {
        let url = self.request_url(request)?;

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = resp.status();
        if status == StatusCode::FORBIDDEN {
            return Err(UpstreamError::Forbidden);
        }
        if !status.is_success() {
            return Err(UpstreamError::Http {
                status: status.as_u16(),
            });
        }

        let bytes = resp.bytes().await.map_err(classify_transport)?;
        let body: Value =
            serde_json::from_slice(&bytes).map_err(|e| UpstreamError::Decode(e.to_string()))?;

        if let Some(message) = body.get(ERROR_MESSAGE_FIELD) {
            let message = match message {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            return Err(UpstreamError::App(message));
        }

        Ok((status, body))
    }

    fn request_url(&self, request: &UpstreamRequest) -> Result<Url, UpstreamError> {
        let mut url = Url::parse(&format!("{}/{}", self.base_url, request.endpoint()))
            .map_err(|e| UpstreamError::Network(e.to_string()))?;
        url.query_pairs_mut()
            .extend_pairs(request.params())
            .append_pair(API_KEY_PARAM, &self.api_key);
        Ok(url)
    }

    fn report(
        &self,
        endpoint: &str,
        elapsed: Duration,
        result: &Result<(StatusCode, Value), UpstreamError>,
    ) {
        let secs = elapsed.as_secs_f64();
        let duration_ms = (secs * 100_000.0).round() / 100.0;

        let event = match result {
            Ok((status, _)) => Event::info(
                CALL_EVENT,
                format!(
                    "FMP API RESPONSE: {} - Status: {} - Time: {:.3}s",
                    endpoint,
                    status.as_u16(),
                    secs
                ),
            )
            .field("status_code", status.as_u16()),
            Err(err) => {
                let event = Event::error(
                    CALL_EVENT,
                    format!("FMP API {}: {} - {}", err.kind(), endpoint, err),
                )
                .field("failure_kind", err.kind().as_str());
                match err.status_code() {
                    Some(code) => event.field("status_code", code),
                    None => event,
                }
            }
        };

        self.sink.emit(
            event
                .field("endpoint", endpoint)
                .field("duration_ms", duration_ms),
        );
    }
}

/// Maps a reqwest transport error onto the failure taxonomy.
///
/// The URL is stripped because it carries the API key.
fn classify_transport(err: reqwest::Error) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::Timeout
    } else {
        UpstreamError::Network(err.without_url().to_string())
    }
}
