//! Error types for the FMP client.

use serde::Serialize;
use thiserror::Error;


/// Coarse classification of an upstream failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The request did not complete within the configured timeout.
    Timeout,
    /// The provider answered 403.
    Forbidden,
    /// The provider answered with a non-2xx status.
    UpstreamHttpError,
    /// The provider answered 2xx with an `"Error Message"` body.
    UpstreamAppError,
    /// The request never produced a response.
    NetworkError,
    /// The response body was not valid JSON.
    DecodeError,
}

impl FailureKind {
    /// Returns the snake_case name used in log fields.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Forbidden => "forbidden",
            Self::UpstreamHttpError => "upstream_http_error",
            Self::UpstreamAppError => "upstream_app_error",
            Self::NetworkError => "network_error",
            Self::DecodeError => "decode_error",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure to construct a client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// The base URL does not parse.
    #[error("Invalid base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Upstream call failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// Request timed out.
    #[error("FMP API request timed out")]
    Timeout,

    /// Provider refused the API key or the plan limits were hit.
    #[error("API access forbidden - check API key and limits")]
    Forbidden,

    /// Provider returned a non-success status.
    #[error("FMP API error: {status}")]
    Http {
        /// HTTP status code.
        status: u16,
    },

    /// Provider reported a business error with a success status.
    #[error("FMP API error: {0}")]
    App(String),

    /// Connection, DNS or TLS failure.
    #[error("API error: {0}")]
    Network(String),

    /// Body could not be decoded as JSON.
    #[error("Invalid FMP API response: {0}")]
    Decode(String),
}

impl UpstreamError {
    /// Returns the failure classification.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Timeout => FailureKind::Timeout,
            Self::Forbidden => FailureKind::Forbidden,
            Self::Http { .. } => FailureKind::UpstreamHttpError,
            Self::App(_) => FailureKind::UpstreamAppError,
            Self::Network(_) => FailureKind::NetworkError,
            Self::Decode(_) => FailureKind::DecodeError,
        }
    }

    /// Returns the upstream HTTP status, when one was received.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Forbidden => Some(403),
            Self::Http { status } => Some(*status),
            _ => None,
        }
    }
}
