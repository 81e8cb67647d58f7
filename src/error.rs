//! Error types for the REST API.
//!
//! Handlers return [`ApiError`]. Its `IntoResponse` implementation only sets
//! the status and attaches an [`ErrorDetail`] extension; the
//! [`crate::api::middleware::error_envelope`] middleware renders the final
//! `{detail, timestamp, path}` body, since the request path is only known
//! there.

use crate::models::timestamp;
use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fmp_client::UpstreamError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[cfg(test)]
mod tests;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human readable error message.
    pub detail: String,
    /// Time the error was produced (RFC 3339).
    pub timestamp: String,
    /// Request path that failed.
    pub path: String,
}

impl ErrorResponse {
    /// Builds an error body stamped with the current time.
    #[must_use]
    pub fn new(detail: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            timestamp: timestamp(),
            path: path.into(),
        }
    }
}

/// Response extension carrying the error detail until the envelope is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail(pub String);

/// API error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Malformed request parameters.
    #[error("{0}")]
    BadRequest(String),

    /// No data for the requested resource.
    #[error("{0}")]
    NotFound(String),

    /// Upstream refused the API key.
    #[error("{0}")]
    Forbidden(String),

    /// Upstream did not answer in time.
    #[error("{0}")]
    GatewayTimeout(String),

    /// Upstream failed or answered with an error.
    #[error("{0}")]
    Upstream(String),

    /// Internal server error.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Upstream(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = self.status_code().into_response();
        response
            .extensions_mut()
            .insert(ErrorDetail(self.to_string()));
        response
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Timeout => ApiError::GatewayTimeout(err.to_string()),
            UpstreamError::Forbidden => ApiError::Forbidden(err.to_string()),
            UpstreamError::Http { .. }
            | UpstreamError::App(_)
            | UpstreamError::Network(_)
            | UpstreamError::Decode(_) => ApiError::Upstream(err.to_string()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Renders the JSON error envelope.
#[must_use]
pub fn render_error(status: StatusCode, detail: &str, path: &str) -> Response {
    (status, Json(ErrorResponse::new(detail, path))).into_response()
}
