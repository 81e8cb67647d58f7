//! Unit tests for error module.

use super::*;

// ============================================================================
// ErrorResponse Tests
// ============================================================================

#[test]
fn test_error_response_serialization() {
    let response = ErrorResponse {
        detail: "Company ZZZZ not found".to_string(),
        timestamp: "2024-01-01T00:00:00.000Z".to_string(),
        path: "/api/company/zzzz".to_string(),
    };

    let json = serde_json::to_string(&response).unwrap();
    assert!(json.contains("\"detail\":\"Company ZZZZ not found\""));
    assert!(json.contains("\"timestamp\":\"2024-01-01T00:00:00.000Z\""));
    assert!(json.contains("\"path\":\"/api/company/zzzz\""));
}

#[test]
fn test_error_response_new_sets_timestamp() {
    let response = ErrorResponse::new("boom", "/x");

    assert!(!response.timestamp.is_empty());
    assert_eq!(response.path, "/x");
}

// ============================================================================
// ApiError Display Tests
// ============================================================================

#[test]
fn test_api_error_not_found_display() {
    let error = ApiError::NotFound("Company AAPL not found".to_string());
    assert_eq!(format!("{}", error), "Company AAPL not found");
}

#[test]
fn test_api_error_internal_display() {
    let error = ApiError::Internal("Internal server error".to_string());
    assert_eq!(format!("{}", error), "Internal server error");
}

// ============================================================================
// ApiError IntoResponse Tests
// ============================================================================

#[test]
fn test_api_error_not_found_into_response() {
    let response = ApiError::NotFound("missing".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.extensions().get::<ErrorDetail>(),
        Some(&ErrorDetail("missing".to_string()))
    );
}

#[test]
fn test_api_error_forbidden_into_response() {
    let response = ApiError::Forbidden("no".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[test]
fn test_api_error_gateway_timeout_into_response() {
    let response = ApiError::GatewayTimeout("slow".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
}

#[test]
fn test_api_error_upstream_into_response() {
    let response = ApiError::Upstream("bad".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn test_api_error_internal_into_response() {
    let response = ApiError::Internal("oops".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

// ============================================================================
// UpstreamError Conversion Tests
// ============================================================================

#[test]
fn test_from_upstream_timeout() {
    let error = ApiError::from(UpstreamError::Timeout);
    assert_eq!(error.status_code(), StatusCode::GATEWAY_TIMEOUT);
    assert!(error.to_string().contains("timed out"));
}

#[test]
fn test_from_upstream_forbidden() {
    let error = ApiError::from(UpstreamError::Forbidden);
    assert_eq!(error.status_code(), StatusCode::FORBIDDEN);
    assert!(error.to_string().contains("API key"));
}

#[test]
fn test_from_upstream_http_and_app_errors() {
    let http = ApiError::from(UpstreamError::Http { status: 429 });
    assert_eq!(http.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(http.to_string(), "FMP API error: 429");

    let app = ApiError::from(UpstreamError::App("Invalid API KEY.".to_string()));
    assert_eq!(app.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

    let network = ApiError::from(UpstreamError::Network("refused".to_string()));
    assert_eq!(network.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn test_render_error() {
    let response = render_error(StatusCode::NOT_FOUND, "gone", "/api/x");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Query Rejection Tests
// ============================================================================

#[test]
fn test_api_error_bad_request_into_response() {
    let response = ApiError::BadRequest("bad days".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.extensions().get::<ErrorDetail>(),
        Some(&ErrorDetail("bad days".to_string()))
    );
}

#[test]
fn test_api_error_from_query_rejection() {
    use crate::models::StockPricesQuery;
    use axum::extract::Query;
    use axum::http::Uri;

    let uri: Uri = "/api/stock-prices/AAPL?days=abc".parse().unwrap();
    let rejection = Query::<StockPricesQuery>::try_from_uri(&uri).unwrap_err();

    let error = ApiError::from(rejection);
    assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
    assert!(error.to_string().contains("days"));
}
