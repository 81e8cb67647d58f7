//! Error envelope tests for every failure class.

use axum::http::StatusCode;
use stock_analytics_tests::{TestServer, assert_error_envelope};

#[tokio::test]
async fn test_unknown_company_is_not_found() {
    let server = TestServer::start().await;

    let (status, body) = server.get_json("/api/company/zzzz").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error_envelope(&body, "Company ZZZZ not found", "/api/company/zzzz");
}

#[tokio::test]
async fn test_forbidden_upstream() {
    let server = TestServer::start().await;

    let (status, body) = server.get_json("/api/company/locked").await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_error_envelope(
        &body,
        "API access forbidden - check API key and limits",
        "/api/company/locked",
    );
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let server = TestServer::start().await;

    let (status, body) = server.get_json("/api/stock-prices/slow").await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_error_envelope(&body, "FMP API request timed out", "/api/stock-prices/slow");
}

#[tokio::test]
async fn test_upstream_http_error() {
    let server = TestServer::start().await;

    let (status, body) = server.get_json("/api/key-metrics/broken").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_error_envelope(&body, "FMP API error: 502", "/api/key-metrics/broken");
}

#[tokio::test]
async fn test_upstream_error_message_body() {
    let server = TestServer::start().await;

    let (status, body) = server.get_json("/api/company/badkey").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_error_envelope(
        &body,
        "FMP API error: Invalid API KEY. Please retry.",
        "/api/company/badkey",
    );
}

#[tokio::test]
async fn test_unknown_route() {
    let server = TestServer::start().await;

    let (status, body) = server.get_json("/api/unknown/route").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error_envelope(&body, "Not Found", "/api/unknown/route");
}

#[tokio::test]
async fn test_api_key_never_leaks() {
    let server = TestServer::start().await;

    let (_, body) = server.get_json("/api/company/locked").await;
    let (_, slow) = server.get_json("/api/company/slow").await;

    assert!(!body.to_string().contains(stock_analytics_tests::TEST_API_KEY));
    assert!(!slow.to_string().contains(stock_analytics_tests::TEST_API_KEY));
    for event in server.sink.events() {
        assert!(!event.message.contains(stock_analytics_tests::TEST_API_KEY));
    }
}

#[tokio::test]
async fn test_malformed_query_is_bad_request() {
    let server = TestServer::start().await;

    let (status, body) = server.get_json("/api/stock-prices/aapl?days=abc").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["path"], "/api/stock-prices/aapl");
    assert!(body["detail"].as_str().is_some_and(|d| d.contains("days")));
    assert!(server.sink.named("fmp_api.call").is_empty());
}
