//! Liveness and health check endpoint tests.

use axum::Router;
use axum::http::StatusCode;
use stock_analytics_tests::TestServer;

#[tokio::test]
async fn test_root() {
    let server = TestServer::start().await;

    let (status, body) = server.get_json("/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["api_provider"], "Financial Modeling Prep");
    assert!(!body["version"].as_str().unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_health_check_with_reachable_upstream() {
    let server = TestServer::start().await;

    let (status, body) = server.get_json("/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["api_status"], "healthy");
    assert_eq!(body["fmp_status"], "healthy");
    assert!(body.get("fmp_error").is_none());
}

#[tokio::test]
async fn test_health_check_with_missing_upstream_routes() {
    // every upstream call 404s
    let server = TestServer::with_upstream(Router::new()).await;

    let (status, body) = server.get_json("/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["api_status"], "healthy");
    assert_eq!(body["fmp_status"], "unhealthy");
    assert_eq!(body["fmp_error"], "FMP API error: 404");
}

#[tokio::test]
async fn test_every_response_has_request_id() {
    let server = TestServer::start().await;

    let ok = server.get("/").await;
    let missing = server.get("/nope").await;

    assert!(ok.headers().contains_key("x-request-id"));
    assert!(missing.headers().contains_key("x-request-id"));
    assert_ne!(ok.headers()["x-request-id"], missing.headers()["x-request-id"]);
}
