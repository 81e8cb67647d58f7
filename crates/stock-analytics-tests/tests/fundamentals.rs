//! Key metrics, scores, growth and estimates passthrough tests.

use axum::http::StatusCode;
use serde_json::json;
use stock_analytics_tests::TestServer;

#[tokio::test]
async fn test_key_metrics_first_record() {
    let server = TestServer::start().await;

    let (status, body) = server.get_json("/api/key-metrics/aapl").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"symbol": "AAPL", "marketCap": 3_500_000_000_000_i64, "currentRatioTTM": 0.87})
    );
}

#[tokio::test]
async fn test_financial_scores_first_record() {
    let server = TestServer::start().await;

    let (status, body) = server.get_json("/api/financial-scores/AAPL").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["altmanZScore"], 9.1);
    assert_eq!(body["piotroskiScore"], 8);
}

#[tokio::test]
async fn test_financial_growth_defaults() {
    let server = TestServer::start().await;

    let (status, body) = server.get_json("/api/financial-growth/aapl").await;

    assert_eq!(status, StatusCode::OK);
    let records = body.as_array().expect("array body");
    assert_eq!(records.len(), 5);
    assert!(records.iter().all(|r| r["period"] == "FY"));
}

#[tokio::test]
async fn test_financial_growth_custom_params() {
    let server = TestServer::start().await;

    let (_, body) = server
        .get_json("/api/financial-growth/aapl?period=quarter&limit=2")
        .await;

    let records = body.as_array().expect("array body");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["period"], "quarter");
}

#[tokio::test]
async fn test_analyst_estimates_first_page() {
    let server = TestServer::start().await;

    let (status, body) = server.get_json("/api/analyst-estimates/aapl").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["page"], "0");
    assert_eq!(body[0]["epsAvg"], 8.5);
}

#[tokio::test]
async fn test_fundamentals_not_found() {
    let server = TestServer::start().await;

    let (status, body) = server.get_json("/api/financial-scores/msft").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Financial scores for MSFT not found");

    let (status, body) = server.get_json("/api/analyst-estimates/msft").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Analyst estimates for MSFT not found");
}
