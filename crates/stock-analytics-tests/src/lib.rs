//! Integration tests for the Stock Analytics API.
//!
//! Each test starts an in-process mock of the FMP stable API and the backend
//! on loopback ports, then talks to the backend over HTTP with reqwest.
//!
//! The mock recognizes a few special tickers:
//!
//! | Ticker | Upstream behavior |
//! |--------|-------------------|
//! | `AAPL` | Canned data on every endpoint |
//! | `LOCKED` | 403 |
//! | `SLOW` | Answers after the client timeout |
//! | `BADKEY` | 200 with an `Error Message` body |
//! | `BROKEN` | 502 |
//! | anything else | Empty list |

use axum::Router;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use fmp_client::sink::MemorySink;
use fmp_client::{ClientConfig, FmpClient};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use stock_analytics_backend::api::create_router;
use stock_analytics_backend::state::AppState;
use tokio::net::TcpListener;

/// API key the backend forwards to the mock.
pub const TEST_API_KEY: &str = "itest-key-4321";

/// Client timeout used by the backend under test.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_millis(300);

type Params = Query<HashMap<String, String>>;

/// Serves `router` on an ephemeral loopback port.
pub async fn spawn(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local address");
    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("Test server failed");
    });
    addr
}

/// Special-ticker handling shared by every symbol endpoint.
async fn special(params: &HashMap<String, String>) -> Option<Response> {
    match params.get("symbol").map(String::as_str) {
        Some("LOCKED") => Some(StatusCode::FORBIDDEN.into_response()),
        Some("BROKEN") => Some(StatusCode::BAD_GATEWAY.into_response()),
        Some("BADKEY") => Some(
            axum::Json(json!({"Error Message": "Invalid API KEY. Please retry."})).into_response(),
        ),
        Some("SLOW") => {
            tokio::time::sleep(UPSTREAM_TIMEOUT * 5).await;
            Some(axum::Json(json!([])).into_response())
        }
        _ => None,
    }
}

fn respond(params: &HashMap<String, String>, body: Value) -> Response {
    if params.get("apikey").map(String::as_str) != Some(TEST_API_KEY) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match params.get("symbol").map(String::as_str) {
        Some("AAPL") | None => axum::Json(body).into_response(),
        Some(_) => axum::Json(json!([])).into_response(),
    }
}

async fn profile(Query(params): Params) -> Response {
    if let Some(response) = special(&params).await {
        return response;
    }
    respond(
        &params,
        json!([{
            "symbol": "AAPL",
            "companyName": "Apple Inc.",
            "price": 232.8,
            "beta": 1.24,
            "marketCap": 3_500_000_000_000_i64,
            "lastDividend": 0.99,
            "range": "164.08-237.49",
            "change": 4.79,
            "changePercentage": 2.1,
            "volume": 52_000_000,
            "averageVolume": 49_000_000,
            "currency": "USD",
            "exchange": "NASDAQ",
            "exchangeFullName": "NASDAQ Global Select",
            "industry": "Consumer Electronics",
            "sector": "Technology",
            "country": "US",
            "website": "https://www.apple.com",
            "description": "Apple Inc. designs smartphones.",
            "ceo": "Mr. Timothy D. Cook",
            "fullTimeEmployees": "164000",
            "image": "https://images.financialmodelingprep.com/symbol/AAPL.png",
            "ipoDate": "1980-12-12"
        }]),
    )
}

async fn most_actives(Query(params): Params) -> Response {
    respond(
        &params,
        json!([
            {"symbol": "F", "name": "Ford Motor Company", "price": 11.2, "change": 0.1, "changesPercentage": 0.9},
            {"symbol": "AAPL", "name": "Apple Inc.", "price": 230.0, "change": 1.0, "changesPercentage": 0.4},
            {"symbol": "PLTR", "name": "Palantir Technologies", "price": 41.5, "change": -0.5, "changesPercentage": -1.2}
        ]),
    )
}

async fn historical_price_light(Query(params): Params) -> Response {
    if let Some(response) = special(&params).await {
        return response;
    }
    respond(
        &params,
        json!([
            {"symbol": "AAPL", "date": "2024-01-05", "price": 181.18, "volume": 62_303_300},
            {"symbol": "AAPL", "date": "2024-01-02", "price": 185.64, "volume": 82_488_700},
            {"symbol": "AAPL", "date": "2024-01-04", "price": 181.91, "volume": 71_983_600},
            {"symbol": "AAPL", "date": "2024-01-03", "price": 184.25, "volume": 58_414_460}
        ]),
    )
}

async fn key_metrics_ttm(Query(params): Params) -> Response {
    if let Some(response) = special(&params).await {
        return response;
    }
    respond(
        &params,
        json!([{"symbol": "AAPL", "marketCap": 3_500_000_000_000_i64, "currentRatioTTM": 0.87}]),
    )
}

async fn financial_scores(Query(params): Params) -> Response {
    if let Some(response) = special(&params).await {
        return response;
    }
    respond(
        &params,
        json!([{"symbol": "AAPL", "altmanZScore": 9.1, "piotroskiScore": 8}]),
    )
}

async fn financial_growth(Query(params): Params) -> Response {
    if let Some(response) = special(&params).await {
        return response;
    }
    let period = params.get("period").cloned().unwrap_or_default();
    let limit: usize = params.get("limit").and_then(|l| l.parse().ok()).unwrap_or(0);
    let records: Vec<Value> = (0..limit)
        .map(|i| json!({"symbol": "AAPL", "period": period, "fiscalYear": 2024 - i as i64}))
        .collect();
    respond(&params, Value::Array(records))
}

async fn analyst_estimates(Query(params): Params) -> Response {
    if let Some(response) = special(&params).await {
        return response;
    }
    let page = params.get("page").cloned().unwrap_or_default();
    respond(
        &params,
        json!([{"symbol": "AAPL", "date": "2026-09-27", "epsAvg": 8.5, "page": page}]),
    )
}

/// Mock of the FMP stable API.
#[must_use]
pub fn mock_fmp() -> Router {
    Router::new()
        .route("/stable/profile", get(profile))
        .route("/stable/most-actives", get(most_actives))
        .route("/stable/historical-price-eod/light", get(historical_price_light))
        .route("/stable/key-metrics-ttm", get(key_metrics_ttm))
        .route("/stable/financial-scores", get(financial_scores))
        .route("/stable/financial-growth", get(financial_growth))
        .route("/stable/analyst-estimates", get(analyst_estimates))
}

/// Backend under test plus the sink it logs to.
pub struct TestServer {
    /// Backend base URL, e.g. `http://127.0.0.1:40000`.
    pub base_url: String,
    /// Events emitted by the backend.
    pub sink: Arc<MemorySink>,
    client: reqwest::Client,
}

impl TestServer {
    /// Starts the backend against [`mock_fmp`].
    pub async fn start() -> Self {
        Self::with_upstream(mock_fmp()).await
    }

    /// Starts the backend against a custom upstream router.
    pub async fn with_upstream(upstream: Router) -> Self {
        let upstream_addr = spawn(upstream).await;

        let sink = Arc::new(MemorySink::new());
        let client = FmpClient::new(
            ClientConfig {
                base_url: format!("http://{}/stable", upstream_addr),
                api_key: TEST_API_KEY.to_string(),
                timeout: UPSTREAM_TIMEOUT,
            },
            sink.clone(),
        )
        .expect("Failed to create upstream client");
        let state = Arc::new(AppState::new(client, sink.clone()));

        let addr = spawn(create_router(state)).await;
        Self {
            base_url: format!("http://{}", addr),
            sink,
            client: reqwest::Client::new(),
        }
    }

    /// Issues a GET against the backend.
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("Request to backend failed")
    }

    /// Issues a GET and decodes the JSON body.
    pub async fn get_json(&self, path: &str) -> (StatusCode, Value) {
        let response = self.get(path).await;
        let status = StatusCode::from_u16(response.status().as_u16())
            .expect("Backend returned an invalid status");
        let body = response.json().await.expect("Backend returned invalid JSON");
        (status, body)
    }
}

/// Asserts the `{detail, timestamp, path}` error envelope.
pub fn assert_error_envelope(body: &Value, detail: &str, path: &str) {
    assert_eq!(body["detail"], detail, "unexpected detail in {}", body);
    assert_eq!(body["path"], path);
    assert!(
        body["timestamp"]
            .as_str()
            .is_some_and(|ts| ts.ends_with('Z')),
        "timestamp missing in {}",
        body
    );
}
