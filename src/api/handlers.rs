//! API request handlers.
//!
//! Each handler builds one upstream request, issues it through the shared
//! [`fmp_client::FmpClient`] and either normalizes the payload, falls back to
//! static data (popular stocks only) or returns an [`ApiError`].

use crate::error::ApiError;
use crate::fallback;
use crate::models::{
    API_PROVIDER, AnalystEstimatesQuery, CompanyProfile, FinancialGrowthQuery, HealthResponse,
    Operation, PopularStock, RootResponse, StockPricePoint, StockPricesQuery, UpstreamStatus,
    timestamp,
};
use crate::normalize::{self, POPULAR_STOCKS_LIMIT, ShapeError};
use crate::state::AppState;
use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use chrono::{Days, Local, NaiveDate};
use fmp_client::UpstreamRequest;
use fmp_client::sink::Event;
use serde_json::Value;
use std::sync::Arc;


/// Symbol looked up to check upstream reachability.
pub const HEALTH_CHECK_SYMBOL: &str = "AAPL";

/// Computes the `[from, to]` window for a price history request.
#[must_use]
pub fn price_window(today: NaiveDate, days: u32) -> (NaiveDate, NaiveDate) {
    let from = today
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN);
    (from, today)
}

fn not_found_detail(operation: Operation, symbol: &str) -> String {
    match operation {
        Operation::CompanyProfile => format!("Company {} not found", symbol),
        other => format!("{} for {} not found", other.label(), symbol),
    }
}

fn requested(state: &AppState, operation: Operation, ticker: &str) {
    state.sink.emit(
        Event::info(
            "handler.request",
            format!("{} requested for ticker: {}", operation.label(), ticker),
        )
        .field("operation", operation.as_str())
        .field("ticker", ticker),
    );
}

fn succeeded(state: &AppState, operation: Operation, symbol: &str, records: usize) {
    state.sink.emit(
        Event::info(
            "handler.success",
            format!(
                "Successfully returned {} {} record(s) for {}",
                records,
                operation.as_str(),
                symbol
            ),
        )
        .field("operation", operation.as_str())
        .field("symbol", symbol)
        .field("records", records),
    );
}

fn shape_failure(state: &AppState, operation: Operation, symbol: &str, err: ShapeError) -> ApiError {
    state.sink.emit(
        Event::error(
            "handler.error",
            format!("Unexpected payload in {} for {}: {}", operation, symbol, err),
        )
        .field("operation", operation.as_str())
        .field("symbol", symbol),
    );
    ApiError::Internal(format!(
        "Error fetching {}: {}",
        operation.label().to_lowercase(),
        err
    ))
}

/// Issues the request and rejects empty payloads with NotFound.
async fn fetch(
    state: &AppState,
    operation: Operation,
    symbol: &str,
    request: UpstreamRequest,
) -> Result<Value, ApiError> {
    let payload = state.client.call(&request).await?;

    if normalize::is_empty(&payload) {
        state.sink.emit(
            Event::warn(
                "handler.not_found",
                format!("No {} data found for ticker: {}", operation, symbol),
            )
            .field("operation", operation.as_str())
            .field("symbol", symbol),
        );
        return Err(ApiError::NotFound(not_found_detail(operation, symbol)));
    }

    Ok(payload)
}

/// Returns the first record of a singular resource unchanged.
async fn fetch_single(
    state: &AppState,
    operation: Operation,
    ticker: &str,
    request: impl FnOnce(&str) -> UpstreamRequest,
) -> Result<Json<Value>, ApiError> {
    requested(state, operation, ticker);
    let symbol = ticker.to_uppercase();

    let payload = fetch(state, operation, &symbol, request(&symbol)).await?;
    let record = normalize::first_record(&payload)
        .map_err(|err| shape_failure(state, operation, &symbol, err))?;

    succeeded(state, operation, &symbol, 1);
    Ok(Json(Value::Object(record.clone())))
}

/// Returns an array resource unchanged.
async fn fetch_list(
    state: &AppState,
    operation: Operation,
    ticker: &str,
    request: impl FnOnce(&str) -> UpstreamRequest,
) -> Result<Json<Value>, ApiError> {
    requested(state, operation, ticker);
    let symbol = ticker.to_uppercase();

    let payload = fetch(state, operation, &symbol, request(&symbol)).await?;

    let records = payload.as_array().map_or(1, Vec::len);
    succeeded(state, operation, &symbol, records);
    Ok(Json(payload))
}

// ============================================================================
// Status
// ============================================================================

/// Liveness endpoint.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is running", body = RootResponse)
    ),
    tag = "Status"
)]
pub async fn root(State(state): State<Arc<AppState>>) -> Json<RootResponse> {
    Json(RootResponse {
        message: "Enhanced Stock Analytics API is running".to_string(),
        timestamp: timestamp(),
        version: state.version.clone(),
        status: "healthy".to_string(),
        api_provider: API_PROVIDER.to_string(),
    })
}

/// Health check including an upstream lookup.
///
/// A failing lookup is reported in `fmp_status`/`fmp_error`; the endpoint
/// itself always answers 200.
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service and upstream status", body = HealthResponse)
    ),
    tag = "Status"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let lookup = state
        .client
        .call(&UpstreamRequest::profile(HEALTH_CHECK_SYMBOL))
        .await;

    let (fmp_status, fmp_error) = match lookup {
        Ok(payload) if !normalize::is_empty(&payload) => (UpstreamStatus::Healthy, None),
        Ok(_) => (UpstreamStatus::Unhealthy, None),
        Err(err) => (UpstreamStatus::Unhealthy, Some(err.to_string())),
    };

    let event = match (&fmp_status, &fmp_error) {
        (UpstreamStatus::Healthy, _) => Event::info("health.check", "FMP API health check: HEALTHY"),
        (UpstreamStatus::Unhealthy, None) => {
            Event::warn("health.check", "FMP API health check: UNHEALTHY")
        }
        (UpstreamStatus::Unhealthy, Some(err)) => Event::error(
            "health.check",
            format!("FMP API health check: FAILED - {}", err),
        ),
    };
    state
        .sink
        .emit(event.field("operation", Operation::Health.as_str()));

    Json(HealthResponse {
        api_status: "healthy".to_string(),
        timestamp: timestamp(),
        version: state.version.clone(),
        api_provider: API_PROVIDER.to_string(),
        fmp_status,
        fmp_error,
    })
}

// ============================================================================
// Market Data
// ============================================================================

/// Most active stocks, falling back to a static list.
#[utoipa::path(
    get,
    path = "/api/popular-stocks",
    responses(
        (status = 200, description = "Six popular stocks", body = [PopularStock])
    ),
    tag = "Market Data"
)]
pub async fn get_popular_stocks(State(state): State<Arc<AppState>>) -> Json<Vec<PopularStock>> {
    let operation = Operation::PopularStocks;

    let (stocks, reason) = match state.client.call(&UpstreamRequest::most_actives()).await {
        Ok(payload) => (
            normalize::popular_stocks(&payload, POPULAR_STOCKS_LIMIT),
            "empty upstream result".to_string(),
        ),
        Err(err) => (Vec::new(), err.to_string()),
    };

    if stocks.is_empty() {
        state.sink.emit(
            Event::warn("handler.fallback", "Using fallback popular stocks data")
                .field("operation", operation.as_str())
                .field("reason", reason),
        );
        return Json(fallback::popular_stocks());
    }

    let upstream_count = stocks.len();
    let stocks = fallback::fill_popular_stocks(stocks, POPULAR_STOCKS_LIMIT);
    if stocks.len() > upstream_count {
        state.sink.emit(
            Event::info("handler.fallback", "Topped up popular stocks from fallback data")
                .field("operation", operation.as_str())
                .field("upstream_records", upstream_count),
        );
    }

    state.sink.emit(
        Event::info(
            "handler.success",
            format!("Successfully returned {} popular stocks", stocks.len()),
        )
        .field("operation", operation.as_str())
        .field("records", stocks.len()),
    );
    Json(stocks)
}

/// Company profile.
#[utoipa::path(
    get,
    path = "/api/company/{ticker}",
    params(
        ("ticker" = String, Path, description = "Ticker symbol (case-insensitive)")
    ),
    responses(
        (status = 200, description = "Company profile", body = CompanyProfile),
        (status = 403, description = "Upstream rejected the API key", body = crate::error::ErrorResponse),
        (status = 404, description = "Company not found", body = crate::error::ErrorResponse),
        (status = 500, description = "Upstream error", body = crate::error::ErrorResponse),
        (status = 504, description = "Upstream timed out", body = crate::error::ErrorResponse)
    ),
    tag = "Market Data"
)]
pub async fn get_company_profile(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> Result<Json<CompanyProfile>, ApiError> {
    let operation = Operation::CompanyProfile;
    requested(&state, operation, &ticker);
    let symbol = ticker.to_uppercase();

    let payload = fetch(&state, operation, &symbol, UpstreamRequest::profile(&symbol)).await?;
    let profile = normalize::company_profile(&payload, &symbol)
        .map_err(|err| shape_failure(&state, operation, &symbol, err))?;

    state.sink.emit(
        Event::info(
            "handler.success",
            format!(
                "Successfully returned company profile for {}: {}",
                symbol, profile.company_name
            ),
        )
        .field("operation", operation.as_str())
        .field("symbol", symbol.as_str()),
    );
    Ok(Json(profile))
}

/// Daily closing prices, oldest first.
#[utoipa::path(
    get,
    path = "/api/stock-prices/{ticker}",
    params(
        ("ticker" = String, Path, description = "Ticker symbol (case-insensitive)"),
        ("days" = Option<u32>, Query, description = "Days of history (default 30)")
    ),
    responses(
        (status = 200, description = "Price history", body = [StockPricePoint]),
        (status = 400, description = "Invalid query parameters", body = crate::error::ErrorResponse),
        (status = 404, description = "No price data", body = crate::error::ErrorResponse),
        (status = 500, description = "Upstream error", body = crate::error::ErrorResponse)
    ),
    tag = "Market Data"
)]
pub async fn get_stock_prices(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    query: Result<Query<StockPricesQuery>, QueryRejection>,
) -> Result<Json<Vec<StockPricePoint>>, ApiError> {
    let Query(query) = query?;
    let operation = Operation::StockPrices;
    requested(&state, operation, &ticker);
    let symbol = ticker.to_uppercase();

    let (from, to) = price_window(Local::now().date_naive(), query.days);
    let request = UpstreamRequest::historical_price_light(
        &symbol,
        from.format("%Y-%m-%d"),
        to.format("%Y-%m-%d"),
    );

    let payload = fetch(&state, operation, &symbol, request).await?;
    let points = normalize::stock_prices(&payload)
        .map_err(|err| shape_failure(&state, operation, &symbol, err))?;

    succeeded(&state, operation, &symbol, points.len());
    Ok(Json(points))
}

// ============================================================================
// Fundamentals
// ============================================================================

/// Trailing twelve months key metrics, as returned upstream.
#[utoipa::path(
    get,
    path = "/api/key-metrics/{ticker}",
    params(
        ("ticker" = String, Path, description = "Ticker symbol (case-insensitive)")
    ),
    responses(
        (status = 200, description = "Key metrics object"),
        (status = 404, description = "No metrics", body = crate::error::ErrorResponse),
        (status = 500, description = "Upstream error", body = crate::error::ErrorResponse)
    ),
    tag = "Fundamentals"
)]
pub async fn get_key_metrics(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> Result<Json<Value>, ApiError> {
    fetch_single(&state, Operation::KeyMetrics, &ticker, UpstreamRequest::key_metrics_ttm).await
}

/// Financial health scores, as returned upstream.
#[utoipa::path(
    get,
    path = "/api/financial-scores/{ticker}",
    params(
        ("ticker" = String, Path, description = "Ticker symbol (case-insensitive)")
    ),
    responses(
        (status = 200, description = "Financial scores object"),
        (status = 404, description = "No scores", body = crate::error::ErrorResponse),
        (status = 500, description = "Upstream error", body = crate::error::ErrorResponse)
    ),
    tag = "Fundamentals"
)]
pub async fn get_financial_scores(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> Result<Json<Value>, ApiError> {
    fetch_single(
        &state,
        Operation::FinancialScores,
        &ticker,
        UpstreamRequest::financial_scores,
    )
    .await
}

/// Statement growth rates, as returned upstream.
#[utoipa::path(
    get,
    path = "/api/financial-growth/{ticker}",
    params(
        ("ticker" = String, Path, description = "Ticker symbol (case-insensitive)"),
        ("period" = Option<String>, Query, description = "Reporting period (default FY)"),
        ("limit" = Option<u32>, Query, description = "Maximum records (default 5)")
    ),
    responses(
        (status = 200, description = "Growth records"),
        (status = 400, description = "Invalid query parameters", body = crate::error::ErrorResponse),
        (status = 404, description = "No growth data", body = crate::error::ErrorResponse),
        (status = 500, description = "Upstream error", body = crate::error::ErrorResponse)
    ),
    tag = "Fundamentals"
)]
pub async fn get_financial_growth(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    query: Result<Query<FinancialGrowthQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query?;
    fetch_list(&state, Operation::FinancialGrowth, &ticker, |symbol| {
        UpstreamRequest::financial_growth(symbol, &query.period, query.limit)
    })
    .await
}

/// Analyst estimates, as returned upstream.
#[utoipa::path(
    get,
    path = "/api/analyst-estimates/{ticker}",
    params(
        ("ticker" = String, Path, description = "Ticker symbol (case-insensitive)"),
        ("period" = Option<String>, Query, description = "annual or quarter (default annual)"),
        ("limit" = Option<u32>, Query, description = "Maximum records (default 5)")
    ),
    responses(
        (status = 200, description = "Estimate records"),
        (status = 400, description = "Invalid query parameters", body = crate::error::ErrorResponse),
        (status = 404, description = "No estimates", body = crate::error::ErrorResponse),
        (status = 500, description = "Upstream error", body = crate::error::ErrorResponse)
    ),
    tag = "Fundamentals"
)]
pub async fn get_analyst_estimates(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    query: Result<Query<AnalystEstimatesQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query?;
    fetch_list(&state, Operation::AnalystEstimates, &ticker, |symbol| {
        UpstreamRequest::analyst_estimates(symbol, &query.period, query.limit, 0)
    })
    .await
}

/// Fallback for unknown routes.
pub async fn route_not_found() -> ApiError {
    ApiError::NotFound("Not Found".to_string())
}
