//! Route configuration.

use crate::api::{handlers, middleware};
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;


/// Creates the API router.
///
/// Layers, innermost first: panic catcher, error envelope, request log.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Status
        .route("/", get(handlers::root))
        .route("/api/health", get(handlers::health_check))
        // Market data
        .route("/api/popular-stocks", get(handlers::get_popular_stocks))
        .route("/api/company/{ticker}", get(handlers::get_company_profile))
        .route("/api/stock-prices/{ticker}", get(handlers::get_stock_prices))
        // Fundamentals
        .route("/api/key-metrics/{ticker}", get(handlers::get_key_metrics))
        .route(
            "/api/financial-scores/{ticker}",
            get(handlers::get_financial_scores),
        )
        .route(
            "/api/financial-growth/{ticker}",
            get(handlers::get_financial_growth),
        )
        .route(
            "/api/analyst-estimates/{ticker}",
            get(handlers::get_analyst_estimates),
        )
        .fallback(handlers::route_not_found)
        .layer(CatchPanicLayer::custom(middleware::panic_response))
        .layer(axum::middleware::from_fn(middleware::error_envelope))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::log_requests,
        ))
        .with_state(state)
}
