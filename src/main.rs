//! Stock Analytics Backend Server
//!
//! REST API server proxying the Financial Modeling Prep API.

use axum::http::{HeaderValue, Method, header};
use stock_analytics_backend::api::create_router;
use stock_analytics_backend::config::{Config, CorsConfig};
use stock_analytics_backend::state::AppState;
use stock_analytics_backend::telemetry::init_tracing;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use stock_analytics_backend::error::ErrorResponse;
use stock_analytics_backend::models::{
    CompanyProfile, HealthResponse, PopularStock, RootResponse, StockPricePoint, UpstreamStatus,
};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    paths(
        stock_analytics_backend::api::handlers::root,
        stock_analytics_backend::api::handlers::health_check,
        stock_analytics_backend::api::handlers::get_popular_stocks,
        stock_analytics_backend::api::handlers::get_company_profile,
        stock_analytics_backend::api::handlers::get_stock_prices,
        stock_analytics_backend::api::handlers::get_key_metrics,
        stock_analytics_backend::api::handlers::get_financial_scores,
        stock_analytics_backend::api::handlers::get_financial_growth,
        stock_analytics_backend::api::handlers::get_analyst_estimates,
    ),
    components(
        schemas(
            RootResponse,
            HealthResponse,
            UpstreamStatus,
            PopularStock,
            CompanyProfile,
            StockPricePoint,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Status", description = "Liveness and upstream health"),
        (name = "Market Data", description = "Quotes, profiles and price history"),
        (name = "Fundamentals", description = "Metrics, scores, growth and estimates"),
    ),
    info(
        title = "Enhanced Stock Analytics API",
        version = "2.0.0",
        description = "Stock analytics API backed by Financial Modeling Prep",
        license(name = "MIT")
    )
)]
struct ApiDoc;

/// Builds the CORS layer for the configured origins.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config.logging)?;

    let client_config = config.upstream.client_config();
    info!("Starting Enhanced Stock Analytics API with FMP integration");
    info!("FMP API Key: {}", client_config.masked_api_key());
    info!("FMP Base URL: {}", client_config.base_url);

    // Create application state
    let state = Arc::new(AppState::from_config(&config)?);

    let host = &config.server.host;
    let port = config.server.port;
    info!("Swagger UI available at http://{}:{}/swagger-ui/", host, port);

    // Build the router
    let app = create_router(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors_layer(&config.cors))
        .layer(TraceLayer::new_for_http());

    // Start the server
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
