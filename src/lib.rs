//! # Stock Analytics Backend - REST API Server
//!
//! A REST API backend that proxies the
//! [Financial Modeling Prep](https://site.financialmodelingprep.com/) stable API
//! and reshapes its payloads for a stock analytics frontend.
//! Built with [Axum](https://crates.io/crates/axum) for async HTTP handling and
//! provides OpenAPI/Swagger documentation via [utoipa](https://crates.io/crates/utoipa).
//!
//! ## Key Features
//!
//! - **Upstream Proxy**: Every endpoint maps to exactly one upstream call made
//!   through the [`fmp_client`] crate, with timeouts and failure classification.
//!
//! - **Normalization**: Upstream records are coerced into fixed response shapes
//!   with documented defaults for missing fields.
//!
//! - **Fallback Data**: Popular stocks are served from a static list when the
//!   upstream returns nothing or fails.
//!
//! - **Uniform Errors**: All failures are rendered as
//!   `{detail, timestamp, path}` with the matching status code.
//!
//! - **Structured Logging**: Plain text or JSON output selected once at startup.
//!
//! ## Architecture
//!
//! ```text
//! request ─► log_requests ─► error_envelope ─► catch_panic ─► handler
//!                                                              │
//!                         FmpClient::call(UpstreamRequest) ◄───┘
//!                                                              │
//!              normalize / fallback / ApiError ◄───────────────┘
//! ```
//!
//! ## Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | Route handlers, middleware and router configuration |
//! | [`config`] | TOML and environment configuration |
//! | [`error`] | API error types and the error envelope |
//! | [`fallback`] | Static popular stocks data |
//! | [`models`] | Response DTOs with OpenAPI schemas |
//! | [`normalize`] | Payload shape normalization |
//! | [`state`] | Application state management |
//! | [`telemetry`] | Tracing subscriber and sink |
//!
//! ## API Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/` | Liveness |
//! | GET | `/api/health` | Health with upstream reachability check |
//! | GET | `/api/popular-stocks` | Six most active stocks |
//! | GET | `/api/company/{ticker}` | Company profile |
//! | GET | `/api/stock-prices/{ticker}?days=30` | Daily closing prices |
//! | GET | `/api/key-metrics/{ticker}` | TTM key metrics |
//! | GET | `/api/financial-scores/{ticker}` | Altman Z / Piotroski scores |
//! | GET | `/api/financial-growth/{ticker}?period=FY&limit=5` | Growth rates |
//! | GET | `/api/analyst-estimates/{ticker}?period=annual&limit=5` | Estimates |
//!
//! ## Example Usage
//!
//! ```bash
//! # Development mode with the demo key
//! cargo run
//!
//! # With a real key and JSON logs
//! FMP_API_KEY=... LOG_FORMAT=json PORT=8000 cargo run
//!
//! # From a config file
//! CONFIG_PATH=config.toml cargo run
//! ```
//!
//! ```bash
//! curl http://localhost:8000/api/company/aapl
//! curl "http://localhost:8000/api/stock-prices/AAPL?days=7"
//! ```
//!
//! ## Swagger UI
//!
//! ```text
//! http://localhost:8000/swagger-ui/
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod fallback;
pub mod models;
pub mod normalize;
pub mod state;
pub mod telemetry;
