//! HTTP client library for the Financial Modeling Prep (FMP) stable API.
//!
//! This crate issues GET requests against the FMP REST API, injects the
//! configured API key, enforces a request timeout and classifies every
//! failure into an [`UpstreamError`]. Each call reports exactly one
//! structured [`sink::Event`] to the injected [`sink::ObservabilitySink`].
//!
//! # Example
//!
//! ```no_run
//! use fmp_client::{ClientConfig, FmpClient, UpstreamRequest};
//! use fmp_client::sink::NoopSink;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = FmpClient::new(
//!         ClientConfig {
//!             api_key: "demo".into(),
//!             ..Default::default()
//!         },
//!         Arc::new(NoopSink),
//!     )?;
//!
//!     let profile = client.call(&UpstreamRequest::profile("AAPL")).await?;
//!     println!("{profile}");
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod request;
pub mod sink;

pub use client::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, FmpClient, UpstreamOutcome};
pub use error::{ClientError, FailureKind, UpstreamError};
pub use request::UpstreamRequest;
