//! Application state management.

use crate::config::Config;
use crate::telemetry::TracingSink;
use fmp_client::sink::ObservabilitySink;
use fmp_client::{ClientError, FmpClient};
use std::sync::Arc;

/// Application state shared across all handlers.
///
/// Everything in here is read-only after construction; the sink accepts
/// concurrent writers.
#[derive(Clone)]
pub struct AppState {
    /// Upstream client.
    pub client: FmpClient,
    /// Event sink shared with the client.
    pub sink: Arc<dyn ObservabilitySink>,
    /// Service version reported by the status endpoints.
    pub version: String,
}

impl AppState {
    /// Creates a new application state around an existing client.
    #[must_use]
    pub fn new(client: FmpClient, sink: Arc<dyn ObservabilitySink>) -> Self {
        Self {
            client,
            sink,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Creates a new application state from configuration, logging through
    /// a [`TracingSink`] in the configured format.
    ///
    /// # Errors
    /// Returns error if the upstream client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let sink: Arc<dyn ObservabilitySink> = Arc::new(TracingSink::new(config.logging.format));
        Self::with_sink(config, sink)
    }

    /// Creates a new application state from configuration with a custom sink.
    ///
    /// # Errors
    /// Returns error if the upstream client cannot be built.
    pub fn with_sink(config: &Config, sink: Arc<dyn ObservabilitySink>) -> Result<Self, ClientError> {
        let client = FmpClient::new(config.upstream.client_config(), Arc::clone(&sink))?;
        Ok(Self::new(client, sink))
    }
}
