//! Upstream request values.

use std::fmt::Display;


/// A GET request against one FMP endpoint.
///
/// The API key is not part of the request; [`crate::FmpClient`] appends it
/// when the request is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    endpoint: String,
    params: Vec<(String, String)>,
}

impl UpstreamRequest {
    /// Creates a request for an endpoint path relative to the base URL.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_start_matches('/').to_string(),
            params: Vec::new(),
        }
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    /// Endpoint path, e.g. `historical-price-eod/light`.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Query parameters in insertion order.
    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Looks up a query parameter by name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    // ========================================================================
    // Endpoints
    // ========================================================================

    /// Most actively traded stocks.
    #[must_use]
    pub fn most_actives() -> Self {
        Self::new("most-actives")
    }

    /// Company profile.
    #[must_use]
    pub fn profile(symbol: &str) -> Self {
        Self::new("profile").param("symbol", symbol)
    }

    /// End-of-day prices (single price per date) between two `YYYY-MM-DD` dates.
    #[must_use]
    pub fn historical_price_light(symbol: &str, from: impl Display, to: impl Display) -> Self {
        Self::new("historical-price-eod/light")
            .param("symbol", symbol)
            .param("from", from)
            .param("to", to)
    }

    /// Trailing twelve months key metrics.
    #[must_use]
    pub fn key_metrics_ttm(symbol: &str) -> Self {
        Self::new("key-metrics-ttm").param("symbol", symbol)
    }

    /// Altman Z / Piotroski scores.
    #[must_use]
    pub fn financial_scores(symbol: &str) -> Self {
        Self::new("financial-scores").param("symbol", symbol)
    }

    /// Financial statement growth rates.
    #[must_use]
    pub fn financial_growth(symbol: &str, period: &str, limit: u32) -> Self {
        Self::new("financial-growth")
            .param("symbol", symbol)
            .param("period", period)
            .param("limit", limit)
    }

    /// Analyst revenue/EPS estimates.
    #[must_use]
    pub fn analyst_estimates(symbol: &str, period: &str, limit: u32, page: u32) -> Self {
        Self::new("analyst-estimates")
            .param("symbol", symbol)
            .param("period", period)
            .param("limit", limit)
            .param("page", page)
    }
}
