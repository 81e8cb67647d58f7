//! Request and response models for the REST API.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Name of the upstream data provider reported by the status endpoints.
pub const API_PROVIDER: &str = "Financial Modeling Prep";

/// Current time as an RFC 3339 string with millisecond precision.
#[must_use]
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Operations exposed by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Upstream reachability check.
    Health,
    /// Most active stocks.
    PopularStocks,
    /// Company profile.
    CompanyProfile,
    /// Historical daily prices.
    StockPrices,
    /// TTM key metrics.
    KeyMetrics,
    /// Altman Z / Piotroski scores.
    FinancialScores,
    /// Statement growth rates.
    FinancialGrowth,
    /// Analyst estimates.
    AnalystEstimates,
}

impl Operation {
    /// Stable snake_case name used in log events.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::PopularStocks => "popular_stocks",
            Self::CompanyProfile => "company_profile",
            Self::StockPrices => "stock_prices",
            Self::KeyMetrics => "key_metrics",
            Self::FinancialScores => "financial_scores",
            Self::FinancialGrowth => "financial_growth",
            Self::AnalystEstimates => "analyst_estimates",
        }
    }

    /// Human readable resource label used in not-found messages.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Health => "Health check",
            Self::PopularStocks => "Popular stocks",
            Self::CompanyProfile => "Company",
            Self::StockPrices => "Stock price data",
            Self::KeyMetrics => "Key metrics",
            Self::FinancialScores => "Financial scores",
            Self::FinancialGrowth => "Financial growth data",
            Self::AnalystEstimates => "Analyst estimates",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Status
// ============================================================================

/// Liveness response for `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RootResponse {
    /// Greeting.
    pub message: String,
    /// Response time.
    pub timestamp: String,
    /// Service version.
    pub version: String,
    /// Always `healthy`.
    pub status: String,
    /// Upstream provider name.
    pub api_provider: String,
}

/// Upstream reachability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UpstreamStatus {
    /// Reachability lookup returned data.
    Healthy,
    /// Reachability lookup failed or returned nothing.
    Unhealthy,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Status of this service; always `healthy` when it answers.
    pub api_status: String,
    /// Response time.
    pub timestamp: String,
    /// Service version.
    pub version: String,
    /// Upstream provider name.
    pub api_provider: String,
    /// Result of the upstream reachability check.
    pub fmp_status: UpstreamStatus,
    /// Reachability failure message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fmp_error: Option<String>,
}

// ============================================================================
// Market Data
// ============================================================================

/// Entry in the popular stocks list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PopularStock {
    /// Ticker symbol.
    pub symbol: String,
    /// Company name.
    pub name: String,
    /// Last price.
    pub price: f64,
    /// Absolute change.
    pub change: f64,
    /// Percent change.
    pub changes_percentage: f64,
}

/// Company profile.
///
/// Missing upstream fields fall back to: `symbol` = requested ticker,
/// `currency` = "USD", `exchangeShortName` = "NASDAQ", `country` = "US",
/// `beta` = 1.0, every other number 0 and every other string "".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    /// Ticker symbol.
    pub symbol: String,
    /// Registered company name.
    pub company_name: String,
    /// Last price.
    pub price: f64,
    /// Absolute daily change.
    pub changes: f64,
    /// Daily change in percent.
    pub changes_percentage: f64,
    /// Trading currency.
    pub currency: String,
    /// Exchange code, e.g. `NASDAQ`.
    pub exchange_short_name: String,
    pub industry: String,
    pub sector: String,
    /// ISO country code.
    pub country: String,
    /// Market capitalization.
    pub market_cap: i64,
    /// Volatility relative to the market.
    pub beta: f64,
    /// Average daily volume.
    pub vol_avg: i64,
    /// Same value as `market_cap`, kept for older clients.
    pub mkt_cap: i64,
    /// Last dividend per share.
    pub last_div: f64,
    /// 52 week range, `low-high`.
    pub range: String,
    /// Full exchange name.
    pub exchange: String,
    /// Business description.
    pub description: String,
    /// Chief executive officer.
    pub ceo: String,
    /// Company website URL.
    pub website: String,
    /// Logo URL.
    pub image: String,
    /// Full-time employee count as reported upstream.
    pub employees: String,
    /// Headquarters contact details.
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    /// IPO date, `YYYY-MM-DD`.
    pub ipo_date: String,
}

/// One day of price history.
///
/// The light upstream series carries a single price per day, so `open`,
/// `high`, `low` and `close` are always equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StockPricePoint {
    /// `YYYY-MM-DD`.
    pub date: String,
    pub close: f64,
    pub volume: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
}

// ============================================================================
// Query Parameters
// ============================================================================

fn default_days() -> u32 {
    30
}

fn default_limit() -> u32 {
    5
}

fn default_growth_period() -> String {
    "FY".to_string()
}

fn default_estimates_period() -> String {
    "annual".to_string()
}

/// Query for `GET /api/stock-prices/{ticker}`.
#[derive(Debug, Clone, Deserialize)]
pub struct StockPricesQuery {
    /// Number of calendar days to look back.
    #[serde(default = "default_days")]
    pub days: u32,
}

impl Default for StockPricesQuery {
    fn default() -> Self {
        Self {
            days: default_days(),
        }
    }
}

/// Query for `GET /api/financial-growth/{ticker}`.
#[derive(Debug, Clone, Deserialize)]
pub struct FinancialGrowthQuery {
    /// Reporting period (`FY`, `Q1`..`Q4`).
    #[serde(default = "default_growth_period")]
    pub period: String,
    /// Maximum number of records.
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl Default for FinancialGrowthQuery {
    fn default() -> Self {
        Self {
            period: default_growth_period(),
            limit: default_limit(),
        }
    }
}

/// Query for `GET /api/analyst-estimates/{ticker}`.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalystEstimatesQuery {
    /// `annual` or `quarter`.
    #[serde(default = "default_estimates_period")]
    pub period: String,
    /// Maximum number of records.
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl Default for AnalystEstimatesQuery {
    fn default() -> Self {
        Self {
            period: default_estimates_period(),
            limit: default_limit(),
        }
    }
}
