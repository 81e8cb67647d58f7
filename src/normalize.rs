//! Normalization of raw FMP payloads into the API's response shapes.
//!
//! Every function here is pure: the same payload always yields the same
//! output. Upstream fields are never assumed present; each output field has
//! an explicit default.

use crate::models::{CompanyProfile, PopularStock, StockPricePoint};
use serde_json::{Map, Value};
use thiserror::Error;

/// Number of entries in the popular stocks list.
pub const POPULAR_STOCKS_LIMIT: usize = 6;

type Record = Map<String, Value>;

/// Payload did not have the structure a normalizer requires.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unexpected upstream payload: expected {expected}, found {found}")]
pub struct ShapeError {
    expected: &'static str,
    found: &'static str,
}

impl ShapeError {
    fn new(expected: &'static str, found: &Value) -> Self {
        Self {
            expected,
            found: kind_of(found),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Whether a successful payload carries no data: `null`, `[]`, `{}` or `""`.
#[must_use]
pub fn is_empty(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        Value::String(s) => s.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Returns the record of a singular resource: the first element of an
/// array, or the payload itself when it is an object.
///
/// # Errors
/// Returns [`ShapeError`] if that record is not a JSON object.
pub fn first_record(payload: &Value) -> Result<&Record, ShapeError> {
    let candidate = match payload {
        Value::Array(items) => items.first().unwrap_or(payload),
        other => other,
    };
    candidate
        .as_object()
        .ok_or_else(|| ShapeError::new("object", candidate))
}

fn records(payload: &Value) -> Result<Vec<&Record>, ShapeError> {
    match payload {
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_object().ok_or_else(|| ShapeError::new("object", item)))
            .collect(),
        Value::Object(record) => Ok(vec![record]),
        other => Err(ShapeError::new("array", other)),
    }
}

// ============================================================================
// Field Coercion
// ============================================================================

/// Reads a float from a number or a numeric string.
#[must_use]
pub fn float_field(record: &Record, key: &str, default: f64) -> f64 {
    match record.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(default),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
        _ => default,
    }
}

/// Reads an integer from an integer, a float (truncated) or a numeric string.
#[must_use]
pub fn int_field(record: &Record, key: &str, default: i64) -> i64 {
    match record.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(default),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.trunc() as i64))
                .unwrap_or(default)
        }
        _ => default,
    }
}

/// Reads a string; numbers and booleans are rendered.
#[must_use]
pub fn string_field(record: &Record, key: &str, default: &str) -> String {
    match record.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => default.to_string(),
    }
}

// ============================================================================
// Shapes
// ============================================================================

/// Maps the first `limit` entries of a `most-actives` payload.
///
/// Non-object entries are skipped.
#[must_use]
pub fn popular_stocks(payload: &Value, limit: usize) -> Vec<PopularStock> {
    let items: Vec<&Record> = match payload {
        Value::Array(items) => items.iter().filter_map(Value::as_object).collect(),
        Value::Object(record) if !record.is_empty() => vec![record],
        _ => Vec::new(),
    };

    items
        .into_iter()
        .take(limit)
        .map(|stock| PopularStock {
            symbol: string_field(stock, "symbol", ""),
            name: string_field(stock, "name", ""),
            price: float_field(stock, "price", 0.0),
            change: float_field(stock, "change", 0.0),
            changes_percentage: float_field(stock, "changesPercentage", 0.0),
        })
        .collect()
}

/// Builds a [`CompanyProfile`] from a `profile` payload.
///
/// # Errors
/// Returns [`ShapeError`] if the payload holds no object record.
pub fn company_profile(payload: &Value, ticker: &str) -> Result<CompanyProfile, ShapeError> {
    let company = first_record(payload)?;
    let market_cap = int_field(company, "marketCap", 0);

    Ok(CompanyProfile {
        symbol: string_field(company, "symbol", ticker),
        company_name: string_field(company, "companyName", ""),
        price: float_field(company, "price", 0.0),
        changes: float_field(company, "change", 0.0),
        changes_percentage: float_field(company, "changePercentage", 0.0),
        currency: string_field(company, "currency", "USD"),
        exchange_short_name: string_field(company, "exchange", "NASDAQ"),
        industry: string_field(company, "industry", ""),
        sector: string_field(company, "sector", ""),
        country: string_field(company, "country", "US"),
        market_cap,
        beta: float_field(company, "beta", 1.0),
        vol_avg: int_field(company, "averageVolume", 0),
        mkt_cap: market_cap,
        last_div: float_field(company, "lastDividend", 0.0),
        range: string_field(company, "range", ""),
        exchange: string_field(company, "exchangeFullName", ""),
        description: string_field(company, "description", ""),
        ceo: string_field(company, "ceo", ""),
        website: string_field(company, "website", ""),
        image: string_field(company, "image", ""),
        employees: string_field(company, "fullTimeEmployees", ""),
        phone: string_field(company, "phone", ""),
        address: string_field(company, "address", ""),
        city: string_field(company, "city", ""),
        state: string_field(company, "state", ""),
        zip: string_field(company, "zip", ""),
        ipo_date: string_field(company, "ipoDate", ""),
    })
}

/// Builds an ascending price series from a `historical-price-eod/light`
/// payload.
///
/// # Errors
/// Returns [`ShapeError`] if any entry is not an object.
pub fn stock_prices(payload: &Value) -> Result<Vec<StockPricePoint>, ShapeError> {
    let mut points: Vec<StockPricePoint> = records(payload)?
        .into_iter()
        .map(|item| {
            let price = float_field(item, "price", 0.0);
            StockPricePoint {
                date: string_field(item, "date", ""),
                close: price,
                volume: int_field(item, "volume", 0),
                open: price,
                high: price,
                low: price,
            }
        })
        .collect();

    // ISO dates order lexicographically
    points.sort_by(|a, b| a.date.cmp(&b.date));
    Ok(points)
}
