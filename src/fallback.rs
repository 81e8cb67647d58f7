//! Static fallback data.
//!
//! Only [`Operation::PopularStocks`] has an entry: when `most-actives`
//! returns nothing or fails, the API serves this list instead of an error.

use crate::models::{Operation, PopularStock};

/// Row of the static popular stocks table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackStock {
    /// Ticker symbol.
    pub symbol: &'static str,
    /// Company name.
    pub name: &'static str,
    /// Last price.
    pub price: f64,
    /// Absolute daily change.
    pub change: f64,
    /// Daily change in percent.
    pub changes_percentage: f64,
}

impl From<&FallbackStock> for PopularStock {
    fn from(stock: &FallbackStock) -> Self {
        PopularStock {
            symbol: stock.symbol.to_string(),
            name: stock.name.to_string(),
            price: stock.price,
            change: stock.change,
            changes_percentage: stock.changes_percentage,
        }
    }
}

static POPULAR_STOCKS: [FallbackStock; 6] = [
    FallbackStock {
        symbol: "AAPL",
        name: "Apple Inc.",
        price: 232.8,
        change: 4.79,
        changes_percentage: 2.10,
    },
    FallbackStock {
        symbol: "TSLA",
        name: "Tesla Inc.",
        price: 248.42,
        change: 12.67,
        changes_percentage: 5.38,
    },
    FallbackStock {
        symbol: "META",
        name: "Meta Platforms Inc.",
        price: 342.56,
        change: 8.23,
        changes_percentage: 2.46,
    },
    FallbackStock {
        symbol: "GOOGL",
        name: "Alphabet Inc.",
        price: 138.21,
        change: -1.45,
        changes_percentage: -1.04,
    },
    FallbackStock {
        symbol: "AMZN",
        name: "Amazon.com Inc.",
        price: 145.86,
        change: 2.34,
        changes_percentage: 1.63,
    },
    FallbackStock {
        symbol: "NVDA",
        name: "NVIDIA Corporation",
        price: 875.28,
        change: 15.67,
        changes_percentage: 1.82,
    },
];

/// Returns the static rows for an operation, if it defines any.
#[must_use]
pub fn lookup(operation: Operation) -> Option<&'static [FallbackStock]> {
    match operation {
        Operation::PopularStocks => Some(&POPULAR_STOCKS),
        _ => None,
    }
}

/// The full static popular stocks list.
#[must_use]
pub fn popular_stocks() -> Vec<PopularStock> {
    lookup(Operation::PopularStocks)
        .unwrap_or_default()
        .iter()
        .map(PopularStock::from)
        .collect()
}

/// Tops `stocks` up to `target` entries with fallback rows whose symbols are
/// not already present.
#[must_use]
pub fn fill_popular_stocks(mut stocks: Vec<PopularStock>, target: usize) -> Vec<PopularStock> {
    for row in lookup(Operation::PopularStocks).unwrap_or_default() {
        if stocks.len() >= target {
            break;
        }
        if !stocks.iter().any(|s| s.symbol == row.symbol) {
            stocks.push(PopularStock::from(row));
        }
    }
    stocks
}
