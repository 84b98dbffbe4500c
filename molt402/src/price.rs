//! Cached USD price quotes.
//!
//! Quotes are pushed in with [`PriceOracle::update_price`] and served for a
//! fixed freshness window. A quote older than the window is treated as if it
//! had never been recorded, for lookups and conversions alike.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::store::TtlStore;
use crate::timestamp::UnixMillis;

/// A USD quote for one asset symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceData {
    /// Upper-case asset symbol (e.g. `SOL`).
    pub symbol: String,
    /// Price of one unit in USD.
    #[serde(with = "rust_decimal::serde::float")]
    pub usd: Decimal,
    /// When the quote was recorded.
    pub timestamp: UnixMillis,
}

/// Serves recent price quotes.
#[derive(Debug)]
pub struct PriceOracle {
    quotes: TtlStore<String, PriceData>,
}

impl Default for PriceOracle {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIMEOUT)
    }
}

impl PriceOracle {
    /// Default freshness window (60 seconds).
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    /// Creates an oracle whose quotes stay fresh for `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            quotes: TtlStore::new(timeout, TtlStore::<String, PriceData>::DEFAULT_CAPACITY),
        }
    }

    /// Records a quote, replacing any previous one for the symbol.
    pub fn update_price(&self, symbol: &str, usd: Decimal) {
        let symbol = normalize(symbol);
        #[cfg(feature = "telemetry")]
        tracing::debug!(symbol = %symbol, usd = %usd, "price updated");
        self.quotes.insert(
            symbol.clone(),
            PriceData {
                symbol,
                usd,
                timestamp: UnixMillis::now(),
            },
        );
    }

    /// Returns the full quote if it is fresh.
    #[must_use]
    pub fn quote(&self, symbol: &str) -> Option<PriceData> {
        self.quotes.get(normalize(symbol).as_str())
    }

    /// Returns the USD price if the quote is fresh.
    #[must_use]
    pub fn get_price(&self, symbol: &str) -> Option<Decimal> {
        self.quote(symbol).map(|quote| quote.usd)
    }

    /// Converts `amount` units of `symbol` to USD using a fresh quote.
    #[must_use]
    pub fn convert_to_usd(&self, amount: Decimal, symbol: &str) -> Option<Decimal> {
        self.get_price(symbol)
            .and_then(|usd| amount.checked_mul(usd))
    }
}

fn normalize(symbol: &str) -> String {
    symbol.trim().to_ascii_uppercase()
}
