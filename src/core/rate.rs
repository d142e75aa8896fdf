//! Exchange rate value type

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A rate for one ordered currency pair, as retrieved at `timestamp`.
///
/// The pair is directional: `USD -> EUR` and `EUR -> USD` are separate
/// records even though one is the inverse of the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub from: String,
    pub to: String,
    pub rate: f64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl ExchangeRate {
    pub fn new(from: &str, to: &str, rate: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            rate,
            timestamp,
        }
    }

    /// Storage key for a pair, `exchange_{from}_{to}`.
    pub fn storage_key(from: &str, to: &str) -> String {
        format!("{}{from}_{to}", Self::KEY_PREFIX)
    }

    pub const KEY_PREFIX: &'static str = "exchange_";
}

impl Display for ExchangeRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}: {}", self.from, self.to, self.rate)
    }
}

/// Normalises a user supplied currency code.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}
