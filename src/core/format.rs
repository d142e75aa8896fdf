//! Turns rates into display strings

use crate::core::config::{DisplayConfig, DisplayType, SymbolPosition};
use chrono::{DateTime, Local, Utc};
use std::collections::BTreeMap;

const DEFAULT_SYMBOLS: [(&str, &str); 7] = [
    ("USD", "$"),
    ("EUR", "€"),
    ("GBP", "£"),
    ("JPY", "¥"),
    ("THB", "฿"),
    ("AUD", "A$"),
    ("HKD", "HK$"),
];

pub struct DisplayFormatter {
    display_type: DisplayType,
    position: SymbolPosition,
    symbols: BTreeMap<String, String>,
}

impl DisplayFormatter {
    pub fn new(config: &DisplayConfig) -> Self {
        let mut symbols: BTreeMap<String, String> = DEFAULT_SYMBOLS
            .iter()
            .map(|(code, symbol)| (code.to_string(), symbol.to_string()))
            .collect();
        symbols.extend(config.symbols.clone());

        Self {
            display_type: config.display_type,
            position: config.position,
            symbols,
        }
    }

    /// Symbol for `currency`, or the code itself in code mode or when unknown.
    pub fn label<'a>(&'a self, currency: &'a str) -> &'a str {
        match self.display_type {
            DisplayType::Symbol => self
                .symbols
                .get(currency)
                .map_or(currency, String::as_str),
            DisplayType::Code => currency,
        }
    }

    pub fn format_amount(&self, amount: f64, currency: &str) -> String {
        let label = self.label(currency);
        match self.position {
            SymbolPosition::Left => format!("{label}{amount:.4}"),
            SymbolPosition::Right => format!("{amount:.4} {label}"),
        }
    }
}

impl Default for DisplayFormatter {
    fn default() -> Self {
        Self::new(&DisplayConfig::default())
    }
}

pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Coarse relative age, floored to whole minutes, hours or days.
pub fn format_age(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = now.signed_duration_since(timestamp).num_minutes();
    if minutes < 1 {
        return "Just now".to_string();
    }
    if minutes < 60 {
        return format!("{minutes} minutes ago");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours} hours ago");
    }
    format!("{} days ago", hours / 24)
}
