//! Persistent rate cache on top of a pluggable key-value store

use crate::core::rate::ExchangeRate;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::debug;

/// String key-value storage capability backing the rate cache.
///
/// Every call is a single read or write; implementations must make each one
/// atomic with respect to other callers.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: String) -> Result<()>;
    async fn has(&self, key: &str) -> Result<bool>;
    /// Returns all entries whose key starts with `prefix`, in key order.
    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, String)>>;
}

#[derive(Clone)]
pub struct RateCache {
    store: Arc<dyn KeyValueStore>,
}

impl RateCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Reads the record for `from -> to`. Read failures, corrupt records and
    /// records that fail [`RateCache::is_usable`] are reported as a miss.
    pub async fn get(&self, from: &str, to: &str) -> Option<ExchangeRate> {
        let key = ExchangeRate::storage_key(from, to);
        let raw = match self.store.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("Cache MISS for key: {}", key);
                return None;
            }
            Err(e) => {
                debug!("Cache read error for key {}: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str::<ExchangeRate>(&raw) {
            Ok(rate) if rate.from != from || rate.to != to => {
                debug!(
                    "Ignoring cache record for {} -> {} stored under key {}",
                    rate.from, rate.to, key
                );
                None
            }
            Ok(rate) if !Self::is_usable(&rate) => {
                debug!("Ignoring cache record with invalid rate {} for key {}", rate.rate, key);
                None
            }
            Ok(rate) => {
                debug!("Cache HIT for key: {}", key);
                Some(rate)
            }
            Err(e) => {
                debug!("Ignoring corrupt cache record for key {}: {}", key, e);
                None
            }
        }
    }

    /// Writes the record under its pair key, replacing any previous value.
    pub async fn put(&self, rate: &ExchangeRate) {
        let key = ExchangeRate::storage_key(&rate.from, &rate.to);
        let res: Result<()> = async {
            let value = serde_json::to_string(rate)?;
            self.store.set(&key, value).await
        }
        .await;

        match res {
            Ok(()) => debug!("Cache PUT for key: {}", key),
            Err(e) => debug!("Cache write error for key {}: {}", key, e),
        }
    }

    /// A stored rate can be served only if it is finite and positive.
    pub fn is_usable(rate: &ExchangeRate) -> bool {
        rate.rate.is_finite() && rate.rate > 0.0
    }

    pub fn is_valid(rate: &ExchangeRate, freshness_window: Duration) -> bool {
        Self::is_valid_at(rate, freshness_window, Utc::now())
    }

    pub fn is_valid_at(rate: &ExchangeRate, freshness_window: Duration, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(rate.timestamp) < freshness_window
    }

    /// All decodable cached records with a usable rate, newest first.
    pub async fn list(&self) -> Vec<ExchangeRate> {
        let entries = match self.store.scan_prefix(ExchangeRate::KEY_PREFIX).await {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Cache scan error: {}", e);
                return Vec::new();
            }
        };

        let mut rates: Vec<ExchangeRate> = entries
            .into_iter()
            .filter_map(|(key, raw)| match serde_json::from_str::<ExchangeRate>(&raw) {
                Ok(rate) if Self::is_usable(&rate) => Some(rate),
                Ok(rate) => {
                    debug!("Skipping cache record {} with invalid rate {}", key, rate.rate);
                    None
                }
                Err(e) => {
                    debug!("Skipping corrupt cache record {}: {}", key, e);
                    None
                }
            })
            .collect();
        rates.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        rates
    }
}
