//! Cache-first rate lookup

use crate::core::cache::RateCache;
use crate::core::config::FetchOptions;
use crate::core::fetch::RateFetch;
use crate::core::rate::ExchangeRate;
use chrono::Duration;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Where a single lookup ended up. Logged with every lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupState {
    NoCache,
    CacheValid,
    CacheStaleOrMissing,
    Fetching,
    FetchSucceeded,
    FetchFailed,
}

/// Serves rates from the cache while they are fresh, otherwise fetches and
/// stores a new one. Each pair is looked up and stored independently.
pub struct RateProvider {
    cache: RateCache,
    fetcher: Arc<dyn RateFetch>,
    freshness_window: RwLock<Duration>,
}

impl RateProvider {
    pub fn new(cache: RateCache, fetcher: Arc<dyn RateFetch>, freshness_window: Duration) -> Self {
        Self {
            cache,
            fetcher,
            freshness_window: RwLock::new(freshness_window),
        }
    }

    pub fn cache(&self) -> &RateCache {
        &self.cache
    }

    pub fn freshness_window(&self) -> Duration {
        *self.freshness_window.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Applies new options to every later lookup.
    pub fn configure(&self, options: &FetchOptions) {
        *self.freshness_window.write().unwrap_or_else(|e| e.into_inner()) =
            options.freshness_window();
        self.fetcher.configure(options.retry_policy());
        debug!(?options, "Rate provider reconfigured");
    }

    /// Returns the rate for `from -> to`, or `None` when no fresh cached
    /// value exists and fetching failed.
    pub async fn get_rate(&self, from: &str, to: &str) -> Option<ExchangeRate> {
        match self.cache.get(from, to).await {
            Some(cached) if RateCache::is_valid(&cached, self.freshness_window()) => {
                debug!(state = ?LookupState::CacheValid, %from, %to, "Using cached rate");
                return Some(cached);
            }
            Some(_) => debug!(state = ?LookupState::CacheStaleOrMissing, %from, %to),
            None => debug!(state = ?LookupState::NoCache, %from, %to),
        }

        self.refresh(from, to).await
    }

    /// Fetches `from -> to` regardless of the cache and stores the result.
    pub async fn refresh(&self, from: &str, to: &str) -> Option<ExchangeRate> {
        debug!(state = ?LookupState::Fetching, %from, %to);
        match self.fetcher.fetch(from, to).await {
            Ok(rate) => {
                self.cache.put(&rate).await;
                debug!(state = ?LookupState::FetchSucceeded, %rate);
                Some(rate)
            }
            Err(e) => {
                debug!(state = ?LookupState::FetchFailed, error = %e, "Unable to fetch exchange rate");
                None
            }
        }
    }
}
