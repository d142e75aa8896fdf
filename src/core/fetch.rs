//! Rate fetching abstractions

use crate::core::rate::ExchangeRate;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Failures on the fetch path. Everything but `Exhausted` describes a single
/// attempt and is retried.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP error: {status} for currency: {from}")]
    Status {
        status: reqwest::StatusCode,
        from: String,
    },

    #[error("Failed to parse JSON response for {from}: {reason}")]
    Body { from: String, reason: String },

    #[error("No rate for {to} in response for {from}")]
    MissingRate { from: String, to: String },

    #[error("Invalid rate {rate} for {from} -> {to}")]
    InvalidRate { from: String, to: String, rate: f64 },

    #[error("Could not fetch rate for {from} -> {to} after {attempts} attempts: {last}")]
    Exhausted {
        from: String,
        to: String,
        attempts: u32,
        last: Box<FetchError>,
    },
}

/// A single remote quote lookup, no retries.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn quote(&self, from: &str, to: &str) -> Result<f64, FetchError>;
}

/// Produces a fresh rate for a pair.
#[async_trait]
pub trait RateFetch: Send + Sync {
    async fn fetch(&self, from: &str, to: &str) -> Result<ExchangeRate, FetchError>;

    /// Replaces the retry policy for later fetches. Fetchers without one ignore it.
    fn configure(&self, _policy: RetryPolicy) {}
}

/// Attempt budget and pauses for the fetch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Pause observed before every attempt.
    pub rate_limit_delay: Duration,
    /// Backoff after failed attempt `n` is `2^n` of these.
    pub backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            rate_limit_delay: Duration::from_millis(1000),
            backoff_unit: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Attempts actually made; a zero budget still makes one attempt.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Backoff taken after failed attempt `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_unit.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Total time spent waiting when every attempt fails.
    pub fn exhaustion_wait(&self) -> Duration {
        let pauses = self.rate_limit_delay.saturating_mul(self.attempts());
        (1..self.attempts()).fold(pauses, |acc, attempt| acc + self.backoff(attempt))
    }
}
