use super::util::with_backoff;
use crate::core::fetch::{FetchError, QuoteSource, RateFetch, RetryPolicy};
use crate::core::rate::ExchangeRate;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::sync::RwLock;
use tracing::{error, instrument};

/// Fetches rates from a quote source, retrying failed attempts under a
/// `RetryPolicy`. Never touches the cache.
pub struct RetryingFetcher {
    source: Arc<dyn QuoteSource>,
    policy: RwLock<RetryPolicy>,
}

impl RetryingFetcher {
    pub fn new(source: Arc<dyn QuoteSource>, policy: RetryPolicy) -> Self {
        Self {
            source,
            policy: RwLock::new(policy),
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        *self.policy.read().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl RateFetch for RetryingFetcher {
    #[instrument(name = "RateFetch", skip(self))]
    async fn fetch(&self, from: &str, to: &str) -> Result<ExchangeRate, FetchError> {
        let policy = self.policy();
        let rate = with_backoff(|| self.source.quote(from, to), &policy)
            .await
            .map_err(|last| {
                error!(error = %last, "All retry attempts failed");
                FetchError::Exhausted {
                    from: from.to_string(),
                    to: to.to_string(),
                    attempts: policy.attempts(),
                    last: Box::new(last),
                }
            })?;

        Ok(ExchangeRate::new(from, to, rate, Utc::now()))
    }

    fn configure(&self, policy: RetryPolicy) {
        *self.policy.write().unwrap_or_else(|e| e.into_inner()) = policy;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tokio::time::Instant;

    /// Fails the first `failures` calls, then returns `rate`.
    struct FlakySource {
        failures: u32,
        rate: f64,
        calls: AtomicU32,
    }

    impl FlakySource {
        fn new(failures: u32, rate: f64) -> Self {
            Self {
                failures,
                rate,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl QuoteSource for FlakySource {
        async fn quote(&self, from: &str, _to: &str) -> Result<f64, FetchError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(FetchError::Status {
                    status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                    from: from.to_string(),
                })
            } else {
                Ok(self.rate)
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_builds_rate_record() {
        let source = Arc::new(FlakySource::new(0, 35.12));
        let fetcher = RetryingFetcher::new(source.clone(), RetryPolicy::default());

        let before = Utc::now();
        let rate = fetcher.fetch("USD", "THB").await.unwrap();

        assert_eq!(rate.from, "USD");
        assert_eq!(rate.to, "THB");
        assert_eq!(rate.rate, 35.12);
        assert!(rate.timestamp >= before);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_retries_until_success() {
        let source = Arc::new(FlakySource::new(2, 0.92));
        let fetcher = RetryingFetcher::new(source.clone(), RetryPolicy::default());
        let start = Instant::now();

        let rate = fetcher.fetch("USD", "EUR").await.unwrap();

        assert_eq!(rate.rate, 0.92);
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        // 1s + 2s + 1s + 4s + 1s
        assert_eq!(start.elapsed(), Duration::from_secs(9));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_exhausted() {
        let source = Arc::new(FlakySource::new(u32::MAX, 1.0));
        let fetcher = RetryingFetcher::new(source.clone(), RetryPolicy::default());

        let err = fetcher.fetch("USD", "EUR").await.unwrap_err();

        assert!(matches!(err, FetchError::Exhausted { attempts: 3, .. }));
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_configure_changes_budget() {
        let source = Arc::new(FlakySource::new(u32::MAX, 1.0));
        let fetcher = RetryingFetcher::new(source.clone(), RetryPolicy::default());
        fetcher.configure(RetryPolicy {
            max_attempts: 5,
            ..RetryPolicy::default()
        });

        assert!(fetcher.fetch("USD", "EUR").await.is_err());
        assert_eq!(source.calls.load(Ordering::SeqCst), 5);
    }
}
