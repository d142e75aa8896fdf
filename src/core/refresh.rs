//! Periodic background refresh of a fixed set of pairs

use crate::core::config::CurrencyPair;
use crate::core::provider::RateProvider;
use crate::core::rate::ExchangeRate;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, error, info, warn};

/// Handle to a running refresh loop. The owner stops it with [`RefreshTask::stop`];
/// a round already in progress finishes first.
pub struct RefreshTask {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

const MIN_PERIOD: Duration = Duration::from_secs(1);
const MAX_PERIOD: Duration = Duration::from_secs(365 * 24 * 60 * 60);

impl RefreshTask {
    /// Refreshes every pair once per `period`, first after one full period.
    /// `on_refresh` sees each pair's outcome. `period` is clamped to between
    /// one second and 365 days.
    pub fn spawn<F>(
        provider: Arc<RateProvider>,
        pairs: Vec<CurrencyPair>,
        period: Duration,
        on_refresh: F,
    ) -> Self
    where
        F: Fn(&CurrencyPair, Option<&ExchangeRate>) + Send + Sync + 'static,
    {
        let clamped = period.clamp(MIN_PERIOD, MAX_PERIOD);
        if clamped != period {
            warn!(?period, ?clamped, "Refresh period out of range, clamping");
        }
        let period = clamped;
        let (shutdown, mut stopped) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let start = Instant::now()
                .checked_add(period)
                .unwrap_or_else(Instant::now);
            let mut ticker = interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        debug!(pairs = pairs.len(), "Refreshing rates");
                        for pair in &pairs {
                            let rate = provider.refresh(&pair.from, &pair.to).await;
                            on_refresh(pair, rate.as_ref());
                        }
                    }
                    _ = stopped.changed() => break,
                }
            }
            info!("Refresh task stopped");
        });

        Self { shutdown, handle }
    }

    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            if e.is_panic() {
                error!(error = %e, "Refresh task panicked");
            } else {
                debug!(error = %e, "Refresh task did not finish");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cache::RateCache;
    use crate::core::fetch::{FetchError, RateFetch};
    use crate::store::memory::MemoryStore;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingFetcher {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RateFetch for CountingFetcher {
        async fn fetch(&self, from: &str, to: &str) -> Result<ExchangeRate, FetchError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ExchangeRate::new(from, to, 1.0 + n as f64, Utc::now()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_refreshes_each_period_until_stopped() {
        let fetcher = Arc::new(CountingFetcher {
            calls: AtomicUsize::new(0),
        });
        let cache = RateCache::new(Arc::new(MemoryStore::new()));
        let provider = Arc::new(RateProvider::new(
            cache,
            fetcher.clone(),
            chrono::Duration::minutes(60),
        ));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);

        let task = RefreshTask::spawn(
            Arc::clone(&provider),
            vec![
                CurrencyPair::new("USD", "EUR"),
                CurrencyPair::new("EUR", "USD"),
            ],
            Duration::from_secs(60),
            move |pair, rate| {
                seen_clone
                    .lock()
                    .unwrap()
                    .push((pair.from.clone(), rate.map(|r| r.rate)));
            },
        );

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(95)).await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 4);

        task.stop().await;
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 4);

        assert_eq!(
            provider.cache().get("USD", "EUR").await.map(|r| r.rate),
            Some(3.0)
        );
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[0], ("USD".to_string(), Some(1.0)));
        assert_eq!(seen[3], ("EUR".to_string(), Some(4.0)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_oversized_period_keeps_task_alive() {
        let fetcher = Arc::new(CountingFetcher {
            calls: AtomicUsize::new(0),
        });
        let cache = RateCache::new(Arc::new(MemoryStore::new()));
        let provider = Arc::new(RateProvider::new(
            cache,
            fetcher.clone(),
            chrono::Duration::minutes(60),
        ));

        let task = RefreshTask::spawn(
            provider,
            vec![CurrencyPair::new("USD", "EUR")],
            Duration::MAX,
            |_, _| {},
        );

        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert!(!task.handle.is_finished());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
        task.stop().await;
    }
}
