use crate::core::fetch::RetryPolicy;
use std::fmt::Display;
use std::future::Future;
use tracing::debug;

/// Retries an async operation under a rate limit with exponential backoff
///
/// # Parameters
/// - `operation`: Closure returning a future, called once per attempt
/// - `policy`: Attempt budget, the pause before every attempt and the backoff unit
///
/// # Returns
/// Either the first successful result or the error of the final attempt
pub async fn with_backoff<F, Fut, T, E>(mut operation: F, policy: &RetryPolicy) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let attempts = policy.attempts();
    let mut attempt = 1;
    loop {
        tokio::time::sleep(policy.rate_limit_delay).await;
        match operation().await {
            Ok(val) => return Ok(val),
            Err(err) => {
                if attempt >= attempts {
                    return Err(err);
                }
                let backoff = policy.backoff(attempt);
                debug!(
                    "Attempt {}/{} failed: {}. Retrying in {:?}...",
                    attempt, attempts, err, backoff
                );
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
        }
    }
}
