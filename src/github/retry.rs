//! Exponential backoff for rate-limited GitHub calls.

use std::future::Future;
use std::time::Duration;

use backoff::ExponentialBackoff;
use backoff::backoff::Backoff;
use tracing::warn;

use crate::error::GitHubError;

/// Configuration: 3 total attempts, base 1s, max 30s.
pub const MAX_ATTEMPTS: u32 = 3;
const INITIAL_INTERVAL_SECS: u64 = 1;
const MAX_INTERVAL_SECS: u64 = 30;

/// Retry a GitHub call while it reports rate limiting.
///
/// Any other error is returned immediately. After `MAX_ATTEMPTS` rate-limited
/// responses the last one is returned.
pub async fn retry_rate_limited<T, Fut, F>(mut attempt: F) -> Result<T, GitHubError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GitHubError>>,
{
    let mut backoff = ExponentialBackoff {
        initial_interval: Duration::from_secs(INITIAL_INTERVAL_SECS),
        max_interval: Duration::from_secs(MAX_INTERVAL_SECS),
        max_elapsed_time: None,
        ..Default::default()
    };

    let mut attempts = 0;

    loop {
        attempts += 1;

        match attempt().await {
            Err(e @ GitHubError::RateLimited { .. }) if attempts < MAX_ATTEMPTS => {
                let Some(wait_duration) = backoff.next_backoff() else {
                    return Err(e);
                };
                warn!(
                    attempt = attempts,
                    wait_ms = wait_duration.as_millis() as u64,
                    "{}, retrying",
                    e
                );
                tokio::time::sleep(wait_duration).await;
            }
            other => return other,
        }
    }
}
