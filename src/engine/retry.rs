use reqwest::Url;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::fetcher::Fetcher;

/// Per-probe retry policy. Only timeouts are retried; the delay before
/// attempt `n + 1` is `backoff * n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// A single attempt, no retries.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff * attempt
    }
}

/// Fetches `url`, retrying timeouts according to `policy`.
pub async fn fetch_with_retry(
    fetcher: &dyn Fetcher,
    url: &Url,
    timeout: Duration,
    policy: &RetryPolicy,
) -> Result<Vec<u8>, FetchError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match fetcher.fetch(url, timeout).await {
            Ok(body) => return Ok(body),
            Err(err) if err.is_retryable() && attempt < max_attempts => {
                let backoff = policy.backoff_for(attempt);
                debug!(
                    url = %url,
                    attempt,
                    max_attempts,
                    backoff_ms = backoff.as_millis() as u64,
                    "timed out, backing off"
                );
                tokio::time::sleep(backoff).await;
            }
            Err(err) => {
                if err.is_retryable() {
                    warn!(url = %url, attempts = attempt, "giving up after repeated timeouts");
                }
                return Err(err);
            }
        }
    }
}
