//! Fixed-count, fixed-delay retry policy for single GET calls.

use std::future::Future;
use std::time::Duration;

use crate::Error;

/// How many times a failed request is re-sent, and how long to wait in between.
///
/// There is no backoff and no jitter: every retry waits the same `delay`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one.
    pub max_retries: usize,
    /// Pause before each retry.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            delay: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: usize, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// A policy that gives up after the first failure.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            delay: Duration::ZERO,
        }
    }

    /// Total number of attempts a request may take.
    pub fn max_attempts(&self) -> usize {
        self.max_retries + 1
    }

    /// Runs `f` until it succeeds, fails with a non-retryable error, or the
    /// retry budget is spent. The last error is returned unchanged.
    pub async fn run<T, F, Fut>(&self, label: &str, mut f: F) -> Result<T, Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        let mut retries = 0usize;
        loop {
            match f().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if !err.is_retryable() {
                        return Err(err);
                    }
                    if retries >= self.max_retries {
                        tracing::error!(
                            "{} failed after {} attempts: {}",
                            label,
                            retries + 1,
                            err
                        );
                        return Err(err);
                    }
                    retries += 1;
                    tracing::warn!(
                        "{} failed (retry {}/{}), retrying in {}ms: {}",
                        label,
                        retries,
                        self.max_retries,
                        self.delay.as_millis(),
                        err
                    );
                    tokio::time::sleep(self.delay).await;
                }
            }
        }
    }
}
