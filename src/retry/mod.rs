//! Bounded retry with exponential backoff.
//!
//! Delays go through a [`Sleeper`] so tests can observe the backoff schedule without
//! waiting. Backoff doubles per retry: `initial, 2*initial, 4*initial, ...` capped at
//! `max_backoff`.

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::constants::{DEFAULT_INITIAL_BACKOFF, DEFAULT_MAX_BACKOFF, DEFAULT_MAX_RETRIES};
use crate::remote::{Classify, ErrorClass};

#[cfg(any(test, feature = "mock"))]
mod mock;

#[cfg(any(test, feature = "mock"))]
pub use mock::RecordingSleeper;

/// Suspends the current task for a duration.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// [`Sleeper`] backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Retry policy for transient remote failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            max_backoff: DEFAULT_MAX_BACKOFF,
        }
    }
}

/// Final error of a retried operation plus how many attempts were made.
#[derive(Debug, Clone, PartialEq)]
pub struct Exhausted<E> {
    pub error: E,
    pub attempts: u32,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_backoff: Duration) -> Self {
        Self {
            max_retries,
            initial_backoff,
            max_backoff: DEFAULT_MAX_BACKOFF.max(initial_backoff),
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Maximum attempts including the first one.
    #[inline]
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retry number `retry` (0-based).
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
        self.initial_backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }

    /// Runs `operation` until it succeeds, fails with a config-class error, or the retry
    /// budget is spent.
    ///
    /// `operation` receives the 1-based attempt number.
    pub async fn execute<S, F, Fut, T, E>(
        &self,
        sleeper: &S,
        label: &str,
        mut operation: F,
    ) -> Result<T, Exhausted<E>>
    where
        S: Sleeper,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Classify + std::fmt::Display,
    {
        let mut attempt = 1;

        loop {
            match operation(attempt).await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(label, attempt, "Succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(error) => {
                    let class = error.class();
                    if class == ErrorClass::Config {
                        debug!(label, attempt, error = %error, "Config-class failure, not retrying");
                        return Err(Exhausted {
                            error,
                            attempts: attempt,
                        });
                    }

                    if attempt > self.max_retries {
                        warn!(label, attempts = attempt, error = %error, "Retries exhausted");
                        return Err(Exhausted {
                            error,
                            attempts: attempt,
                        });
                    }

                    let backoff = self.backoff_for(attempt - 1);
                    warn!(
                        label,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %error,
                        "Transient failure, retrying"
                    );
                    sleeper.sleep(backoff).await;
                    attempt += 1;
                }
            }
        }
    }
}
