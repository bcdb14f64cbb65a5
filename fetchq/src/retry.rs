//! Retry with exponential backoff
//!
//! Implements the retry policy for transient remote failures as a standalone
//! combinator, so the policy (which errors retry, how long to wait, when to
//! give up) is testable independent of any HTTP call.
//!
//! **Algorithm:**
//! 1. Attempt operation
//! 2. If successful, return result
//! 3. If error and retryable and attempts remain: log WARN, backoff, retry
//! 4. If error and not retryable, or attempts exhausted: return error

use std::future::Future;
use std::time::Duration;

/// Exponential backoff policy: delay before retry `attempt` (0-indexed) is
/// `min(base_delay_ms * 2^attempt, max_delay_ms)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Total attempts allowed, including the first (not per-retry)
    pub max_attempts: u32,
    /// Delay before the first retry, doubled each subsequent retry
    pub base_delay_ms: u64,
    /// Ceiling on any single backoff delay
    pub max_delay_ms: u64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 2_000,
            max_delay_ms: 10_000,
        }
    }
}

impl BackoffPolicy {
    /// Delay to sleep after failed attempt number `attempt` (0-indexed).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        // Shift saturates well past the cap for any realistic attempt count
        let factor = 1u64 << attempt.min(32);
        let delay_ms = self
            .base_delay_ms
            .saturating_mul(factor)
            .min(self.max_delay_ms);
        Duration::from_millis(delay_ms)
    }
}

/// Run `operation` until it succeeds, fails non-retryably, or the attempt
/// ceiling is reached. The closure receives the 0-indexed attempt number.
///
/// Returns the operation's result, or the final error after retries are
/// exhausted. The caller decides whether an exhausted error needs remapping
/// to a distinct "gave up" variant.
pub async fn with_backoff<F, Fut, T, E, P>(
    operation_name: &str,
    policy: BackoffPolicy,
    is_retryable: P,
    mut operation: F,
) -> std::result::Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let mut attempt = 0u32;

    loop {
        match operation(attempt).await {
            Ok(result) => {
                if attempt > 0 {
                    tracing::debug!(
                        operation = operation_name,
                        attempt = attempt + 1,
                        "Operation succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(err) => {
                let attempts_used = attempt + 1;

                if !is_retryable(&err) || attempts_used >= policy.max_attempts {
                    return Err(err);
                }

                let backoff = policy.delay_for(attempt);
                tracing::warn!(
                    operation = operation_name,
                    attempt = attempts_used,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %err,
                    "Transient failure, will retry after backoff"
                );

                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
        }
    }
}
