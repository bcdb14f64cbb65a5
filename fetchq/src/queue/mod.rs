//! Bounded-concurrency retrying fetch queue
//!
//! Wraps outbound HTTP GETs with two admission gates and a retry policy:
//! - a concurrency cap on requests in flight at once;
//! - a rolling rate window bounding request starts per trailing interval;
//! - automatic retry with exponential backoff on transient statuses (429/5xx).
//!
//! Admission state (semaphore, start-timestamp window) is owned by the queue
//! instance, so independent queues can coexist in one process and the state
//! is testable in isolation.

mod window;

use crate::config::QueueConfig;
use crate::error::{FetchError, Result};
use crate::retry::{self, BackoffPolicy};
use std::time::Duration;
use tokio::sync::Semaphore;
use window::RollingWindow;

/// Rate-limited, retrying HTTP GET queue
///
/// Per-request lifecycle: Queued (waiting on admission) → InFlight →
/// Succeeded, RetryPending (backoff before re-admission), or Failed.
/// A request waiting out a backoff does not occupy an in-flight slot.
pub struct FetchQueue {
    client: reqwest::Client,
    concurrency: Semaphore,
    window: RollingWindow,
    policy: BackoffPolicy,
}

impl FetchQueue {
    /// Build a queue from configuration. All limits are fixed for the
    /// lifetime of the queue.
    pub fn new(config: QueueConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| FetchError::Config(format!("HTTP client build failed: {}", e)))?;

        Ok(Self {
            client,
            concurrency: Semaphore::new(config.max_in_flight),
            window: RollingWindow::new(
                config.window_max_starts,
                Duration::from_millis(config.window_ms),
            ),
            policy: config.backoff(),
        })
    }

    /// Build a queue with the default politeness settings.
    pub fn with_defaults() -> Result<Self> {
        Self::new(QueueConfig::default())
    }

    /// Fetch a URL and return the response body as text.
    ///
    /// Suspends until both admission gates allow the request to start.
    /// Transient statuses (429/5xx) are retried in place up to the attempt
    /// ceiling; other HTTP errors and network/timeout failures surface
    /// immediately. Admission across concurrent callers is best-effort FIFO
    /// but not guaranteed; callers must not rely on completion order.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let result = retry::with_backoff(
            url,
            self.policy,
            FetchError::is_transient,
            |attempt| self.attempt(url, attempt),
        )
        .await;

        match result {
            Ok(body) => Ok(body),
            Err(FetchError::HttpStatus { url, status })
                if status == 429 || (500..=599).contains(&status) =>
            {
                tracing::warn!(
                    url = %url,
                    status,
                    attempts = self.policy.max_attempts,
                    "Giving up: retries exhausted"
                );
                Err(FetchError::RetriesExhausted {
                    url,
                    last_status: status,
                    attempts: self.policy.max_attempts,
                })
            }
            Err(err) => {
                tracing::warn!(error = %err, "Fetch failed");
                Err(err)
            }
        }
    }

    /// One admission-gated HTTP attempt.
    async fn attempt(&self, url: &str, attempt: u32) -> Result<String> {
        // Concurrency gate first, then the rate window records the start.
        // The permit is held for the duration of the request and released
        // before any backoff sleep.
        let _permit = self
            .concurrency
            .acquire()
            .await
            .expect("concurrency semaphore is never closed");
        self.window.admit().await;

        tracing::debug!(url = %url, attempt = attempt + 1, "Request admitted");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();

        // Redirects were already followed (up to the hop cap); a remaining
        // 3xx such as 304 is terminal and its body is the result.
        if status.is_success() || status.is_redirection() {
            return response.text().await.map_err(|e| FetchError::Body {
                url: url.to_string(),
                source: e,
            });
        }

        Err(FetchError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}
