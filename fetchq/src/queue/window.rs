//! Rolling-window rate limiter
//!
//! Bounds the number of request *starts* in any trailing window, as opposed
//! to fixed clock buckets. Start timestamps are kept in a deque; admission
//! waits until the oldest recorded start ages out of the window.

use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Admission limiter: at most `max_starts` starts per trailing `window`.
pub(crate) struct RollingWindow {
    starts: Mutex<VecDeque<Instant>>,
    max_starts: usize,
    window: Duration,
}

impl RollingWindow {
    pub(crate) fn new(max_starts: usize, window: Duration) -> Self {
        Self {
            starts: Mutex::new(VecDeque::with_capacity(max_starts)),
            max_starts,
            window,
        }
    }

    /// Wait until a new start fits the window budget, then record it.
    ///
    /// Multiple waiters may wake at the same expiry; each re-checks the
    /// budget under the lock before recording, so the cap holds regardless
    /// of wake order.
    pub(crate) async fn admit(&self) {
        loop {
            let wait = {
                let mut starts = self.starts.lock().await;
                let now = Instant::now();

                // Drop starts that have aged out of the trailing window
                while let Some(front) = starts.front() {
                    if now.duration_since(*front) >= self.window {
                        starts.pop_front();
                    } else {
                        break;
                    }
                }

                if starts.len() < self.max_starts {
                    starts.push_back(now);
                    return;
                }

                // Budget full: the next slot opens when the oldest start
                // leaves the window. front() is present whenever len > 0.
                match starts.front() {
                    Some(front) => (*front + self.window).saturating_duration_since(now),
                    None => Duration::ZERO,
                }
            };

            tracing::debug!(
                wait_ms = wait.as_millis() as u64,
                "Rate window full, waiting for a start slot"
            );

            // Floor avoids a hot spin when expiry rounds to zero
            tokio::time::sleep(wait.max(Duration::from_millis(1))).await;
        }
    }
}
