//! # fetchq
//!
//! Bounded-concurrency, rate-limited, retrying HTTP GET queue for polite
//! web fetching, plus a batch-fetch binary built on it.
//!
//! The queue admits at most `max_in_flight` concurrent requests and at most
//! `window_max_starts` request starts per trailing `window_ms`, retries
//! transient statuses (429/5xx) with capped exponential backoff, and fails
//! fast on everything else.

pub mod config;
pub mod error;
pub mod queue;
pub mod retry;

pub use config::QueueConfig;
pub use error::{FetchError, Result};
pub use queue::FetchQueue;
pub use retry::BackoffPolicy;
