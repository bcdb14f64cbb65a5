//! Queue configuration
//!
//! All knobs are fixed at queue construction; nothing is runtime-adjustable.
//! Defaults are the production politeness settings. An optional TOML file can
//! override individual fields; anything not present falls back to the default.

use crate::error::{FetchError, Result};
use crate::retry::BackoffPolicy;
use serde::Deserialize;
use std::path::Path;

const DEFAULT_USER_AGENT: &str = concat!("fetchq/", env!("CARGO_PKG_VERSION"));

/// Fetch queue configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Concurrency cap: requests in flight at once
    pub max_in_flight: usize,
    /// Rate cap: request starts allowed per trailing window
    pub window_max_starts: usize,
    /// Rolling rate-window length in milliseconds
    pub window_ms: u64,
    /// Per-attempt HTTP timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Redirect hops followed per attempt
    pub max_redirects: usize,
    /// Total attempts per URL on transient failures (429/5xx)
    pub max_attempts: u32,
    /// Backoff before the first retry, in milliseconds, doubled per retry
    pub backoff_base_ms: u64,
    /// Ceiling on a single backoff delay, in milliseconds
    pub backoff_max_ms: u64,
    /// User-Agent header sent on every request
    pub user_agent: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_in_flight: 3,
            window_max_starts: 50,
            window_ms: 60_000,
            request_timeout_ms: 15_000,
            max_redirects: 3,
            max_attempts: 3,
            backoff_base_ms: 2_000,
            backoff_max_ms: 10_000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl QueueConfig {
    /// Load configuration from a TOML file, with defaults for absent fields.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FetchError::Config(format!("Read {} failed: {}", path.display(), e))
        })?;
        let config: QueueConfig = toml::from_str(&content).map_err(|e| {
            FetchError::Config(format!("Parse {} failed: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would wedge admission or disable requests.
    pub fn validate(&self) -> Result<()> {
        if self.max_in_flight == 0 {
            return Err(FetchError::Config(
                "max_in_flight must be at least 1".to_string(),
            ));
        }
        if self.window_max_starts == 0 {
            return Err(FetchError::Config(
                "window_max_starts must be at least 1".to_string(),
            ));
        }
        if self.window_ms == 0 {
            return Err(FetchError::Config(
                "window_ms must be non-zero".to_string(),
            ));
        }
        if self.request_timeout_ms == 0 {
            return Err(FetchError::Config(
                "request_timeout_ms must be non-zero".to_string(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(FetchError::Config(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Backoff policy slice of this configuration.
    pub fn backoff(&self) -> BackoffPolicy {
        BackoffPolicy {
            max_attempts: self.max_attempts,
            base_delay_ms: self.backoff_base_ms,
            max_delay_ms: self.backoff_max_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_politeness_settings() {
        let config = QueueConfig::default();
        assert_eq!(config.max_in_flight, 3);
        assert_eq!(config.window_max_starts, 50);
        assert_eq!(config.window_ms, 60_000);
        assert_eq!(config.request_timeout_ms, 15_000);
        assert_eq!(config.max_redirects, 3);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.backoff_base_ms, 2_000);
        assert_eq!(config.backoff_max_ms, 10_000);
        assert!(config.user_agent.starts_with("fetchq/"));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(QueueConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_caps_rejected() {
        let mut config = QueueConfig::default();
        config.max_in_flight = 0;
        assert!(config.validate().is_err());

        let mut config = QueueConfig::default();
        config.window_max_starts = 0;
        assert!(config.validate().is_err());

        let mut config = QueueConfig::default();
        config.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config: QueueConfig =
            toml::from_str("max_in_flight = 5\nbackoff_base_ms = 100\n").unwrap();
        assert_eq!(config.max_in_flight, 5);
        assert_eq!(config.backoff_base_ms, 100);
        // Untouched fields keep defaults
        assert_eq!(config.window_max_starts, 50);
        assert_eq!(config.max_attempts, 3);
    }

    #[test]
    fn test_backoff_slice() {
        let config = QueueConfig::default();
        let policy = config.backoff();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay_ms, 2_000);
        assert_eq!(policy.max_delay_ms, 10_000);
    }
}
