//! Error types for fetchq

use thiserror::Error;

/// Common result type for fetchq operations
pub type Result<T> = std::result::Result<T, FetchError>;

/// Fetch queue errors
///
/// Failure taxonomy: transient-remote (429/5xx) is retried by the queue and
/// surfaces as [`FetchError::RetriesExhausted`] once the attempt ceiling is
/// reached; everything else ([`FetchError::HttpStatus`] for other 4xx,
/// [`FetchError::Network`] for DNS/connect/timeout) surfaces immediately.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level failure: DNS, connection, TLS, or per-attempt timeout
    #[error("Network error fetching {url}: {source}")]
    Network {
        url: String,
        source: reqwest::Error,
    },

    /// Server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    /// Gave up on a transient status (429/5xx) after the retry ceiling
    #[error("Retries exhausted for {url}: {attempts} attempts, last status {last_status}")]
    RetriesExhausted {
        url: String,
        last_status: u16,
        attempts: u32,
    },

    /// Response arrived but the body could not be read as text
    #[error("Body read error for {url}: {source}")]
    Body {
        url: String,
        source: reqwest::Error,
    },

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FetchError {
    /// Best-known HTTP status for this failure, when one was observed.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::HttpStatus { status, .. } => Some(*status),
            FetchError::RetriesExhausted { last_status, .. } => Some(*last_status),
            _ => None,
        }
    }

    /// Whether this failure is transient in the retry taxonomy:
    /// HTTP 429 or any 5xx. Network errors and other 4xx are not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FetchError::HttpStatus { status, .. }
                if *status == 429 || (500..=599).contains(status)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_err(status: u16) -> FetchError {
        FetchError::HttpStatus {
            url: "http://example.com/".to_string(),
            status,
        }
    }

    #[test]
    fn test_transient_classification() {
        assert!(status_err(429).is_transient());
        assert!(status_err(500).is_transient());
        assert!(status_err(503).is_transient());
        assert!(status_err(599).is_transient());

        assert!(!status_err(404).is_transient());
        assert!(!status_err(403).is_transient());
        assert!(!status_err(400).is_transient());
    }

    #[test]
    fn test_retries_exhausted_not_retryable_again() {
        let err = FetchError::RetriesExhausted {
            url: "http://example.com/".to_string(),
            last_status: 503,
            attempts: 3,
        };
        assert!(!err.is_transient());
        assert_eq!(err.status(), Some(503));
    }

    #[test]
    fn test_status_accessor() {
        assert_eq!(status_err(404).status(), Some(404));
        assert_eq!(
            FetchError::Config("bad".to_string()).status(),
            None
        );
    }
}
