//! Error types used throughout the engine
//!
//! Provides error classification for provider operations with retry
//! metadata. The request executor consults [`ErrorCategory`] to decide
//! whether an outcome is worth retrying.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Categories of provider errors for retry logic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Authentication failures (bad credentials) - non-retryable
    Authentication,
    /// Rate limiting (429) - retryable after the advertised delay
    RateLimit,
    /// Server errors (5xx) - retryable with backoff
    Server,
    /// Client errors (4xx except 401/429) - non-retryable
    Client,
    /// Network/connection errors - retryable with backoff
    Network,
    /// Malformed response bodies - non-retryable
    Parse,
    /// Configuration errors - non-retryable
    Config,
    /// Persistence-store failures - non-retryable (best-effort callers swallow these)
    Store,
}

/// Main error type for ProspectArc
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum ProspectError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Rate limited (retry after {retry_after_secs}s): {message}")]
    RateLimit { retry_after_secs: u64, message: String },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProspectError {
    /// Get the error category for this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Auth(_) => ErrorCategory::Authentication,
            Self::RateLimit { .. } => ErrorCategory::RateLimit,
            Self::Api { status, .. } if *status >= 500 => ErrorCategory::Server,
            // Status 0 marks a connection failure wrapped after retries
            Self::Api { status, .. } if *status == 0 => ErrorCategory::Network,
            Self::Api { .. } => ErrorCategory::Client,
            Self::Network(_) => ErrorCategory::Network,
            Self::Parse(_) => ErrorCategory::Parse,
            Self::Config(_) => ErrorCategory::Config,
            Self::Store(_) => ErrorCategory::Store,
            Self::Internal(_) => ErrorCategory::Config,
        }
    }

    /// Check if this error class may be retried at all
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::RateLimit | ErrorCategory::Server | ErrorCategory::Network
        )
    }
}

/// Result type alias for ProspectArc operations
pub type Result<T> = std::result::Result<T, ProspectError>;
