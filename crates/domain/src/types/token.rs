//! Bearer-token type with expiry metadata
//!
//! Tokens are created by authentication, persisted on success, and replaced
//! wholesale on refresh — never mutated in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bearer token issued by `POST /authenticate`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiToken {
    /// Raw bearer value placed in the `Authorization` header
    pub value: String,
    /// When the token was obtained
    pub issued_at: DateTime<Utc>,
    /// Absolute expiration timestamp (UTC)
    pub expires_at: DateTime<Utc>,
}

impl ApiToken {
    /// Create a new token with expiry calculated from a TTL in seconds
    #[must_use]
    pub fn new(value: String, ttl_secs: i64) -> Self {
        let issued_at = Utc::now();
        Self { value, issued_at, expires_at: issued_at + chrono::Duration::seconds(ttl_secs) }
    }

    /// Check if the token is expired or will expire within the given margin.
    ///
    /// A token is usable only while `now < expires_at - margin`.
    #[must_use]
    pub fn is_expired(&self, margin_secs: i64) -> bool {
        Utc::now() + chrono::Duration::seconds(margin_secs) >= self.expires_at
    }

    /// Seconds until expiry (negative once expired)
    #[must_use]
    pub fn seconds_until_expiry(&self) -> i64 {
        (self.expires_at - Utc::now()).num_seconds()
    }
}
