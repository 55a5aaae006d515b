//! Retry strategy with exponential backoff and optional jitter
//!
//! The request executor drives its own bounded attempt loop; this type
//! only answers "may I retry?" and "how long do I wait?". Delays grow as
//! `base * 2^attempt`, capped at `max_delay`.

use std::time::Duration;

use rand::Rng;

const MAX_BACKOFF_EXPONENT: u32 = 10;

/// Bounded exponential-backoff schedule
#[derive(Debug, Clone)]
pub struct RetryStrategy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    jitter_factor: f64,
}

impl Default for RetryStrategy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(64),
            jitter_factor: 0.0,
        }
    }
}

impl RetryStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the retry budget (retries after the first attempt)
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set the base delay for exponential backoff
    #[must_use]
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Set the maximum delay cap
    #[must_use]
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the jitter factor (0.0 = no jitter, 1.0 = full jitter)
    #[must_use]
    pub fn with_jitter_factor(mut self, factor: f64) -> Self {
        self.jitter_factor = factor.clamp(0.0, 1.0);
        self
    }

    /// Whether another retry is allowed after `attempt` failures
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Calculate delay for a given 0-based attempt with backoff and jitter
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.apply_jitter(self.exponential_delay(attempt))
    }

    fn exponential_delay(&self, attempt: u32) -> Duration {
        let base_millis = self.base_delay.as_millis() as u64;
        let max_millis = self.max_delay.as_millis() as u64;

        // Cap exponent to prevent overflow
        let exponent = attempt.min(MAX_BACKOFF_EXPONENT);
        let multiplier = 2_u64.saturating_pow(exponent);

        Duration::from_millis(base_millis.saturating_mul(multiplier).min(max_millis))
    }

    /// Apply jitter to prevent thundering herd
    fn apply_jitter(&self, delay: Duration) -> Duration {
        if self.jitter_factor == 0.0 {
            return delay;
        }

        let mut rng = rand::thread_rng();
        let delay_millis = delay.as_millis() as f64;
        let jitter_range = delay_millis * self.jitter_factor;

        let jitter = rng.gen_range(-jitter_range / 2.0..=jitter_range / 2.0);
        Duration::from_millis((delay_millis + jitter).max(0.0) as u64)
    }
}
