//! Proactive request pacing
//!
//! Enforces a minimum interval between outbound requests so the provider's
//! rate limit is respected before it ever trips. The last-send timestamp is
//! single-writer shared state; callers are expected to pace sequentially
//! (sub-batches are not partitioned per pacer).

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::debug;

use crate::time::Clock;

/// Minimum-interval throttle applied before every outbound request
pub struct Pacer {
    interval: Duration,
    last_sent: Mutex<Option<Instant>>,
}

impl Pacer {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self { interval, last_sent: Mutex::new(None) }
    }

    /// Sleep the remainder of the pacing interval since the previous send,
    /// then mark the current send.
    pub async fn pace(&self, clock: &dyn Clock) {
        let wait = {
            let last = self.last_sent.lock();
            match *last {
                Some(prev) => {
                    let elapsed = clock.now().saturating_duration_since(prev);
                    self.interval.saturating_sub(elapsed)
                }
                None => Duration::ZERO,
            }
        };

        if !wait.is_zero() {
            debug!(wait_ms = wait.as_millis() as u64, "pacing before request");
            clock.sleep(wait).await;
        }

        *self.last_sent.lock() = Some(clock.now());
    }
}
