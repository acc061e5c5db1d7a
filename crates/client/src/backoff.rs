//! Reconnect backoff state.
//!
//! Kept apart from the connection so the counters survive across dial
//! attempts and connection teardowns.

use std::time::Duration;

/// Default delay before the first retry.
pub const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Default ceiling for the retry delay.
pub const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Exponential backoff with a cap and an explicit reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    attempt: u32,
    delay: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(INITIAL_BACKOFF, MAX_BACKOFF)
    }
}

impl Backoff {
    /// Creates a backoff starting at `initial` and never exceeding `max`.
    pub fn new(initial: Duration, max: Duration) -> Self {
        let max = max.max(initial);
        Self {
            initial,
            max,
            attempt: 0,
            delay: initial,
        }
    }

    /// Records a failed attempt and returns how long to wait before the
    /// next one.
    ///
    /// The Nth consecutive call returns `min(initial * 2^(N-1), max)`.
    pub fn on_failure(&mut self) -> Duration {
        let wait = self.delay;
        self.attempt = self.attempt.saturating_add(1);
        self.delay = self.delay.saturating_mul(2).min(self.max);
        wait
    }

    /// Resets the counters after a successful authentication.
    pub fn on_success(&mut self) {
        self.attempt = 0;
        self.delay = self.initial;
    }

    /// Number of consecutive failures recorded since the last reset.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Delay the next failure will return.
    pub fn current_delay(&self) -> Duration {
        self.delay
    }

    /// The floor delay.
    pub fn initial(&self) -> Duration {
        self.initial
    }
}
