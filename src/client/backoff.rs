//! Reconnection backoff.

use std::time::Duration;

use crate::core::{INITIAL_RECONNECT_WAIT, MAX_RECONNECT_WAIT, RECONNECT_BACKOFF_FACTOR};

/// Shape of the wait between failed dials.
///
/// Waits start at `initial` and double after every failure until they
/// reach `max`, where they stay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// First wait.
    pub initial: Duration,
    /// Largest wait.
    pub max: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial: INITIAL_RECONNECT_WAIT,
            max: MAX_RECONNECT_WAIT,
        }
    }
}

impl BackoffPolicy {
    /// Create a policy.
    ///
    /// `max` below `initial` is raised to `initial` so waits never shrink.
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max: max.max(initial),
        }
    }

    /// Fresh state for one reconnection cycle.
    pub fn start(&self) -> Backoff {
        Backoff {
            current: self.initial,
            max: self.max.max(self.initial),
        }
    }
}

/// Backoff state local to one reconnection cycle.
#[derive(Debug, Clone)]
pub struct Backoff {
    current: Duration,
    max: Duration,
}

impl Backoff {
    /// The wait to apply now; advances the state for the next failure.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self
            .current
            .saturating_mul(RECONNECT_BACKOFF_FACTOR)
            .min(self.max);
        delay
    }

    /// The wait the next call to [`next_delay`](Self::next_delay) returns.
    pub fn peek(&self) -> Duration {
        self.current
    }
}
