//! Non-blocking delay timers for repeat cadence and state-reset gating.

use std::time::{Duration, Instant};

/// Manages a non-blocking time delay against the monotonic clock.
///
/// The delay window starts when the timer is constructed or when one of
/// the `reset` methods is called. A period of zero elapses immediately on
/// the next observation, which is how "no debounce" mappings are built.
#[derive(Debug, Clone, Copy)]
pub struct DelayTimer {
    start: Instant,
    period: Duration,
}

impl DelayTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            start: Instant::now(),
            period,
        }
    }

    /// True once at least the configured period has passed since the last
    /// reset. Pure with respect to the clock; never rewinds.
    pub fn is_elapsed(&self) -> bool {
        self.start.elapsed() >= self.period
    }

    /// Restarts the delay window, keeping the current period.
    pub fn reset(&mut self) {
        self.start = Instant::now();
    }

    /// Restarts the delay window with a new period.
    pub fn reset_with(&mut self, period: Duration) {
        self.start = Instant::now();
        self.period = period;
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}
