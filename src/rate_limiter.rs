//! Inter-frame spacing.
//!
//! Clockless chips latch a frame once the line has been idle for their reset
//! time. A new frame started earlier would be appended to the previous one,
//! so frames are spaced from the end of one to the start of the next.

use embassy_time::{Duration, Instant};

/// Default minimum interval between frames.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_micros(500);

const ZERO: Duration = Duration::from_ticks(0);

/// Enforces a minimum interval between the end of one frame and the start of
/// the next.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    min_interval: Duration,
    last: Option<Instant>,
}

impl RateLimiter {
    pub const fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: None,
        }
    }

    pub const fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// End of the last frame, if any
    pub const fn last_mark(&self) -> Option<Instant> {
        self.last
    }

    /// Time still to wait at `now` before the next frame may start
    pub fn remaining(&self, now: Instant) -> Duration {
        let Some(last) = self.last else {
            return ZERO;
        };
        let elapsed = now.saturating_duration_since(last);
        self.min_interval.checked_sub(elapsed).unwrap_or(ZERO)
    }

    /// Busy-wait until the next frame may start.
    ///
    /// Returns immediately before the first [`RateLimiter::mark`].
    pub fn wait(&self) {
        let Some(last) = self.last else {
            return;
        };
        while Instant::now().saturating_duration_since(last) < self.min_interval {}
    }

    /// Record the end of a frame
    pub fn mark(&mut self) {
        self.mark_at(Instant::now());
    }

    pub fn mark_at(&mut self, now: Instant) {
        self.last = Some(now);
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}
