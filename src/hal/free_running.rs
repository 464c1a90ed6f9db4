use super::CycleSource;
use crate::error::ConfigError;

/// Register-level view of a free-running 32-bit up-counter (DWT `CYCCNT` style).
pub trait FreeRunningCounter {
    /// Whether the counter exists on this part
    fn is_available(&self) -> bool {
        true
    }

    /// Current count
    fn count(&mut self) -> u32;

    /// Start counting, returns whether it was already running
    fn enable(&mut self) -> bool;

    fn disable(&mut self);
}

/// Cycle source reading a free-running up-counter.
///
/// The counter is never reprogrammed, only started if it was stopped and
/// stopped again on release.
pub struct UpCounter<T: FreeRunningCounter> {
    counter: T,
    was_running: Option<bool>,
}

impl<T: FreeRunningCounter> UpCounter<T> {
    pub const fn new(counter: T) -> Self {
        Self {
            counter,
            was_running: None,
        }
    }

    pub fn counter(&mut self) -> &mut T {
        &mut self.counter
    }

    pub fn into_inner(mut self) -> T {
        self.release();
        let Self { counter, .. } = self;
        counter
    }
}

impl<T: FreeRunningCounter> CycleSource for UpCounter<T> {
    fn check_period(&self, period: u32) -> Result<(), ConfigError> {
        if !self.counter.is_available() {
            return Err(ConfigError::NoCycleCounter);
        }
        let max = 1 << 30;
        if period == 0 || period > max {
            return Err(ConfigError::PeriodTooLong { period, max });
        }
        Ok(())
    }

    fn claim(&mut self, _period: u32) {
        let running = self.counter.enable();
        if self.was_running.is_none() {
            self.was_running = Some(running);
        }
    }

    /// The tick timer was never touched, so nothing is reported
    fn release(&mut self) -> Option<u32> {
        if self.was_running.take() == Some(false) {
            self.counter.disable();
        }
        None
    }

    #[inline(always)]
    fn now(&mut self) -> u32 {
        self.counter.count()
    }
}
