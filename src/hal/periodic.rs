use super::CycleSource;
use crate::error::ConfigError;

/// Control bits of a periodic down-counting timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerControl {
    /// Counter is running
    pub enabled: bool,
    /// Counter is clocked from the core clock (rather than a reference clock)
    pub core_clock: bool,
    /// Counter raises its interrupt on every wrap
    pub interrupt: bool,
}

/// Register-level view of a periodic down-counting timer (SysTick style).
///
/// After `clear_current` the counter reads 0, then loads `reload` and
/// counts down to 0 again, raising the wrap flag each time it reaches 0.
/// One period is therefore `reload + 1` cycles.
pub trait PeriodicTimer {
    /// Largest reload value the timer accepts
    const MAX_RELOAD: u32;

    fn reload(&mut self) -> u32;

    fn set_reload(&mut self, reload: u32);

    fn current(&mut self) -> u32;

    fn clear_current(&mut self);

    /// Read and clear the wrap flag
    fn has_wrapped(&mut self) -> bool;

    fn control(&mut self) -> TimerControl;

    fn set_control(&mut self, control: TimerControl);
}

/// Cycle source that borrows a periodic timer for the length of a frame.
///
/// While claimed, the timer's reload is one bit period and its interrupt is
/// masked. The cycle timestamp is rebuilt from the wrap count and the
/// current down-count. The original reload and control bits are put back on
/// release.
///
/// Restarting the timer throws away the part of the tick period that had
/// already been counted, and no tick fires while the timer is borrowed.
/// `release` reports both so the time base can be credited exactly.
pub struct ReloadCounter<T: PeriodicTimer> {
    timer: T,
    period: u32,
    base: u32,
    saved: Option<(u32, TimerControl)>,
    /// Cycles of the tick period already elapsed when the timer was claimed
    elapsed_before: u32,
}

impl<T: PeriodicTimer> ReloadCounter<T> {
    pub const fn new(timer: T) -> Self {
        Self {
            timer,
            period: 0,
            base: 0,
            saved: None,
            elapsed_before: 0,
        }
    }

    /// Access the underlying timer
    pub fn timer(&mut self) -> &mut T {
        &mut self.timer
    }

    /// Release the underlying timer
    pub fn into_inner(mut self) -> T {
        self.release();
        let Self { timer, .. } = self;
        timer
    }

    /// Whether the timer is currently borrowed for a frame
    pub const fn is_claimed(&self) -> bool {
        self.saved.is_some()
    }

    /// Cycles since the last wrap of a running timer, 0 right at a wrap
    fn elapsed_in_period(&mut self, reload: u32) -> u32 {
        match self.timer.current() {
            0 => 0,
            current => reload.wrapping_add(1).wrapping_sub(current),
        }
    }
}

impl<T: PeriodicTimer> CycleSource for ReloadCounter<T> {
    fn check_period(&self, period: u32) -> Result<(), ConfigError> {
        let max = T::MAX_RELOAD.saturating_add(1);
        if period == 0 || period > max {
            return Err(ConfigError::PeriodTooLong { period, max });
        }
        Ok(())
    }

    fn claim(&mut self, period: u32) {
        let control = self.timer.control();
        if self.saved.is_none() {
            let reload = self.timer.reload();
            self.elapsed_before = if control.enabled {
                self.elapsed_in_period(reload)
            } else {
                0
            };
            self.saved = Some((reload, control));
        }

        self.timer.set_control(TimerControl {
            enabled: false,
            ..control
        });
        self.timer.set_reload(period - 1);
        self.timer.clear_current();
        self.timer.set_control(TimerControl {
            enabled: true,
            core_clock: true,
            interrupt: false,
        });
        // read to clear the wrap flag
        self.timer.has_wrapped();

        self.period = period;
        self.base = 0;
    }

    fn release(&mut self) -> Option<u32> {
        let (reload, control) = self.saved.take()?;
        let claimed = self.now();
        self.timer.set_control(TimerControl {
            enabled: false,
            ..control
        });
        self.timer.set_reload(reload);
        self.timer.clear_current();
        self.timer.has_wrapped();
        self.timer.set_control(control);

        Some(self.elapsed_before.saturating_add(claimed))
    }

    #[inline(always)]
    fn now(&mut self) -> u32 {
        // Flag before value: a wrap between the two reads makes `now` lag
        // by one period for a single poll, it never runs ahead.
        if self.timer.has_wrapped() {
            self.base = self.base.wrapping_add(self.period);
        }
        let value = self.timer.current();
        let within = if value == 0 {
            0
        } else {
            self.period.wrapping_sub(value)
        };
        self.base.wrapping_add(within)
    }
}
