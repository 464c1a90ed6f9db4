//! Hardware abstraction seams.
//!
//! The timing algorithm only ever talks to three capabilities:
//!
//! - [`DataPin`] - the single output line
//! - [`CycleSource`] - a counter the bit loop busy-polls
//! - [`TimeBase`] - the platform's elapsed-time bookkeeping
//!
//! Two [`CycleSource`] strategies are provided: [`ReloadCounter`] borrows a
//! periodic down-counting timer (the default, works on any core with a
//! SysTick-like timer) and [`UpCounter`] reads a free-running up-counter.
//! Both are built on small register-level traits so they run unchanged
//! against the simulated hardware in [`crate::sim`].

mod free_running;
mod periodic;
mod pin;
mod tick;

#[cfg(feature = "cortex-m")]
pub mod cortex;

pub use free_running::{FreeRunningCounter, UpCounter};
pub use periodic::{PeriodicTimer, ReloadCounter, TimerControl};
pub use pin::HalPin;
pub use tick::TickCounter;

use crate::error::ConfigError;

/// The output line the strip's data input is wired to.
///
/// Implementations must be cheap and constant-time: both writes happen
/// inside the bit loop.
pub trait DataPin {
    /// Configure the line as a push-pull output
    fn set_output_mode(&mut self);

    /// Drive the line high
    fn set_high(&mut self);

    /// Drive the line low
    fn set_low(&mut self);
}

/// Busy-wait cycle counter used to schedule pin transitions.
///
/// `now` is a cycle timestamp that increases monotonically modulo 2^32 while
/// the source is claimed. Deadlines are compared with [`reached`], so
/// wrapping is harmless as long as a deadline is less than 2^31 cycles away.
pub trait CycleSource {
    /// Reject bit periods the source cannot count
    fn check_period(&self, period: u32) -> Result<(), ConfigError>;

    /// Take over the counter for a frame of `period`-cycle bits
    fn claim(&mut self, period: u32);

    /// Hand the counter back in the state `claim` found it.
    ///
    /// A source that borrows the platform's tick timer returns the cycles
    /// of tick progress the claim discarded: the part of the tick period
    /// counted before `claim` plus the time spent claimed. Sources that
    /// leave the tick timer alone return `None`. Releasing an unclaimed
    /// source does nothing and returns `None`.
    fn release(&mut self) -> Option<u32>;

    /// Current cycle timestamp
    fn now(&mut self) -> u32;

    /// Spin until `deadline` has been reached
    #[inline(always)]
    fn wait_until(&mut self, deadline: u32) {
        while !reached(self.now(), deadline) {}
    }
}

/// The platform's global tick counter (a millisecond counter on most boards).
pub trait TimeBase {
    /// Tick frequency in hertz
    fn tick_hz(&self) -> u32;

    /// Account for `ticks` ticks that were not delivered while interrupts
    /// were masked
    fn advance(&mut self, ticks: u32);
}

/// Wrap-safe `now >= deadline`
#[inline(always)]
#[allow(clippy::cast_possible_wrap)]
pub const fn reached(now: u32, deadline: u32) -> bool {
    now.wrapping_sub(deadline) as i32 >= 0
}

impl<T: DataPin + ?Sized> DataPin for &mut T {
    fn set_output_mode(&mut self) {
        (**self).set_output_mode();
    }

    #[inline(always)]
    fn set_high(&mut self) {
        (**self).set_high();
    }

    #[inline(always)]
    fn set_low(&mut self) {
        (**self).set_low();
    }
}

impl<T: TimeBase + ?Sized> TimeBase for &mut T {
    fn tick_hz(&self) -> u32 {
        (**self).tick_hz()
    }

    fn advance(&mut self, ticks: u32) {
        (**self).advance(ticks);
    }
}
