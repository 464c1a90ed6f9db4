//! Critical section around one frame.
//!
//! Interrupts stay masked for the whole frame, so the platform's tick
//! interrupt cannot run. The guard borrows the cycle source for the frame
//! and, when dropped, hands it back and replays the ticks the frame swallowed.
//! A source that reprograms the tick timer reports exactly how much tick
//! progress was lost; otherwise the frame's wire time is credited.

use critical_section::CriticalSection;

use crate::error::ConfigError;
use crate::hal::{CycleSource, TimeBase};
use crate::timing::BitPeriod;

/// Wire cost of one frame, credited to the time base when the cycle source
/// cannot say what the frame cost the tick timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameBudget {
    pixels: usize,
    bits_per_pixel: u32,
    period: u32,
}

impl FrameBudget {
    /// Budget for `pixels` RGB pixels of `bits_per_byte`-bit bytes
    pub const fn new(pixels: usize, bits_per_byte: u8, period: BitPeriod) -> Self {
        Self {
            pixels,
            bits_per_pixel: 3 * bits_per_byte as u32,
            period: period.total(),
        }
    }

    /// Cycles per bit
    pub const fn period(self) -> u32 {
        self.period
    }

    pub const fn bits_per_pixel(self) -> u32 {
        self.bits_per_pixel
    }

    /// Cycles spent on the wire
    pub const fn cycles(self) -> u64 {
        self.pixels as u64 * self.bits_per_pixel as u64 * self.period as u64
    }
}

/// Converts core cycles to time-base ticks, carrying the remainder between
/// frames so repeated frames do not drift.
#[derive(Debug, Clone)]
pub struct TickConverter {
    cpu_hz: u64,
    tick_hz: u64,
    /// Leftover cycles scaled by `tick_hz`, always below `cpu_hz`
    remainder: u64,
}

impl TickConverter {
    pub const fn new(cpu_hz: u32, tick_hz: u32) -> Result<Self, ConfigError> {
        if cpu_hz == 0 || tick_hz == 0 {
            return Err(ConfigError::ZeroClock);
        }
        Ok(Self {
            cpu_hz: cpu_hz as u64,
            tick_hz: tick_hz as u64,
            remainder: 0,
        })
    }

    /// Whole ticks covered by `cycles` plus the carried remainder
    #[allow(clippy::cast_possible_truncation)]
    pub fn ticks_for(&mut self, cycles: u64) -> u32 {
        let scaled = u128::from(cycles) * u128::from(self.tick_hz) + u128::from(self.remainder);
        let cpu_hz = u128::from(self.cpu_hz);
        self.remainder = (scaled % cpu_hz) as u64;
        u32::try_from(scaled / cpu_hz).unwrap_or(u32::MAX)
    }
}

/// Scoped ownership of the cycle source with interrupts masked.
///
/// Holding a [`CriticalSection`] token ties the guard's lifetime to the
/// critical section it was created in. Dropping it restores the cycle
/// source and advances the time base, on every exit path.
pub struct ClockGuard<'cs, 'a, C: CycleSource, B: TimeBase> {
    cycles: &'a mut C,
    time_base: &'a mut B,
    converter: &'a mut TickConverter,
    budget: FrameBudget,
    _cs: CriticalSection<'cs>,
}

impl<'cs, 'a, C: CycleSource, B: TimeBase> ClockGuard<'cs, 'a, C, B> {
    /// Claim `cycles` for a frame described by `budget`
    pub fn acquire(
        cs: CriticalSection<'cs>,
        cycles: &'a mut C,
        time_base: &'a mut B,
        converter: &'a mut TickConverter,
        budget: FrameBudget,
    ) -> Self {
        cycles.claim(budget.period());
        Self {
            cycles,
            time_base,
            converter,
            budget,
            _cs: cs,
        }
    }

    /// The claimed cycle source
    pub fn cycles(&mut self) -> &mut C {
        self.cycles
    }

    pub const fn budget(&self) -> FrameBudget {
        self.budget
    }
}

impl<C: CycleSource, B: TimeBase> Drop for ClockGuard<'_, '_, C, B> {
    fn drop(&mut self) {
        let lost = self
            .cycles
            .release()
            .map_or(self.budget.cycles(), u64::from);
        let ticks = self.converter.ticks_for(lost);
        if ticks > 0 {
            self.time_base.advance(ticks);
        }
    }
}

/// Run `f` with interrupts masked and the cycle source claimed for `budget`.
pub fn with_clock<C, B, R>(
    cycles: &mut C,
    time_base: &mut B,
    converter: &mut TickConverter,
    budget: FrameBudget,
    f: impl FnOnce(&mut C) -> R,
) -> R
where
    C: CycleSource,
    B: TimeBase,
{
    critical_section::with(|cs| {
        let mut guard = ClockGuard::acquire(cs, cycles, time_base, converter, budget);
        f(guard.cycles())
    })
}
