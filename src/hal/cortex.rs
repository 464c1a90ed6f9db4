//! Cortex-M bindings.
//!
//! [`PeriodicTimer`] for `SYST`, so `ReloadCounter<SYST>` is the default
//! cycle source on any Cortex-M part. [`DwtCounter`] reads the DWT cycle
//! counter, which only exists on ARMv7-M and later; enable the
//! `cortex-m-dwt` feature to build it.

use cortex_m::peripheral::SYST;
use cortex_m::peripheral::syst::SystClkSource;

use super::{PeriodicTimer, TimerControl};

impl PeriodicTimer for SYST {
    const MAX_RELOAD: u32 = 0x00FF_FFFF;

    fn reload(&mut self) -> u32 {
        SYST::get_reload()
    }

    fn set_reload(&mut self, reload: u32) {
        SYST::set_reload(self, reload);
    }

    #[inline(always)]
    fn current(&mut self) -> u32 {
        SYST::get_current()
    }

    fn clear_current(&mut self) {
        SYST::clear_current(self);
    }

    #[inline(always)]
    fn has_wrapped(&mut self) -> bool {
        SYST::has_wrapped(self)
    }

    fn control(&mut self) -> TimerControl {
        TimerControl {
            enabled: self.is_counter_enabled(),
            core_clock: matches!(self.get_clock_source(), SystClkSource::Core),
            interrupt: self.is_interrupt_enabled(),
        }
    }

    fn set_control(&mut self, control: TimerControl) {
        if !control.enabled {
            self.disable_counter();
        }
        self.set_clock_source(if control.core_clock {
            SystClkSource::Core
        } else {
            SystClkSource::External
        });
        if control.interrupt {
            self.enable_interrupt();
        } else {
            self.disable_interrupt();
        }
        if control.enabled {
            self.enable_counter();
        }
    }
}

#[cfg(feature = "cortex-m-dwt")]
pub use dwt::DwtCounter;

#[cfg(feature = "cortex-m-dwt")]
mod dwt {
    use cortex_m::peripheral::{DCB, DWT};

    use crate::hal::FreeRunningCounter;

    /// The DWT cycle counter, with the trace block it depends on.
    pub struct DwtCounter {
        dcb: DCB,
        dwt: DWT,
    }

    impl DwtCounter {
        pub const fn new(dcb: DCB, dwt: DWT) -> Self {
            Self { dcb, dwt }
        }

        pub fn free(self) -> (DCB, DWT) {
            (self.dcb, self.dwt)
        }
    }

    impl FreeRunningCounter for DwtCounter {
        fn is_available(&self) -> bool {
            self.dwt.has_cycle_counter()
        }

        #[inline(always)]
        fn count(&mut self) -> u32 {
            DWT::cycle_count()
        }

        fn enable(&mut self) -> bool {
            let running = DWT::cycle_counter_enabled();
            self.dcb.enable_trace();
            self.dwt.enable_cycle_counter();
            running
        }

        fn disable(&mut self) {
            self.dwt.disable_cycle_counter();
        }
    }
}
