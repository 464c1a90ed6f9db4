//! Bit timing contract of clockless LED chips.
//!
//! A bit is three consecutive phases. The pin rises at the start of phase 1.
//! A `0` bit drops after phase 1, a `1` bit drops after phase 2, and phase 3
//! is low for both, so every bit has the same period and the same spacing of
//! rising edges.
//!
//! ```text
//!        |<- p1 ->|<- p2 ->|<- p3 ->|
//!  one:  ‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾|________|
//!  zero: ‾‾‾‾‾‾‾‾‾|_________________|
//! ```

use crate::error::ConfigError;

const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Phase durations in core clock cycles, before validation.
///
/// `adjust` is added to every phase. It compensates for the fixed cost of
/// the polling loop on a given target and may be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BitTiming {
    pub t1: u32,
    pub t2: u32,
    pub t3: u32,
    pub adjust: i32,
}

impl BitTiming {
    pub const fn new(t1: u32, t2: u32, t3: u32) -> Self {
        Self {
            t1,
            t2,
            t3,
            adjust: 0,
        }
    }

    /// Set the per-phase adjustment
    pub const fn with_adjust(mut self, adjust: i32) -> Self {
        self.adjust = adjust;
        self
    }

    /// Build from phase durations in nanoseconds for a core running at `cpu_hz`.
    ///
    /// Each phase is rounded up to a whole cycle.
    pub const fn from_nanos(t1_ns: u32, t2_ns: u32, t3_ns: u32, cpu_hz: u32) -> Self {
        Self::new(
            ns_to_cycles(t1_ns, cpu_hz),
            ns_to_cycles(t2_ns, cpu_hz),
            ns_to_cycles(t3_ns, cpu_hz),
        )
    }

    /// Resolve the adjusted phases, rejecting contracts that cannot be sent.
    pub const fn validate(&self) -> Result<BitPeriod, ConfigError> {
        let Some(phase3) = adjusted(self.t3, self.adjust) else {
            return Err(ConfigError::NoTailMargin);
        };
        let (Some(phase1), Some(phase2)) =
            (adjusted(self.t1, self.adjust), adjusted(self.t2, self.adjust))
        else {
            return Err(ConfigError::ZeroPhase);
        };
        let Some(high) = phase1.checked_add(phase2) else {
            return Err(ConfigError::PeriodOverflow);
        };
        if high.checked_add(phase3).is_none() {
            return Err(ConfigError::PeriodOverflow);
        }
        Ok(BitPeriod {
            phase1,
            phase2,
            phase3,
        })
    }
}

/// Phase length plus adjustment, `None` if it is not a positive `u32`
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
const fn adjusted(phase: u32, adjust: i32) -> Option<u32> {
    let value = phase as i64 + adjust as i64;
    if value <= 0 || value > u32::MAX as i64 {
        None
    } else {
        Some(value as u32)
    }
}

#[allow(clippy::cast_possible_truncation)]
const fn ns_to_cycles(ns: u32, cpu_hz: u32) -> u32 {
    let cycles = (ns as u64 * cpu_hz as u64).div_ceil(NANOS_PER_SECOND);
    if cycles > u32::MAX as u64 {
        u32::MAX
    } else {
        cycles as u32
    }
}

/// Validated phase durations, adjustment included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BitPeriod {
    phase1: u32,
    phase2: u32,
    phase3: u32,
}

impl BitPeriod {
    pub const fn phase1(self) -> u32 {
        self.phase1
    }

    pub const fn phase2(self) -> u32 {
        self.phase2
    }

    pub const fn phase3(self) -> u32 {
        self.phase3
    }

    /// Cycles from one rising edge to the next
    pub const fn total(self) -> u32 {
        self.phase1 + self.phase2 + self.phase3
    }

    /// Cycles the pin stays low at the end of a bit
    #[inline]
    pub const fn tail(self, bit: bool) -> u32 {
        if bit {
            self.phase3
        } else {
            self.phase2 + self.phase3
        }
    }

    /// Cycles the pin stays high at the start of a bit
    #[inline]
    pub const fn high(self, bit: bool) -> u32 {
        self.total() - self.tail(bit)
    }
}

/// Chipset timings in nanoseconds.
pub mod chipset {
    use super::BitTiming;

    /// Nanosecond phase durations of one chip family
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct ChipTiming {
        pub t1_ns: u32,
        pub t2_ns: u32,
        pub t3_ns: u32,
    }

    impl ChipTiming {
        pub const fn new(t1_ns: u32, t2_ns: u32, t3_ns: u32) -> Self {
            Self {
                t1_ns,
                t2_ns,
                t3_ns,
            }
        }

        /// Cycle timing for a core clocked at `cpu_hz`
        pub const fn at(self, cpu_hz: u32) -> BitTiming {
            BitTiming::from_nanos(self.t1_ns, self.t2_ns, self.t3_ns, cpu_hz)
        }
    }

    pub const WS2812: ChipTiming = ChipTiming::new(250, 625, 375);
    pub const WS2811: ChipTiming = ChipTiming::new(320, 320, 640);
    pub const WS2811_400KHZ: ChipTiming = ChipTiming::new(800, 800, 900);
    pub const WS2813: ChipTiming = ChipTiming::new(320, 320, 640);
    pub const SK6812: ChipTiming = ChipTiming::new(300, 300, 600);
    pub const SK6822: ChipTiming = ChipTiming::new(375, 1000, 375);
    pub const TM1809: ChipTiming = ChipTiming::new(350, 350, 450);
    pub const UCS1903_400KHZ: ChipTiming = ChipTiming::new(500, 1500, 500);
    pub const GW6205_400KHZ: ChipTiming = ChipTiming::new(800, 800, 800);
    pub const LPD1886: ChipTiming = ChipTiming::new(200, 400, 200);
    pub const APA106: ChipTiming = ChipTiming::new(400, 1250, 400);
}
