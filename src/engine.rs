//! Bit timing engine.
//!
//! Every bit is scheduled against absolute cycle deadlines rather than
//! delays, so time spent between bits (fetching the next byte) is absorbed
//! by the next wait instead of stretching the waveform.

use crate::hal::{CycleSource, DataPin};
use crate::timing::BitPeriod;

/// Writes bytes as clockless pulses on one pin.
///
/// Borrows the pin and the claimed cycle source for one frame. Rising edges
/// fall exactly one bit period apart for the whole frame; the first one is a
/// full period after the writer is created.
pub struct BitWriter<'a, P: DataPin, C: CycleSource> {
    pin: &'a mut P,
    cycles: &'a mut C,
    total: u32,
    tail_one: u32,
    tail_zero: u32,
    /// Rising edge of the next bit
    mark: u32,
}

impl<'a, P: DataPin, C: CycleSource> BitWriter<'a, P, C> {
    pub fn new(pin: &'a mut P, cycles: &'a mut C, period: BitPeriod) -> Self {
        let total = period.total();
        let mark = cycles.now().wrapping_add(total);
        Self {
            pin,
            cycles,
            total,
            tail_one: period.tail(true),
            tail_zero: period.tail(false),
            mark,
        }
    }

    /// Emit the top `bits` bits of `value`, most significant first.
    ///
    /// Bits past the eighth are zeros. Returns as soon as the last bit has
    /// dropped low, leaving its tail for the caller to fetch the next byte.
    #[inline(always)]
    pub fn write_bits(&mut self, bits: u8, value: u8) {
        let mut value = value;
        for _ in 0..bits {
            let start = self.mark;
            let mark = start.wrapping_add(self.total);
            let tail = if value & 0x80 == 0 {
                self.tail_zero
            } else {
                self.tail_one
            };
            value <<= 1;

            self.cycles.wait_until(start);
            self.pin.set_high();
            self.cycles.wait_until(mark.wrapping_sub(tail));
            self.pin.set_low();
            self.mark = mark;
        }
    }

    /// Wait out the tail of the last bit written
    pub fn finish(&mut self) {
        self.cycles.wait_until(self.mark);
    }

    /// Cycle timestamp of the next rising edge
    pub const fn mark(&self) -> u32 {
        self.mark
    }
}
