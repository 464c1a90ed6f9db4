//! Pixel sources feeding the transmitter one wire byte at a time.
//!
//! The transmitter never touches colours directly. It asks a
//! [`PixelSource`] for the next byte in a fixed call sequence that keeps
//! exactly one byte of lookahead, so scaling and dithering run while the
//! previous byte is still on the wire.

use crate::color::{ColorOrder, Rgb, channel};
use crate::math8::{qadd8, reverse8, scale8};

/// Number of dither bits, the dither pattern repeats every `2^DITHER_BITS` frames
const DITHER_BITS: u8 = 3;
const DITHER_MASK: u8 = (1 << DITHER_BITS) - 1;

/// Byte supplier consumed by [`crate::transmitter::transmit`].
///
/// Slots are wire positions (0 = first byte of a pixel on the wire), not
/// colour channels.
pub trait PixelSource {
    /// Pixels left, the current one included
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// At least `n` pixels are left
    #[inline(always)]
    fn has(&self, n: usize) -> bool {
        self.len() >= n
    }

    /// Advance the dither of slot 0 ahead of the first load
    fn pre_step_first_byte_dithering(&mut self);

    /// Advance the dither of every slot, once per pixel
    fn step_dithering(&mut self);

    /// Byte for `slot` of the current pixel
    fn load(&mut self, slot: usize) -> u8;

    /// Move to the next pixel and return its slot 0 byte (0 past the end)
    fn advance_and_load_first(&mut self) -> u8;
}

/// Whether to spread sub-step brightness over consecutive frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DitherMode {
    Disabled,
    /// Add a frame-rotating binary dither pattern before scaling
    #[default]
    Binary,
}

/// Rolling frame counter behind [`DitherMode::Binary`], one per controller.
#[derive(Debug, Clone, Default)]
pub struct DitherState {
    frame: u8,
}

impl DitherState {
    pub const fn new() -> Self {
        Self { frame: 0 }
    }

    /// Advance one frame and return the unscaled dither signal.
    ///
    /// The frame counter is bit-reversed so consecutive frames land far
    /// apart, then moved to the middle of its range.
    fn next_signal(&mut self) -> u8 {
        self.frame = self.frame.wrapping_add(1) & DITHER_MASK;
        reverse8(self.frame).wrapping_add(1 << (7 - DITHER_BITS))
    }
}

#[derive(Debug, Clone, Copy)]
enum Pixels<'a> {
    Slice(&'a [Rgb]),
    Solid(Rgb),
}

/// [`PixelSource`] applying scale, dithering and channel order to RGB pixels.
#[derive(Debug, Clone)]
pub struct PixelController<'a> {
    pixels: Pixels<'a>,
    index: usize,
    remaining: usize,
    /// Raw channel index of each wire slot
    slots: [usize; 3],
    /// Scale of each wire slot
    scale: [u8; 3],
    d: [u8; 3],
    e: [u8; 3],
}

impl<'a> PixelController<'a> {
    /// Source over `pixels`
    pub fn new(
        pixels: &'a [Rgb],
        scale: Rgb,
        order: ColorOrder,
        mode: DitherMode,
        dither: &mut DitherState,
    ) -> Self {
        Self::build(Pixels::Slice(pixels), pixels.len(), scale, order, mode, dither)
    }

    /// Source repeating `color` for `count` pixels
    pub fn solid(
        color: Rgb,
        count: usize,
        scale: Rgb,
        order: ColorOrder,
        mode: DitherMode,
        dither: &mut DitherState,
    ) -> Self {
        Self::build(Pixels::Solid(color), count, scale, order, mode, dither)
    }

    fn build(
        pixels: Pixels<'a>,
        count: usize,
        scale: Rgb,
        order: ColorOrder,
        mode: DitherMode,
        dither: &mut DitherState,
    ) -> Self {
        let slots = order.slots();
        let scale = slots.map(|index| channel(scale, index));
        let mut controller = Self {
            pixels,
            index: 0,
            remaining: count,
            slots,
            scale,
            d: [0; 3],
            e: [0; 3],
        };
        if mode == DitherMode::Binary {
            controller.init_binary_dithering(dither.next_signal());
        }
        controller
    }

    #[allow(clippy::cast_possible_truncation)]
    fn init_binary_dithering(&mut self, signal: u8) {
        for slot in 0..3 {
            let s = self.scale[slot];
            let mut e = if s == 0 {
                0
            } else {
                (256 / u16::from(s) + 1).min(255) as u8
            };
            let mut d = scale8(signal, e);
            d = d.saturating_sub(1);
            e = e.saturating_sub(1);
            self.d[slot] = d;
            self.e[slot] = e;
        }
    }

    #[inline(always)]
    fn raw(&self, slot: usize) -> u8 {
        let color = match self.pixels {
            Pixels::Slice(pixels) => match pixels.get(self.index) {
                Some(color) => *color,
                None => return 0,
            },
            Pixels::Solid(color) => color,
        };
        channel(color, self.slots[slot])
    }
}

impl PixelSource for PixelController<'_> {
    fn len(&self) -> usize {
        self.remaining
    }

    fn pre_step_first_byte_dithering(&mut self) {
        self.d[0] = self.e[0].wrapping_sub(self.d[0]);
    }

    #[inline(always)]
    fn step_dithering(&mut self) {
        for slot in 0..3 {
            self.d[slot] = self.e[slot].wrapping_sub(self.d[slot]);
        }
    }

    #[inline(always)]
    fn load(&mut self, slot: usize) -> u8 {
        if self.remaining == 0 {
            return 0;
        }
        let byte = self.raw(slot);
        let dithered = if byte == 0 { 0 } else { qadd8(byte, self.d[slot]) };
        scale8(dithered, self.scale[slot])
    }

    #[inline(always)]
    fn advance_and_load_first(&mut self) -> u8 {
        self.index += 1;
        self.remaining = self.remaining.saturating_sub(1);
        self.load(0)
    }
}
