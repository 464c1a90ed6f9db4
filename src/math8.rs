//! 8-bit channel arithmetic used by the pixel pipeline.

/// Scale an 8-bit value by a factor (0-255 = 0.0-1.0)
///
/// Uses integer math for efficiency on embedded systems.
/// `scale8(255, 255) == 255`, `scale8(x, 0) == 0`.
#[inline]
#[allow(clippy::cast_lossless, clippy::cast_possible_truncation)]
pub const fn scale8(value: u8, scale: u8) -> u8 {
    ((value as u16 * (1 + scale as u16)) >> 8) as u8
}

/// Saturating add of two 8-bit values
#[inline]
pub const fn qadd8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

/// Reverse the bit order of a byte
#[inline]
pub const fn reverse8(value: u8) -> u8 {
    value.reverse_bits()
}
