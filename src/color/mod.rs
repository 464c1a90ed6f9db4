mod order;

pub use order::ColorOrder;
use smart_leds::RGB8;

pub type Rgb = RGB8;

/// Channel value of `color` at raw index `index` (0 = red, 1 = green, 2 = blue)
#[inline]
pub(crate) const fn channel(color: Rgb, index: usize) -> u8 {
    match index {
        0 => color.r,
        1 => color.g,
        _ => color.b,
    }
}
