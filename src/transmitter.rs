//! Frame transmitter.

use crate::engine::BitWriter;
use crate::hal::{CycleSource, DataPin};
use crate::pixels::PixelSource;

/// Stream every pixel of `source` through `writer`, in source order.
///
/// Each byte is loaded right after the previous one has been handed to the
/// writer, so the load runs during the last bit's low tail and bytes follow
/// each other with no idle gap. An empty source never touches the pin.
pub fn transmit<S, P, C>(source: &mut S, writer: &mut BitWriter<'_, P, C>, bits_per_byte: u8)
where
    S: PixelSource + ?Sized,
    P: DataPin,
    C: CycleSource,
{
    if source.is_empty() {
        return;
    }

    source.pre_step_first_byte_dithering();
    let mut byte = source.load(0);

    while source.has(1) {
        source.step_dithering();

        writer.write_bits(bits_per_byte, byte);
        byte = source.load(1);

        writer.write_bits(bits_per_byte, byte);
        byte = source.load(2);

        writer.write_bits(bits_per_byte, byte);
        byte = source.advance_and_load_first();
    }

    writer.finish();
}
