use embedded_hal::digital::OutputPin;

use super::DataPin;

/// [`DataPin`] over any `embedded-hal` output pin.
///
/// Pin errors are discarded: there is no way to report them from inside
/// the bit loop, and GPIO writes on the supported parts are infallible.
pub struct HalPin<P: OutputPin>(P);

impl<P: OutputPin> HalPin<P> {
    pub const fn new(pin: P) -> Self {
        Self(pin)
    }

    pub fn into_inner(self) -> P {
        self.0
    }
}

impl<P: OutputPin> DataPin for HalPin<P> {
    /// `embedded-hal` pins are already outputs by type, so this only parks
    /// the line low.
    fn set_output_mode(&mut self) {
        self.0.set_low().ok();
    }

    #[inline(always)]
    fn set_high(&mut self) {
        self.0.set_high().ok();
    }

    #[inline(always)]
    fn set_low(&mut self) {
        self.0.set_low().ok();
    }
}
