use embassy_time::Duration;

use crate::OutputDriver;
use crate::clock_guard::{FrameBudget, TickConverter, with_clock};
use crate::color::{ColorOrder, Rgb};
use crate::engine::BitWriter;
use crate::error::ConfigError;
use crate::fmt::{debug, trace};
use crate::hal::{CycleSource, DataPin, TimeBase};
use crate::pixels::{DitherMode, DitherState, PixelController, PixelSource};
use crate::rate_limiter::{DEFAULT_MIN_INTERVAL, RateLimiter};
use crate::timing::{BitPeriod, BitTiming};
use crate::transmitter::transmit;

/// Most padding bits that may follow each byte
pub const MAX_EXTRA_BITS: u8 = 8;

/// Full scale on every channel
pub const FULL_SCALE: Rgb = Rgb {
    r: 255,
    g: 255,
    b: 255,
};

/// Configuration for a clockless controller
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Phase durations in core cycles
    pub timing: BitTiming,
    /// Channel order the chip expects
    pub color_order: ColorOrder,
    /// Minimum idle time between frames
    pub min_interval: Duration,
    /// Zero bits appended to every byte, for chips that need a longer word
    pub extra_bits: u8,
    pub dither: DitherMode,
    /// Core clock in hertz, used to replay time-base ticks
    pub cpu_hz: u32,
}

impl ControllerConfig {
    pub const fn new(timing: BitTiming, cpu_hz: u32) -> Self {
        Self {
            timing,
            color_order: ColorOrder::Rgb,
            min_interval: DEFAULT_MIN_INTERVAL,
            extra_bits: 0,
            dither: DitherMode::Binary,
            cpu_hz,
        }
    }
}

/// Clockless LED controller - the main orchestrator
///
/// Owns the data pin, the cycle source and the time base. Each frame is
/// rate limited, then sent with interrupts masked and the cycle source
/// claimed; the time base is caught up before interrupts come back.
pub struct ClocklessController<P: DataPin, C: CycleSource, B: TimeBase> {
    // Hardware
    pin: P,
    cycles: C,
    time_base: B,

    // Configuration
    period: BitPeriod,
    bits_per_byte: u8,
    color_order: ColorOrder,
    dither_mode: DitherMode,

    // State carried across frames
    dither: DitherState,
    limiter: RateLimiter,
    ticks: TickConverter,
}

impl<P: DataPin, C: CycleSource, B: TimeBase> ClocklessController<P, C, B> {
    /// Validate `config` against the hardware and take ownership of it.
    ///
    /// Every configuration problem is reported here; sending a frame cannot
    /// fail afterwards.
    pub fn new(
        mut pin: P,
        cycles: C,
        time_base: B,
        config: &ControllerConfig,
    ) -> Result<Self, ConfigError> {
        let period = config.timing.validate()?;
        if config.extra_bits > MAX_EXTRA_BITS {
            return Err(ConfigError::TooManyExtraBits(config.extra_bits));
        }
        cycles.check_period(period.total())?;
        let ticks = TickConverter::new(config.cpu_hz, time_base.tick_hz())?;

        pin.set_output_mode();
        pin.set_low();

        debug!(
            "[ClocklessController.new] bit period {} cycles ({}/{}/{})",
            period.total(),
            period.phase1(),
            period.phase2(),
            period.phase3()
        );

        Ok(Self {
            pin,
            cycles,
            time_base,
            period,
            bits_per_byte: 8 + config.extra_bits,
            color_order: config.color_order,
            dither_mode: config.dither,
            dither: DitherState::new(),
            limiter: RateLimiter::new(config.min_interval),
            ticks,
        })
    }

    /// Send `pixels`, each channel scaled by the matching channel of `scale`
    pub fn show(&mut self, pixels: &[Rgb], scale: Rgb) {
        let mut source = PixelController::new(
            pixels,
            scale,
            self.color_order,
            self.dither_mode,
            &mut self.dither,
        );
        self.send(&mut source);
    }

    /// Send `color` to the first `count` LEDs
    pub fn show_color(&mut self, color: Rgb, count: usize, scale: Rgb) {
        let mut source = PixelController::solid(
            color,
            count,
            scale,
            self.color_order,
            self.dither_mode,
            &mut self.dither,
        );
        self.send(&mut source);
    }

    /// Turn the first `count` LEDs off
    pub fn clear(&mut self, count: usize) {
        self.show_color(Rgb::default(), count, Rgb::default());
    }

    /// Send any pixel source as one frame.
    ///
    /// An empty source is skipped entirely: no rate limiting, no critical
    /// section, no pin activity.
    pub fn send<S: PixelSource + ?Sized>(&mut self, source: &mut S) {
        let pixels = source.len();
        if pixels == 0 {
            return;
        }

        self.limiter.wait();

        let budget = FrameBudget::new(pixels, self.bits_per_byte, self.period);
        let pin = &mut self.pin;
        let period = self.period;
        let bits_per_byte = self.bits_per_byte;
        with_clock(
            &mut self.cycles,
            &mut self.time_base,
            &mut self.ticks,
            budget,
            |cycles| {
                let mut writer = BitWriter::new(pin, cycles, period);
                transmit(source, &mut writer, bits_per_byte);
            },
        );

        self.limiter.mark();
        trace!("[ClocklessController.send] {} pixels", pixels);
    }

    /// Validated bit period
    pub const fn period(&self) -> BitPeriod {
        self.period
    }

    /// Bits sent per channel byte, padding included
    pub const fn bits_per_byte(&self) -> u8 {
        self.bits_per_byte
    }

    pub fn pin(&self) -> &P {
        &self.pin
    }

    pub fn cycles(&self) -> &C {
        &self.cycles
    }

    pub fn time_base(&self) -> &B {
        &self.time_base
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Give the hardware back
    pub fn free(self) -> (P, C, B) {
        (self.pin, self.cycles, self.time_base)
    }
}

impl<P: DataPin, C: CycleSource, B: TimeBase> OutputDriver for ClocklessController<P, C, B> {
    fn write(&mut self, colors: &[Rgb]) {
        self.show(colors, FULL_SCALE);
    }
}
