#![no_std]

//! Bit-banged driver for clockless (WS2812-class) LED strips.
//!
//! A frame goes through four stages:
//!
//! 1. [`RateLimiter`] waits out the strip's latch time
//! 2. [`ClockGuard`] masks interrupts and borrows a timer as cycle counter
//! 3. [`transmit`] streams pixel bytes through the [`BitWriter`]
//! 4. the guard restores the timer and replays the lost time-base ticks
//!
//! [`ClocklessController`] ties them together for one pin.

pub(crate) mod fmt;

pub mod clock_guard;
pub mod color;
pub mod controller;
pub mod engine;
pub mod error;
pub mod hal;
pub mod math8;
pub mod pixels;
pub mod rate_limiter;
pub mod sim;
pub mod timing;
pub mod transmitter;

pub use clock_guard::{ClockGuard, FrameBudget, TickConverter, with_clock};
pub use controller::{ClocklessController, ControllerConfig, FULL_SCALE};
pub use engine::BitWriter;
pub use error::ConfigError;
pub use pixels::{DitherMode, DitherState, PixelController, PixelSource};
pub use rate_limiter::RateLimiter;
pub use timing::{BitPeriod, BitTiming, chipset};
pub use transmitter::transmit;

pub use color::{ColorOrder, Rgb};
pub use embassy_time::{Duration, Instant};

/// Abstract LED driver trait
///
/// Implement this trait to support different hardware platforms.
/// Renderers producing whole frames are generic over it.
pub trait OutputDriver {
    /// Write colors to the LED strip
    fn write(&mut self, colors: &[Rgb]);
}
