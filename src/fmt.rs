//! Internal logging macros.
//!
//! Routes to `esp_println` with the `esp32-log` feature, to `defmt` with the
//! `defmt` feature, and compiles to nothing otherwise. Never call these from
//! inside a frame: the critical section has no time budget for formatting.

#![allow(unused_macros)]

macro_rules! debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "esp32-log")]
        esp_println::println!($($arg)*);
        #[cfg(all(feature = "defmt", not(feature = "esp32-log")))]
        defmt::debug!($($arg)*);
        #[cfg(not(any(feature = "defmt", feature = "esp32-log")))]
        {
            let _ = ($($arg)*);
        }
    }};
}

macro_rules! trace {
    ($($arg:tt)*) => {{
        #[cfg(all(feature = "defmt", not(feature = "esp32-log")))]
        defmt::trace!($($arg)*);
        #[cfg(not(all(feature = "defmt", not(feature = "esp32-log"))))]
        {
            let _ = ($($arg)*);
        }
    }};
}

pub(crate) use debug;
pub(crate) use trace;
