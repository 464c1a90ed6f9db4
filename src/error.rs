use core::fmt;

/// Configuration problems detected before any frame is sent.
///
/// None of these can happen once a controller has been built: the timing
/// path itself has no error channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Phase one or two is zero cycles long once the adjustment is applied
    ZeroPhase,
    /// The low tail of a `1` bit (`t3 + adjust`) is zero cycles long
    NoTailMargin,
    /// The bit period does not fit in 32 bits
    PeriodOverflow,
    /// The cycle source cannot count a full bit period
    PeriodTooLong {
        /// Requested period in cycles
        period: u32,
        /// Longest period the source supports
        max: u32,
    },
    /// More than 8 padding bits per byte were requested
    TooManyExtraBits(u8),
    /// Core clock or tick rate is zero
    ZeroClock,
    /// The platform has no usable cycle counter
    NoCycleCounter,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroPhase => f.write_str("bit phase of zero cycles"),
            Self::NoTailMargin => f.write_str("no low tail left after the high phases"),
            Self::PeriodOverflow => f.write_str("bit period overflows u32"),
            Self::PeriodTooLong { period, max } => {
                write!(f, "bit period of {period} cycles exceeds counter maximum {max}")
            }
            Self::TooManyExtraBits(bits) => write!(f, "{bits} padding bits per byte (max 8)"),
            Self::ZeroClock => f.write_str("clock or tick rate of zero"),
            Self::NoCycleCounter => f.write_str("no cycle counter available"),
        }
    }
}
