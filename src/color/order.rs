/// Order in which a chip expects the three colour channels on the wire.
///
/// Most WS2812 parts want [`ColorOrder::Grb`]; WS2811 drivers are usually
/// wired [`ColorOrder::Rgb`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorOrder {
    #[default]
    Rgb,
    Rbg,
    Grb,
    Gbr,
    Brg,
    Bgr,
}

impl ColorOrder {
    /// Raw channel index (0 = red, 1 = green, 2 = blue) sent in each wire slot
    pub const fn slots(self) -> [usize; 3] {
        match self {
            Self::Rgb => [0, 1, 2],
            Self::Rbg => [0, 2, 1],
            Self::Grb => [1, 0, 2],
            Self::Gbr => [1, 2, 0],
            Self::Brg => [2, 0, 1],
            Self::Bgr => [2, 1, 0],
        }
    }

    /// Raw channel index sent in wire slot `slot`
    #[inline]
    pub const fn slot(self, slot: usize) -> usize {
        self.slots()[slot]
    }
}
