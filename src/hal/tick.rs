use core::cell::Cell;

use critical_section::Mutex;

use super::TimeBase;

/// Interrupt-safe tick counter for boards that keep their own millisecond
/// clock in the timer interrupt.
///
/// Call [`TickCounter::on_tick`] from the periodic timer's interrupt handler
/// and hand `&TICKS` to the controller as its [`TimeBase`].
///
/// ```ignore
/// static TICKS: TickCounter = TickCounter::new(1000);
///
/// #[exception]
/// fn SysTick() {
///     TICKS.on_tick();
/// }
/// ```
pub struct TickCounter {
    tick_hz: u32,
    ticks: Mutex<Cell<u32>>,
}

impl TickCounter {
    pub const fn new(tick_hz: u32) -> Self {
        Self {
            tick_hz,
            ticks: Mutex::new(Cell::new(0)),
        }
    }

    /// Count one tick
    pub fn on_tick(&self) {
        self.add(1);
    }

    /// Ticks counted so far (wrapping)
    pub fn now(&self) -> u32 {
        critical_section::with(|cs| self.ticks.borrow(cs).get())
    }

    fn add(&self, ticks: u32) {
        critical_section::with(|cs| {
            let cell = self.ticks.borrow(cs);
            cell.set(cell.get().wrapping_add(ticks));
        });
    }
}

impl TimeBase for &TickCounter {
    fn tick_hz(&self) -> u32 {
        self.tick_hz
    }

    fn advance(&mut self, ticks: u32) {
        self.add(ticks);
    }
}
