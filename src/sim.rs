//! Simulated hardware for host-side verification.
//!
//! Everything here shares one [`SimClock`]. Reading a counter value costs
//! `poll_cost` cycles; pin writes and flag reads are free. With the default
//! cost of one cycle the bit loop lands on every deadline exactly, so pulse
//! widths can be asserted to the cycle.
//!
//! ```ignore
//! let clock = SimClock::new();
//! let mut pin = SimPin::<256>::new(&clock);
//! let mut cycles = ReloadCounter::new(SimSysTick::new(&clock, 48_000_000));
//! ```

use core::cell::Cell;

use heapless::Vec;

use crate::hal::{DataPin, FreeRunningCounter, PeriodicTimer, TimeBase, TimerControl};

/// Shared simulated core clock
#[derive(Debug)]
pub struct SimClock {
    now: Cell<u64>,
    poll_cost: u64,
}

impl SimClock {
    pub const fn new() -> Self {
        Self::with_poll_cost(1)
    }

    /// Clock where every counter read costs `poll_cost` cycles (at least 1)
    pub const fn with_poll_cost(poll_cost: u64) -> Self {
        Self {
            now: Cell::new(0),
            poll_cost: if poll_cost == 0 { 1 } else { poll_cost },
        }
    }

    /// Cycles since the simulation started
    pub fn now(&self) -> u64 {
        self.now.get()
    }

    /// Let `cycles` cycles pass
    pub fn advance(&self, cycles: u64) {
        self.now.set(self.now.get() + cycles);
    }

    /// Charge one counter read, returning the time it was taken at
    fn sample(&self) -> u64 {
        let now = self.now.get();
        self.advance(self.poll_cost);
        now
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

/// SysTick-like 24-bit periodic down-counter
#[derive(Debug)]
pub struct SimSysTick<'a> {
    clock: &'a SimClock,
    reload: u32,
    control: TimerControl,
    /// Clock time at which the counter last restarted from 0
    started_at: Option<u64>,
    wraps_seen: u64,
}

impl<'a> SimSysTick<'a> {
    /// Timer configured as a 1 kHz tick source for a core running at `cpu_hz`
    pub fn new(clock: &'a SimClock, cpu_hz: u32) -> Self {
        Self {
            clock,
            reload: (cpu_hz / 1000).saturating_sub(1),
            control: TimerControl {
                enabled: true,
                core_clock: true,
                interrupt: true,
            },
            started_at: Some(clock.now()),
            wraps_seen: 0,
        }
    }

    /// Current control bits
    pub const fn control_bits(&self) -> TimerControl {
        self.control
    }

    /// Current reload value
    pub const fn reload_value(&self) -> u32 {
        self.reload
    }

    fn elapsed(&self, at: u64) -> Option<u64> {
        self.started_at.map(|start| at - start)
    }

    fn period(&self) -> u64 {
        u64::from(self.reload) + 1
    }

    #[allow(clippy::cast_possible_truncation)]
    fn value_at(&self, at: u64) -> u32 {
        match self.elapsed(at) {
            None | Some(0) => 0,
            Some(elapsed) => self.reload - ((elapsed - 1) % self.period()) as u32,
        }
    }

    fn wraps_at(&self, at: u64) -> u64 {
        self.elapsed(at).map_or(0, |elapsed| elapsed / self.period())
    }
}

impl PeriodicTimer for SimSysTick<'_> {
    const MAX_RELOAD: u32 = 0x00FF_FFFF;

    fn reload(&mut self) -> u32 {
        self.reload
    }

    fn set_reload(&mut self, reload: u32) {
        self.reload = reload & Self::MAX_RELOAD;
    }

    fn current(&mut self) -> u32 {
        let at = self.clock.sample();
        self.value_at(at)
    }

    fn clear_current(&mut self) {
        self.started_at = self.control.enabled.then(|| self.clock.now());
        self.wraps_seen = 0;
    }

    fn has_wrapped(&mut self) -> bool {
        let wraps = self.wraps_at(self.clock.now());
        let wrapped = wraps > self.wraps_seen;
        self.wraps_seen = wraps;
        wrapped
    }

    fn control(&mut self) -> TimerControl {
        self.control
    }

    fn set_control(&mut self, control: TimerControl) {
        if control.enabled && !self.control.enabled {
            self.started_at = Some(self.clock.now());
            self.wraps_seen = 0;
        } else if !control.enabled {
            self.started_at = None;
        }
        self.control = control;
    }
}

/// Free-running 32-bit up-counter (DWT `CYCCNT` style)
#[derive(Debug)]
pub struct SimCycleCounter<'a> {
    clock: &'a SimClock,
    available: bool,
    running: bool,
}

impl<'a> SimCycleCounter<'a> {
    pub const fn new(clock: &'a SimClock) -> Self {
        Self {
            clock,
            available: true,
            running: false,
        }
    }

    /// A part without a cycle counter
    pub const fn missing(clock: &'a SimClock) -> Self {
        Self {
            clock,
            available: false,
            running: false,
        }
    }

    pub const fn is_running(&self) -> bool {
        self.running
    }
}

impl FreeRunningCounter for SimCycleCounter<'_> {
    fn is_available(&self) -> bool {
        self.available
    }

    #[allow(clippy::cast_possible_truncation)]
    fn count(&mut self) -> u32 {
        self.clock.sample() as u32
    }

    fn enable(&mut self) -> bool {
        let was_running = self.running;
        self.running = true;
        was_running
    }

    fn disable(&mut self) {
        self.running = false;
    }
}

/// One recorded pin transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// Clock time of the transition
    pub at: u64,
    pub high: bool,
}

/// One high pulse and the low time that followed it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pulse {
    /// Clock time of the rising edge
    pub rise: u64,
    /// Cycles spent high
    pub high: u64,
    /// Cycles spent low before the next rising edge, `None` for the last pulse
    pub low: Option<u64>,
}

impl Pulse {
    /// Rising edge to next rising edge
    pub fn period(&self) -> Option<u64> {
        self.low.map(|low| self.high + low)
    }

    /// Level seen by a chip sampling `offset` cycles after the rising edge
    pub const fn sample(&self, offset: u64) -> bool {
        offset < self.high
    }
}

/// Output pin recording up to `N` transitions
#[derive(Debug)]
pub struct SimPin<'a, const N: usize> {
    clock: &'a SimClock,
    level: bool,
    output: bool,
    edges: Vec<Edge, N>,
    overflowed: bool,
}

impl<'a, const N: usize> SimPin<'a, N> {
    pub const fn new(clock: &'a SimClock) -> Self {
        Self {
            clock,
            level: false,
            output: false,
            edges: Vec::new(),
            overflowed: false,
        }
    }

    pub const fn is_output(&self) -> bool {
        self.output
    }

    pub const fn is_high(&self) -> bool {
        self.level
    }

    /// More than `N` transitions happened and some were dropped
    pub const fn overflowed(&self) -> bool {
        self.overflowed
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Forget recorded transitions
    pub fn reset(&mut self) {
        self.edges.clear();
        self.overflowed = false;
    }

    /// Recorded high pulses, in order
    pub fn pulses(&self) -> impl Iterator<Item = Pulse> + '_ {
        let rises = self.edges.iter().enumerate().filter(|(_, edge)| edge.high);
        rises.filter_map(move |(index, rise)| {
            let fall = self.edges[index + 1..].iter().find(|edge| !edge.high)?;
            let next_rise = self.edges[index + 1..].iter().find(|edge| edge.high);
            Some(Pulse {
                rise: rise.at,
                high: fall.at - rise.at,
                low: next_rise.map(|next| next.at - fall.at),
            })
        })
    }

    fn record(&mut self, high: bool) {
        if self.level == high {
            return;
        }
        self.level = high;
        let edge = Edge {
            at: self.clock.now(),
            high,
        };
        if self.edges.push(edge).is_err() {
            self.overflowed = true;
        }
    }
}

impl<const N: usize> DataPin for SimPin<'_, N> {
    fn set_output_mode(&mut self) {
        self.output = true;
    }

    fn set_high(&mut self) {
        self.record(true);
    }

    fn set_low(&mut self) {
        self.record(false);
    }
}

/// Tick counter standing in for the platform's millisecond clock
#[derive(Debug, Clone)]
pub struct SimTimeBase {
    tick_hz: u32,
    ticks: u64,
    advances: u32,
}

impl SimTimeBase {
    pub const fn new(tick_hz: u32) -> Self {
        Self {
            tick_hz,
            ticks: 0,
            advances: 0,
        }
    }

    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Number of `advance` calls
    pub const fn advances(&self) -> u32 {
        self.advances
    }
}

impl TimeBase for SimTimeBase {
    fn tick_hz(&self) -> u32 {
        self.tick_hz
    }

    fn advance(&mut self, ticks: u32) {
        self.ticks += u64::from(ticks);
        self.advances += 1;
    }
}
