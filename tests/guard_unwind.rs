//! Kept in its own test binary: the panic below unwinds through a critical
//! section.

mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use myrtio_clockless::hal::ReloadCounter;
    use myrtio_clockless::sim::{SimClock, SimSysTick, SimTimeBase};
    use myrtio_clockless::{BitTiming, FrameBudget, TickConverter, with_clock};

    #[test]
    fn test_guard_restores_timer_on_panic() {
        let clock = SimClock::new();
        let mut cycles = ReloadCounter::new(SimSysTick::new(&clock, 1_000_000));
        let mut time_base = SimTimeBase::new(1000);
        let mut converter = TickConverter::new(1_000_000, 1000).unwrap();
        // 10 us bits, long enough to stand still for a while without a wrap
        let period = BitTiming::new(3000, 4000, 3000).validate().unwrap();

        let result = catch_unwind(AssertUnwindSafe(|| {
            with_clock(
                &mut cycles,
                &mut time_base,
                &mut converter,
                FrameBudget::new(100, 8, period),
                |cycles| {
                    clock.advance(2_500);
                    if cycles.is_claimed() {
                        panic!("frame aborted");
                    }
                },
            )
        }));

        assert!(result.is_err());
        assert!(!cycles.is_claimed());
        assert_eq!(cycles.timer().reload_value(), 999);
        assert!(cycles.timer().control_bits().interrupt);
        // the 2.5 ms spent before the panic is still credited
        assert_eq!(time_base.ticks(), 2);
    }
}
