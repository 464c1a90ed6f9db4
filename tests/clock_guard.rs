mod tests {
    use myrtio_clockless::hal::{
        CycleSource, PeriodicTimer, ReloadCounter, TickCounter, TimerControl, UpCounter,
    };
    use myrtio_clockless::sim::{SimClock, SimCycleCounter, SimPin, SimSysTick, SimTimeBase};
    use myrtio_clockless::{
        BitTiming, BitWriter, ClocklessController, ConfigError, ControllerConfig, DitherMode,
        Duration, FULL_SCALE, FrameBudget, Rgb, TickConverter, with_clock,
    };

    const CPU_HZ: u32 = 1_000_000;
    const TICK_HZ: u32 = 1000;

    fn config() -> ControllerConfig {
        ControllerConfig {
            dither: DitherMode::Disabled,
            min_interval: Duration::from_ticks(0),
            ..ControllerConfig::new(BitTiming::new(3, 4, 3), CPU_HZ)
        }
    }

    #[test]
    fn test_frame_budget() {
        let period = BitTiming::new(3, 4, 3).validate().unwrap();

        let budget = FrameBudget::new(10, 8, period);
        assert_eq!(budget.bits_per_pixel(), 24);
        assert_eq!(budget.cycles(), 2400);

        let padded = FrameBudget::new(10, 10, period);
        assert_eq!(padded.cycles(), 3000);
    }

    #[test]
    fn test_tick_converter_carries_remainder() {
        let mut converter = TickConverter::new(CPU_HZ, TICK_HZ).unwrap();

        assert_eq!(converter.ticks_for(2400), 2);
        assert_eq!(converter.ticks_for(2400), 2);
        assert_eq!(converter.ticks_for(2400), 3);
        assert_eq!(converter.ticks_for(800), 1);
        assert_eq!(converter.ticks_for(0), 0);
        assert_eq!(converter.ticks_for(999), 0);
        assert_eq!(converter.ticks_for(1), 1);
    }

    #[test]
    fn test_tick_converter_rejects_zero_clock() {
        assert_eq!(
            TickConverter::new(0, TICK_HZ).unwrap_err(),
            ConfigError::ZeroClock
        );
        assert_eq!(
            TickConverter::new(CPU_HZ, 0).unwrap_err(),
            ConfigError::ZeroClock
        );
    }

    #[test]
    fn test_ticks_replayed_per_frame() {
        let clock = SimClock::new();
        let mut controller = ClocklessController::new(
            SimPin::<4096>::new(&clock),
            ReloadCounter::new(SimSysTick::new(&clock, CPU_HZ)),
            SimTimeBase::new(TICK_HZ),
            &config(),
        )
        .unwrap();

        // 25 pixels * 24 bits * 10 cycles = 6 ms at 1 MHz
        let pixels = [Rgb::new(1, 2, 3); 25];
        controller.show(&pixels, FULL_SCALE);
        assert_eq!(controller.time_base().ticks(), 6);
        assert_eq!(controller.time_base().advances(), 1);
    }

    #[test]
    fn test_ticks_track_wire_time_across_frames() {
        let clock = SimClock::new();
        let mut controller = ClocklessController::new(
            SimPin::<1024>::new(&clock),
            ReloadCounter::new(SimSysTick::new(&clock, CPU_HZ)),
            SimTimeBase::new(TICK_HZ),
            &config(),
        )
        .unwrap();

        let pixels = [Rgb::new(0, 0, 0); 10];
        let mut wire_cycles = 0u64;
        for _ in 0..7 {
            let start = clock.now();
            controller.show(&pixels, FULL_SCALE);
            wire_cycles += clock.now() - start;
        }

        let expected = wire_cycles * u64::from(TICK_HZ) / u64::from(CPU_HZ);
        let ticks = controller.time_base().ticks();
        assert!(ticks.abs_diff(expected) <= 1, "{ticks} ticks, {expected} expected");
        // 7 * 2400 cycles
        assert_eq!(ticks, 16);
    }

    #[test]
    fn test_systick_restored_after_frame() {
        let clock = SimClock::new();
        let systick = SimSysTick::new(&clock, CPU_HZ);
        let reload = systick.reload_value();
        let control = systick.control_bits();
        assert_eq!(reload, 999);

        let mut controller = ClocklessController::new(
            SimPin::<1024>::new(&clock),
            ReloadCounter::new(systick),
            SimTimeBase::new(TICK_HZ),
            &config(),
        )
        .unwrap();
        controller.show(&[Rgb::new(255, 255, 255); 4], FULL_SCALE);
        assert!(!controller.cycles().is_claimed());

        let (_, cycles, _) = controller.free();
        let systick = cycles.into_inner();
        assert_eq!(systick.reload_value(), reload);
        assert_eq!(systick.control_bits(), control);
    }

    #[test]
    fn test_timer_reprogrammed_while_claimed() {
        let clock = SimClock::new();
        let mut cycles = ReloadCounter::new(SimSysTick::new(&clock, CPU_HZ));
        let mut time_base = SimTimeBase::new(TICK_HZ);
        let mut converter = TickConverter::new(CPU_HZ, TICK_HZ).unwrap();
        let period = BitTiming::new(3, 4, 3).validate().unwrap();

        let seen = with_clock(
            &mut cycles,
            &mut time_base,
            &mut converter,
            FrameBudget::new(50, 8, period),
            |cycles| {
                let timer = cycles.timer();
                (timer.reload_value(), timer.control_bits())
            },
        );

        assert_eq!(
            seen,
            (
                9,
                TimerControl {
                    enabled: true,
                    core_clock: true,
                    interrupt: false,
                }
            )
        );
        assert!(!cycles.is_claimed());
        assert_eq!(cycles.timer().reload_value(), 999);
        assert!(cycles.timer().control_bits().interrupt);
        // nothing went on the wire, so no tick was lost
        assert_eq!(time_base.ticks(), 0);
    }

    #[test]
    fn test_release_reports_lost_tick_progress() {
        let clock = SimClock::new();
        let mut cycles = ReloadCounter::new(SimSysTick::new(&clock, CPU_HZ));

        // 300 cycles into the 1000 cycle tick period
        clock.advance(300);
        cycles.claim(10);
        for _ in 0..50 {
            cycles.now();
        }
        let lost = cycles.release().expect("timer was claimed");

        // everything from the last tick up to the restart, give or take the
        // cost of the counter reads
        let since_tick = u32::try_from(clock.now()).unwrap();
        assert!(lost.abs_diff(since_tick) <= 2, "{lost} lost, {since_tick} elapsed");
        assert_eq!(cycles.release(), None);
    }

    #[test]
    fn test_up_counter_leaves_ticks_to_budget() {
        let clock = SimClock::new();
        let mut cycles = UpCounter::new(SimCycleCounter::new(&clock));

        cycles.claim(10);
        clock.advance(5000);
        assert_eq!(cycles.release(), None);
    }

    #[test]
    fn test_tick_count_survives_frequent_frames() {
        let clock = SimClock::new();
        let mut pin = SimPin::<64>::new(&clock);
        let mut cycles = ReloadCounter::new(SimSysTick::new(&clock, CPU_HZ));
        let mut time_base = SimTimeBase::new(TICK_HZ);
        let mut converter = TickConverter::new(CPU_HZ, TICK_HZ).unwrap();
        let period = BitTiming::new(3, 4, 3).validate().unwrap();

        let mut interrupts = 0u64;
        for frame in 0..100u64 {
            // idle with the tick interrupt live, mostly shorter than a tick
            clock.advance(300 + (frame * 373) % 1200);
            if cycles.timer().has_wrapped() {
                interrupts += 1;
            }

            // one pixel, 240 cycles on the wire
            with_clock(
                &mut cycles,
                &mut time_base,
                &mut converter,
                FrameBudget::new(1, 8, period),
                |cycles| {
                    let mut writer = BitWriter::new(&mut pin, cycles, period);
                    for byte in [0x12, 0x34, 0x56] {
                        writer.write_bits(8, byte);
                    }
                    writer.finish();
                },
            );
            pin.reset();
        }

        let true_ticks = clock.now() / u64::from(CPU_HZ / TICK_HZ);
        let counted = interrupts + time_base.ticks();
        assert!(
            counted.abs_diff(true_ticks) <= 1,
            "{counted} ticks counted, {true_ticks} elapsed"
        );
    }

    #[test]
    fn test_short_frame_defers_ticks() {
        let clock = SimClock::new();
        let mut controller = ClocklessController::new(
            SimPin::<1024>::new(&clock),
            ReloadCounter::new(SimSysTick::new(&clock, CPU_HZ)),
            SimTimeBase::new(TICK_HZ),
            &config(),
        )
        .unwrap();

        // 240 cycles, well below one tick
        controller.show(&[Rgb::new(1, 1, 1)], FULL_SCALE);
        assert_eq!(controller.time_base().ticks(), 0);
        assert_eq!(controller.time_base().advances(), 0);

        for _ in 0..4 {
            controller.show(&[Rgb::new(1, 1, 1)], FULL_SCALE);
        }
        // five frames of about 250 cycles each
        assert_eq!(controller.time_base().ticks(), 1);
    }

    #[test]
    fn test_shared_tick_counter() {
        let clock = SimClock::new();
        let counter = TickCounter::new(TICK_HZ);
        counter.on_tick();

        let mut controller = ClocklessController::new(
            SimPin::<4096>::new(&clock),
            UpCounter::new(SimCycleCounter::new(&clock)),
            &counter,
            &config(),
        )
        .unwrap();
        controller.show(&[Rgb::new(0, 0, 0); 50], FULL_SCALE);

        assert_eq!(counter.now(), 13);
    }

    #[test]
    fn test_config_errors() {
        let clock = SimClock::new();

        let too_long = ControllerConfig::new(BitTiming::new(0x0080_0000, 0x0080_0000, 1), CPU_HZ);
        let result = ClocklessController::new(
            SimPin::<16>::new(&clock),
            ReloadCounter::new(SimSysTick::new(&clock, CPU_HZ)),
            SimTimeBase::new(TICK_HZ),
            &too_long,
        );
        assert_eq!(
            result.err(),
            Some(ConfigError::PeriodTooLong {
                period: 0x0100_0001,
                max: 0x0100_0000,
            })
        );

        let result = ClocklessController::new(
            SimPin::<16>::new(&clock),
            UpCounter::new(SimCycleCounter::missing(&clock)),
            SimTimeBase::new(TICK_HZ),
            &config(),
        );
        assert_eq!(result.err(), Some(ConfigError::NoCycleCounter));

        let result = ClocklessController::new(
            SimPin::<16>::new(&clock),
            ReloadCounter::new(SimSysTick::new(&clock, CPU_HZ)),
            SimTimeBase::new(0),
            &config(),
        );
        assert_eq!(result.err(), Some(ConfigError::ZeroClock));

        let padded = ControllerConfig {
            extra_bits: 9,
            ..config()
        };
        let result = ClocklessController::new(
            SimPin::<16>::new(&clock),
            ReloadCounter::new(SimSysTick::new(&clock, CPU_HZ)),
            SimTimeBase::new(TICK_HZ),
            &padded,
        );
        assert_eq!(result.err(), Some(ConfigError::TooManyExtraBits(9)));
    }
}
