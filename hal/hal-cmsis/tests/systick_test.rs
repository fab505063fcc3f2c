//! SysTick driver tests against the in-memory register file

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use embedded_hal::delay::DelayNs;
use hal::{FakeRegisters, HalError, PeriodicTimer, TimerMode, TimerState};
use hal_cmsis::regs::systick::{
    CTRL, CTRL_CLK_SRC, CTRL_COUNT, CTRL_ENABLE, CTRL_INTEN, CURRENT, MAX_RELOAD, RELOAD,
};
use hal_cmsis::{SysTickConfig, SysTickDelay, SystemTimer};

fn timer(regs: &FakeRegisters) -> SystemTimer<&FakeRegisters> {
    SystemTimer::new(regs, SysTickConfig::new())
}

fn ticks_per_ms() -> u32 {
    SysTickConfig::new().ticks_per_ms()
}

#[test]
fn init_programs_reload_and_enables_interrupt_mode() {
    let regs = FakeRegisters::new();
    regs.set(CURRENT, 1234);
    let systick = timer(&regs);

    systick.init(10).unwrap();

    assert_eq!(regs.get(RELOAD), 10 * ticks_per_ms() - 1);
    assert_eq!(regs.get(CURRENT), 0);
    assert_eq!(regs.get(CTRL), CTRL_ENABLE | CTRL_INTEN | CTRL_CLK_SRC);
    assert_eq!(systick.state(), TimerState::Running(TimerMode::Interrupt));

    systick.init(1).unwrap();
    assert_eq!(systick.reload(), ticks_per_ms() - 1);
}

#[test]
fn reload_follows_configured_clock() {
    let regs = FakeRegisters::new();
    let systick = SystemTimer::new(&regs, SysTickConfig::new().with_core_clock(80_000_000));

    systick.init(2).unwrap();
    assert_eq!(regs.get(RELOAD), 2 * 80_000 - 1);
}

#[test]
fn init_then_deinit_clears_every_register() {
    let regs = FakeRegisters::new();
    let systick = timer(&regs);

    systick.init(5).unwrap();
    systick.deinit();

    assert_eq!(regs.get(CTRL), 0);
    assert_eq!(regs.get(CURRENT), 0);
    assert_eq!(regs.get(RELOAD), 0);
    assert_eq!(systick.state(), TimerState::Uninitialized);
}

#[test]
fn invalid_periods_are_rejected_before_any_write() {
    let regs = FakeRegisters::new();
    let systick = timer(&regs);

    assert_eq!(systick.init(0), Err(HalError::InvalidParameter));
    assert_eq!(systick.start_busy_wait(0), Err(HalError::InvalidParameter));
    assert_eq!(systick.init(60_000), Err(HalError::InvalidParameter));

    assert_eq!(regs.write_count(), 0);
    assert_eq!(systick.state(), TimerState::Uninitialized);
}

#[test]
fn single_tick_period_is_rejected_before_any_write() {
    let regs = FakeRegisters::new();
    let systick = SystemTimer::new(&regs, SysTickConfig::new().with_core_clock(1_000));

    assert_eq!(systick.init(1), Err(HalError::InvalidParameter));
    assert_eq!(systick.start_busy_wait(1), Err(HalError::InvalidParameter));

    assert_eq!(regs.write_count(), 0);
    assert_eq!(regs.get(RELOAD), 0);
    assert_eq!(systick.state(), TimerState::Uninitialized);
}

#[test]
fn stop_and_start_preserve_the_period() {
    let regs = FakeRegisters::new();
    let systick = timer(&regs);
    systick.init(10).unwrap();
    let reload = systick.reload();

    systick.stop();
    assert_eq!(systick.state(), TimerState::Stopped);
    assert_eq!(regs.get(CTRL) & CTRL_ENABLE, 0);
    assert_eq!(systick.reload(), reload);

    regs.set(CURRENT, 777);
    systick.start();
    assert_eq!(systick.state(), TimerState::Running(TimerMode::Interrupt));
    assert_eq!(systick.reload(), reload);
    assert_eq!(systick.current(), 777);
}

#[test]
fn operations_before_init_leave_the_timer_idle() {
    let regs = FakeRegisters::new();
    let systick = timer(&regs);

    systick.stop();
    systick.deinit();
    systick.on_interrupt();

    assert_eq!(regs.get(CTRL), 0);
    assert_eq!(regs.get(RELOAD), 0);
    assert_eq!(systick.state(), TimerState::Uninitialized);
}

#[test]
fn busy_wait_returns_after_count_flag_and_stops() {
    let regs = FakeRegisters::new();
    regs.pulse_on_read(CTRL, CTRL_COUNT, 50);
    let systick = timer(&regs);

    systick.start_busy_wait(3).unwrap();

    assert!(regs.read_count() >= 50);
    assert_eq!(regs.get(CTRL) & CTRL_ENABLE, 0);
    assert_eq!(regs.get(CTRL) & CTRL_INTEN, 0);
    assert_eq!(regs.get(RELOAD), 3 * ticks_per_ms() - 1);
    assert_eq!(systick.state(), TimerState::Stopped);
}

static SINGLE_FIRE: AtomicUsize = AtomicUsize::new(0);

fn count_single_fire() {
    SINGLE_FIRE.fetch_add(1, Ordering::SeqCst);
}

#[test]
fn handler_calls_registered_callback_once() {
    let regs = FakeRegisters::new();
    let systick = timer(&regs);
    systick.init(1).unwrap();
    let writes = regs.write_count();

    systick.set_callback(Some(count_single_fire));
    systick.on_interrupt();

    assert_eq!(SINGLE_FIRE.load(Ordering::SeqCst), 1);
    assert_eq!(regs.write_count(), writes);
}

static CLEARED: AtomicUsize = AtomicUsize::new(0);

fn count_cleared() {
    CLEARED.fetch_add(1, Ordering::SeqCst);
}

#[test]
fn cleared_callback_is_not_dispatched_and_timer_keeps_running() {
    let regs = FakeRegisters::new();
    let systick = timer(&regs);
    systick.init(1).unwrap();

    systick.set_callback(Some(count_cleared));
    systick.set_callback(None);
    systick.on_interrupt();

    assert_eq!(CLEARED.load(Ordering::SeqCst), 0);
    assert!(!systick.has_callback());
    assert_eq!(systick.state(), TimerState::Running(TimerMode::Interrupt));
}

static REPLACED_OLD: AtomicUsize = AtomicUsize::new(0);
static REPLACED_NEW: AtomicUsize = AtomicUsize::new(0);

fn count_replaced_old() {
    REPLACED_OLD.fetch_add(1, Ordering::SeqCst);
}

fn count_replaced_new() {
    REPLACED_NEW.fetch_add(1, Ordering::SeqCst);
}

#[test]
fn only_latest_callback_fires() {
    let regs = FakeRegisters::new();
    let systick = timer(&regs);

    systick.set_callback(Some(count_replaced_old));
    systick.set_callback(Some(count_replaced_new));
    systick.on_interrupt();
    systick.on_interrupt();

    assert_eq!(REPLACED_OLD.load(Ordering::SeqCst), 0);
    assert_eq!(REPLACED_NEW.load(Ordering::SeqCst), 2);
}

static AFTER_DEINIT: AtomicUsize = AtomicUsize::new(0);

fn count_after_deinit() {
    AFTER_DEINIT.fetch_add(1, Ordering::SeqCst);
}

#[test]
fn deinit_keeps_the_registered_callback() {
    let regs = FakeRegisters::new();
    let systick = timer(&regs);
    systick.set_callback(Some(count_after_deinit));
    systick.init(1).unwrap();

    systick.deinit();
    assert!(systick.has_callback());

    systick.init(1).unwrap();
    systick.on_interrupt();
    assert_eq!(AFTER_DEINIT.load(Ordering::SeqCst), 1);
}

static RACE_A: AtomicUsize = AtomicUsize::new(0);
static RACE_B: AtomicUsize = AtomicUsize::new(0);

fn count_race_a() {
    RACE_A.fetch_add(1, Ordering::SeqCst);
}

fn count_race_b() {
    RACE_B.fetch_add(1, Ordering::SeqCst);
}

#[test]
fn handler_sees_whole_callbacks_while_foreground_swaps_them() {
    const FIRES: usize = 10_000;

    let regs = FakeRegisters::new();
    let systick = timer(&regs);
    systick.set_callback(Some(count_race_a));

    thread::scope(|s| {
        let handler = s.spawn(|| {
            for _ in 0..FIRES {
                systick.on_interrupt();
            }
        });
        let mut flip = false;
        while !handler.is_finished() {
            let next: fn() = if flip { count_race_a } else { count_race_b };
            systick.set_callback(Some(next));
            flip = !flip;
        }
    });

    let total = RACE_A.load(Ordering::SeqCst) + RACE_B.load(Ordering::SeqCst);
    assert_eq!(total, FIRES);
}

#[test]
fn delay_ms_waits_the_whole_tick_count_in_one_period() {
    let regs = FakeRegisters::new();
    regs.pulse_on_read(CTRL, CTRL_COUNT, 1);
    let systick = timer(&regs);

    let mut delay = SysTickDelay::new(&systick);
    delay.delay_ms(3);

    // One period: CTRL, RELOAD and CURRENT setup, enable, then stop.
    assert_eq!(regs.write_count(), 5);
    assert_eq!(regs.get(RELOAD), 3 * ticks_per_ms() - 1);
    assert_eq!(regs.get(CTRL) & CTRL_ENABLE, 0);
}

#[test]
fn delay_ms_rounds_fractional_kilohertz_up() {
    let regs = FakeRegisters::new();
    regs.pulse_on_read(CTRL, CTRL_COUNT, 1);
    let systick = SystemTimer::new(&regs, SysTickConfig::new().with_core_clock(1_500));

    let mut delay = SysTickDelay::new(&systick);
    delay.delay_ms(1);
    assert_eq!(regs.get(RELOAD), 1);

    // Below 1 kHz a millisecond is still at least one tick, padded to two.
    regs.set(RELOAD, 99);
    let systick = SystemTimer::new(&regs, SysTickConfig::new().with_core_clock(999));
    let mut delay = SysTickDelay::new(&systick);
    let writes = regs.write_count();
    delay.delay_ms(1);
    assert_eq!(regs.write_count(), writes + 5);
    assert_eq!(regs.get(RELOAD), 1);
}

#[test]
fn long_delays_are_split_into_24_bit_periods() {
    let regs = FakeRegisters::new();
    regs.pulse_on_read(CTRL, CTRL_COUNT, 1);
    let systick = timer(&regs);
    let mut delay = SysTickDelay::new(&systick);

    // 2 s at 16 MHz: one full period plus the rest.
    delay.delay_ns(2_000_000_000);
    assert_eq!(regs.write_count(), 2 * 5);
    assert_eq!(regs.get(RELOAD), 32_000_000 - (MAX_RELOAD + 1) - 1);

    // One tick past a full period: the leftover tick is padded to two.
    let writes = regs.write_count();
    delay.delay_ns(1_048_576_062);
    assert_eq!(regs.write_count(), writes + 2 * 5);
    assert_eq!(regs.get(RELOAD), 1);
}

#[test]
fn delay_us_rounds_up_to_whole_ticks() {
    let regs = FakeRegisters::new();
    regs.pulse_on_read(CTRL, CTRL_COUNT, 1);
    let systick = timer(&regs);

    let mut delay = SysTickDelay::new(&systick);
    delay.delay_ns(0);
    assert_eq!(regs.write_count(), 0);

    delay.delay_us(1);
    assert_eq!(regs.get(RELOAD), ticks_per_ms() / 1000 - 1);
}
