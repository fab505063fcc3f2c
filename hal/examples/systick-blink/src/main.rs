//! SysTick Blink Example
//!
//! Runs the SysTick timer in interrupt mode and counts expiries from the
//! exception handler, with a polled busy wait between reports.
//!
//! Build for the TM4C123 (default feature):
//! - `cargo build --release`

#![no_std]
#![no_main]

use core::sync::atomic::{AtomicI16, AtomicU32, Ordering};

use cortex_m_rt::{entry, exception};
use hal::{InterruptController, Mmio, PeriodicTimer};
use hal_cmsis::{IrqNumber, Nvic, Priority, SysTickConfig, SystemException, SystemTimer};
use panic_halt as _;

// SAFETY: the SysTick registers exist on every ARMv7-M core.
static SYSTICK: SystemTimer<Mmio> = SystemTimer::new(unsafe { Mmio::new() }, SysTickConfig::new());

static TICKS: AtomicU32 = AtomicU32::new(0);

/// Last peripheral interrupt taken by the default handler, -1 when none.
static LAST_IRQ: AtomicI16 = AtomicI16::new(-1);

/// GPIO Port F on the TM4C123 (user buttons and RGB LED).
const GPIO_PORTF_IRQ: u16 = 30;

fn on_tick() {
    TICKS.fetch_add(1, Ordering::Relaxed);
}

#[entry]
fn main() -> ! {
    // SAFETY: this program only addresses the core's system control space.
    let mut nvic = Nvic::new(unsafe { Mmio::new() });

    nvic.enable_exception(SystemException::UsageFault);
    nvic.enable_exception(SystemException::BusFault);
    nvic.set_exception_priority(SystemException::SysTick, Priority::LOWEST);

    let Ok(port_f) = IrqNumber::new(GPIO_PORTF_IRQ) else {
        panic!("GPIO Port F line out of range");
    };
    nvic.set_line_priority(port_f, Priority::HIGHEST);
    nvic.enable_line(port_f);

    // A 1 ms pause in polled mode before switching to interrupts.
    if SYSTICK.start_busy_wait(1).is_err() {
        panic!("busy wait period out of range");
    }

    SYSTICK.set_callback(Some(on_tick));
    if SYSTICK.init(500).is_err() {
        panic!("tick period out of range");
    }

    loop {
        cortex_m::asm::wfi();
        if TICKS.load(Ordering::Relaxed) >= 10 {
            SYSTICK.stop();
        }
    }
}

#[exception]
fn SysTick() {
    SYSTICK.on_interrupt();
}

#[exception]
unsafe fn DefaultHandler(irqn: i16) {
    LAST_IRQ.store(irqn, Ordering::Relaxed);
}
