//! SysTick periodic timer driver
//!
//! SysTick is a 24-bit down counter clocked from the core clock. It counts
//! from the reload value to zero, sets the count flag, optionally raises the
//! SysTick exception, and reloads.
//!
//! The driver keeps no copy of the hardware state. The only software state is
//! the [`CallbackSlot`] dispatched by [`SystemTimer::on_interrupt`].

use hal::{
    Callback, CallbackSlot, HalError, HalResult, PeriodicTimer, RegisterAccess, TimerMode,
    TimerState,
};

use crate::device::CORE_CLOCK_HZ;
use crate::regs::systick::{
    CTRL, CTRL_CLK_SRC, CTRL_COUNT, CTRL_ENABLE, CTRL_INTEN, CURRENT, MAX_RELOAD, RELOAD,
};

/// Clock configuration feeding the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SysTickConfig {
    pub core_clock_hz: u32,
}

impl SysTickConfig {
    /// Configuration for the device's reset clock.
    pub const fn new() -> Self {
        Self {
            core_clock_hz: CORE_CLOCK_HZ,
        }
    }

    /// Overrides the core clock frequency.
    pub const fn with_core_clock(mut self, core_clock_hz: u32) -> Self {
        self.core_clock_hz = core_clock_hz;
        self
    }

    /// Timer ticks per millisecond.
    pub const fn ticks_per_ms(&self) -> u32 {
        self.core_clock_hz / 1000
    }

    /// Reload value giving a period of `period_ms`, i.e.
    /// `period_ms * ticks_per_ms - 1`.
    ///
    /// Periods that would need a reload of zero or less, or one wider than
    /// the 24-bit reload register, are rejected. A zero reload never expires.
    pub fn reload_for(&self, period_ms: u32) -> HalResult<u32> {
        let ticks_per_ms = self.ticks_per_ms();
        if ticks_per_ms == 0 {
            log::warn!("systick: core clock {} Hz is below 1 kHz", self.core_clock_hz);
            return Err(HalError::ConfigurationError);
        }

        let ticks = u64::from(period_ms) * u64::from(ticks_per_ms);
        match ticks.checked_sub(1) {
            Some(reload) if (1..=u64::from(MAX_RELOAD)).contains(&reload) => Ok(reload as u32),
            _ => {
                log::warn!("systick: period {} ms has no 24-bit reload", period_ms);
                Err(HalError::InvalidParameter)
            }
        }
    }
}

impl Default for SysTickConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// SysTick driver.
///
/// All methods take `&self`, so a `SystemTimer<Mmio>` can be placed in a
/// `static` shared by the foreground and the SysTick exception handler.
pub struct SystemTimer<R> {
    regs: R,
    config: SysTickConfig,
    callback: CallbackSlot,
}

impl<R: RegisterAccess> SystemTimer<R> {
    /// Creates a driver with no callback. No register is touched.
    pub const fn new(regs: R, config: SysTickConfig) -> Self {
        Self {
            regs,
            config,
            callback: CallbackSlot::new(),
        }
    }

    /// Returns the clock configuration.
    pub const fn config(&self) -> &SysTickConfig {
        &self.config
    }

    /// Current reload register value.
    pub fn reload(&self) -> u32 {
        self.regs.read(RELOAD)
    }

    /// Current counter value.
    pub fn current(&self) -> u32 {
        self.regs.read(CURRENT)
    }

    /// Returns true when a callback is registered.
    pub fn has_callback(&self) -> bool {
        self.callback.is_set()
    }

    /// Stops the counter, loads `reload`, clears the count, then enables the
    /// counter with `ctrl` bits.
    fn configure(&self, reload: u32, ctrl: u32) {
        self.regs.write(CTRL, 0);
        self.regs.write(RELOAD, reload);
        self.regs.write(CURRENT, 0);
        self.regs.modify(CTRL, |value| value | ctrl);
    }

    /// Runs one polled period of `reload + 1` ticks, then stops.
    pub(crate) fn busy_wait_reload(&self, reload: u32) {
        self.configure(reload, CTRL_ENABLE | CTRL_CLK_SRC);
        while self.regs.read(CTRL) & CTRL_COUNT == 0 {
            core::hint::spin_loop();
        }
        self.stop();
    }
}

impl<R: RegisterAccess> PeriodicTimer for SystemTimer<R> {
    fn init(&self, period_ms: u32) -> HalResult<()> {
        let reload = self.config.reload_for(period_ms)?;
        log::debug!("systick: init {} ms (reload {})", period_ms, reload);
        self.configure(reload, CTRL_ENABLE | CTRL_INTEN | CTRL_CLK_SRC);
        Ok(())
    }

    fn start_busy_wait(&self, period_ms: u32) -> HalResult<()> {
        let reload = self.config.reload_for(period_ms)?;
        log::debug!("systick: busy wait {} ms (reload {})", period_ms, reload);
        self.busy_wait_reload(reload);
        Ok(())
    }

    fn set_callback(&self, callback: Option<Callback>) {
        log::debug!("systick: callback {}", if callback.is_some() { "set" } else { "cleared" });
        self.callback.replace(callback);
    }

    fn start(&self) {
        self.regs.modify(CTRL, |value| value | CTRL_ENABLE);
    }

    fn stop(&self) {
        self.regs.modify(CTRL, |value| value & !CTRL_ENABLE);
    }

    /// Clears CTRL, CURRENT and RELOAD.
    ///
    /// The registered callback is kept. A later `init` followed by expiry
    /// dispatches it again; call `set_callback(None)` to drop it.
    fn deinit(&self) {
        log::debug!("systick: deinit");
        self.regs.write(CTRL, 0);
        self.regs.write(CURRENT, 0);
        self.regs.write(RELOAD, 0);
    }

    #[inline]
    fn on_interrupt(&self) {
        self.callback.fire();
    }

    /// Derived from CTRL and RELOAD. Reading CTRL clears the hardware count
    /// flag, so avoid calling this while a busy wait is pending.
    fn state(&self) -> TimerState {
        let ctrl = self.regs.read(CTRL);
        if ctrl & CTRL_ENABLE != 0 {
            if ctrl & CTRL_INTEN != 0 {
                TimerState::Running(TimerMode::Interrupt)
            } else {
                TimerState::Running(TimerMode::Polled)
            }
        } else if ctrl & !CTRL_COUNT == 0 && self.reload() == 0 {
            TimerState::Uninitialized
        } else {
            TimerState::Stopped
        }
    }
}
