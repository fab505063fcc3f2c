//! Blocking delays on top of the SysTick busy wait

use embedded_hal::delay::DelayNs;
use hal::RegisterAccess;

use crate::regs::systick::MAX_RELOAD;
use crate::systick::SystemTimer;

/// Longest single busy-wait period in ticks.
const MAX_CHUNK: u64 = MAX_RELOAD as u64 + 1;

/// Shortest period SysTick can count; a reload of zero never expires.
const MIN_CHUNK: u64 = 2;

/// [`DelayNs`] implementation borrowing a [`SystemTimer`].
///
/// Each delay reprograms the timer in polled mode and leaves it stopped, so
/// do not use it while the timer is running in interrupt mode.
pub struct SysTickDelay<'a, R> {
    timer: &'a SystemTimer<R>,
}

impl<'a, R: RegisterAccess> SysTickDelay<'a, R> {
    pub fn new(timer: &'a SystemTimer<R>) -> Self {
        Self { timer }
    }

    /// Busy-waits for at least `ticks` core clock ticks, split into periods
    /// the 24-bit reload register can hold.
    fn wait_ticks(&mut self, mut ticks: u64) {
        while ticks > 0 {
            let chunk = ticks.clamp(MIN_CHUNK, MAX_CHUNK);
            self.timer.busy_wait_reload((chunk - 1) as u32);
            ticks = ticks.saturating_sub(chunk);
        }
    }
}

impl<R: RegisterAccess> DelayNs for SysTickDelay<'_, R> {
    fn delay_ns(&mut self, ns: u32) {
        let hz = u64::from(self.timer.config().core_clock_hz);
        self.wait_ticks((u64::from(ns) * hz).div_ceil(1_000_000_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        let hz = u64::from(self.timer.config().core_clock_hz);
        self.wait_ticks((u64::from(ms) * hz).div_ceil(1000));
    }
}
