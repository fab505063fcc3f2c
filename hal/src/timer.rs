//! Periodic timer abstraction
//!
//! A periodic timer runs in one of two modes. In interrupt mode the hardware
//! calls the timer's interrupt entry point on every expiry and the entry
//! point dispatches to a registered [`Callback`]. In polled mode the caller
//! blocks on the hardware expiry flag for exactly one period.
//!
//! The timer is touched from two execution contexts: the foreground, which
//! configures it, and the interrupt handler, which only reads the callback.
//! All methods therefore take `&self`, so a timer can live in a `static` that
//! both contexts reach.

use core::cell::Cell;

use critical_section::Mutex;

use crate::error::HalResult;

/// Procedure invoked from interrupt context on every timer expiry.
///
/// Callbacks must return promptly and must not block.
pub type Callback = fn();

/// How a running timer reports expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMode {
    /// Expiry raises an interrupt that dispatches the callback.
    Interrupt,
    /// Expiry only sets a status flag that the caller polls.
    Polled,
}

/// Lifecycle state, derived from the hardware registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// Never configured, or deinitialized.
    Uninitialized,
    /// Counting down.
    Running(TimerMode),
    /// Configured but halted; the reload value is preserved.
    Stopped,
}

#[cfg(feature = "defmt")]
impl defmt::Format for TimerMode {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Interrupt => defmt::write!(fmt, "Interrupt"),
            Self::Polled => defmt::write!(fmt, "Polled"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TimerState {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Uninitialized => defmt::write!(fmt, "Uninitialized"),
            Self::Running(mode) => defmt::write!(fmt, "Running({})", mode),
            Self::Stopped => defmt::write!(fmt, "Stopped"),
        }
    }
}

/// Periodic timer trait
pub trait PeriodicTimer {
    /// Configure a period of `period_ms` and start counting with expiry
    /// interrupts enabled.
    fn init(&self, period_ms: u32) -> HalResult<()>;

    /// Configure a period of `period_ms`, block until it elapses once, then
    /// stop the timer.
    fn start_busy_wait(&self, period_ms: u32) -> HalResult<()>;

    /// Replace the callback dispatched on expiry. `None` disables dispatch
    /// without stopping the hardware.
    fn set_callback(&self, callback: Option<Callback>);

    /// Resume counting from the current count.
    fn start(&self);

    /// Halt counting, preserving the reload and current values.
    fn stop(&self);

    /// Clear every timer register, leaving the timer idle.
    fn deinit(&self);

    /// Interrupt entry point. Dispatches the registered callback, if any.
    fn on_interrupt(&self);

    /// Current lifecycle state.
    fn state(&self) -> TimerState;
}

/// Holder for the callback shared between the foreground and the timer
/// interrupt.
///
/// Every access happens inside a critical section, so the interrupt sees
/// either the previous or the new callback, never a partial update. The
/// callback itself runs outside the critical section.
pub struct CallbackSlot {
    callback: Mutex<Cell<Option<Callback>>>,
}

impl CallbackSlot {
    /// Creates an empty slot.
    pub const fn new() -> Self {
        Self {
            callback: Mutex::new(Cell::new(None)),
        }
    }

    /// Stores `callback`, returning the one it replaces.
    pub fn replace(&self, callback: Option<Callback>) -> Option<Callback> {
        critical_section::with(|cs| self.callback.borrow(cs).replace(callback))
    }

    /// Returns the current callback.
    pub fn get(&self) -> Option<Callback> {
        critical_section::with(|cs| self.callback.borrow(cs).get())
    }

    /// Returns true when a callback is registered.
    pub fn is_set(&self) -> bool {
        self.get().is_some()
    }

    /// Invokes the current callback. Returns false when the slot is empty.
    #[inline]
    pub fn fire(&self) -> bool {
        match self.get() {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }
}

impl Default for CallbackSlot {
    fn default() -> Self {
        Self::new()
    }
}
