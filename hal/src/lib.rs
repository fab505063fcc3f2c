//! Hardware Abstraction Layer (HAL) for Cortex-M system peripherals
//!
//! This crate provides vendor-agnostic traits for interrupt controllers and
//! periodic timers, together with the register access layer the concrete
//! drivers are written against. Backends such as `hal-cmsis` implement the
//! traits for a specific core and device.

#![cfg_attr(not(any(feature = "std", test)), no_std)]

pub mod error;
pub mod interrupt;
pub mod register;
pub mod timer;

// Re-export commonly used types
pub use error::{HalError, HalResult};
pub use interrupt::InterruptController;
pub use register::{FakeRegisters, Mmio, RegisterAccess};
pub use timer::{Callback, CallbackSlot, PeriodicTimer, TimerMode, TimerState};
