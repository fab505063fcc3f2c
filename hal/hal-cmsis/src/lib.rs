//! ARM Cortex-M implementation of the HAL interrupt controller and periodic
//! timer traits.
//!
//! - [`nvic`]      – NVIC line enable/disable/priority and system exception
//!   configuration through the SCB.
//! - [`systick`]   – SysTick periodic timer with interrupt callback dispatch
//!   and a polled busy wait.
//! - [`delay`]     – `embedded-hal` delay provider built on the busy wait.
//! - [`device`]    – Per-device constants, selected by cargo feature.
//!
//! Drivers are generic over [`hal::RegisterAccess`]. On hardware they run on
//! [`hal::Mmio`]; host tests run them on [`hal::FakeRegisters`].
//!
//! ```ignore
//! use hal::{InterruptController, Mmio, PeriodicTimer};
//! use hal_cmsis::{Nvic, Priority, SysTickConfig, SystemException, SystemTimer};
//!
//! static SYSTICK: SystemTimer<Mmio> =
//!     SystemTimer::new(unsafe { Mmio::new() }, SysTickConfig::new());
//!
//! let mut nvic = Nvic::new(unsafe { Mmio::new() });
//! nvic.set_exception_priority(SystemException::SysTick, Priority::LOWEST);
//! SYSTICK.set_callback(Some(on_tick));
//! SYSTICK.init(10)?;
//! ```

#![cfg_attr(not(any(feature = "std", test)), no_std)]

pub mod delay;
pub mod device;
pub mod exception;
pub mod nvic;
pub mod priority;
pub mod regs;
pub mod systick;

pub use delay::SysTickDelay;
pub use exception::SystemException;
pub use nvic::{line_enable_slot, line_priority_field, IrqNumber, Nvic};
pub use priority::{Priority, PriorityField};
pub use systick::{SysTickConfig, SystemTimer};
