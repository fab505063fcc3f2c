//! Device profile selected at build time through cargo features.

#[cfg(not(any(feature = "tm4c123")))]
compile_error!("hal-cmsis needs a device profile feature, e.g. `tm4c123`");

#[cfg(feature = "tm4c123")]
mod profile {
    /// Number of peripheral interrupt lines wired to the NVIC.
    pub const IRQ_COUNT: u16 = 139;

    /// Implemented bits per 8-bit priority field.
    pub const PRIORITY_BITS: u8 = 3;

    /// Core clock out of reset (16 MHz precision internal oscillator).
    pub const CORE_CLOCK_HZ: u32 = 16_000_000;
}

pub use profile::*;

/// Number of 32-line enable/disable register banks in use.
pub const ENABLE_BANKS: usize = (IRQ_COUNT as usize + 31) / 32;

/// Number of priority registers in use (four lines each).
pub const PRIORITY_REGISTERS: usize = (IRQ_COUNT as usize + 3) / 4;
