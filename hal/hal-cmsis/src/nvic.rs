//! Nested Vectored Interrupt Controller driver
//!
//! Interrupt lines are split into banks of 32. Line `n` lives at bit
//! `n % 32` of enable register `n / 32` and of the matching disable
//! register. Both are write-one registers: writing a mask to the enable
//! register enables exactly those lines, writing it to the disable register
//! disables exactly those lines, and zero bits have no effect. The driver
//! therefore writes single-bit masks and never read-modify-writes them.
//!
//! Priorities are packed four lines per register, one byte lane each, with
//! only the top [`PRIORITY_BITS`](crate::device::PRIORITY_BITS) of each lane
//! implemented. Priority updates are read-modify-writes confined to the
//! line's own field.

use core::fmt;

use hal::{HalError, HalResult, InterruptController, RegisterAccess};

use crate::device::IRQ_COUNT;
use crate::exception::SystemException;
use crate::priority::{Priority, PriorityField};
use crate::regs;

/// Peripheral interrupt line number, guaranteed to be below
/// [`IRQ_COUNT`](crate::device::IRQ_COUNT).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct IrqNumber(u16);

impl IrqNumber {
    /// Highest line number on this device.
    pub const MAX: IrqNumber = IrqNumber(IRQ_COUNT - 1);

    /// Create a line number, rejecting lines the device does not have.
    pub fn new(number: u16) -> HalResult<Self> {
        if number < IRQ_COUNT {
            Ok(Self(number))
        } else {
            log::warn!("irq {} out of range (device has {})", number, IRQ_COUNT);
            Err(HalError::InvalidParameter)
        }
    }

    /// Get the raw line number
    #[inline]
    pub const fn number(self) -> u16 {
        self.0
    }

    /// Every line on this device, in ascending order.
    pub fn all() -> impl Iterator<Item = IrqNumber> {
        (0..IRQ_COUNT).map(IrqNumber)
    }
}

impl TryFrom<u16> for IrqNumber {
    type Error = HalError;

    fn try_from(value: u16) -> HalResult<Self> {
        Self::new(value)
    }
}

impl fmt::Display for IrqNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IRQ{}", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for IrqNumber {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "IRQ{=u16}", self.0);
    }
}

// SAFETY: `number` returns a value below IRQ_COUNT, a valid line on the device.
#[cfg(all(target_arch = "arm", target_os = "none"))]
unsafe impl cortex_m::interrupt::InterruptNumber for IrqNumber {
    #[inline]
    fn number(self) -> u16 {
        self.0
    }
}

/// Bank index and single-bit mask selecting `irq` in the enable/disable
/// register banks.
#[inline]
pub const fn line_enable_slot(irq: IrqNumber) -> (usize, u32) {
    let number = irq.0 as usize;
    (number / 32, 1 << (number % 32))
}

/// Priority field of `irq`: register `PRI_BASE + (irq / 4) * 4`, byte lane
/// `irq % 4`.
#[inline]
pub const fn line_priority_field(irq: IrqNumber) -> PriorityField {
    let number = irq.0 as usize;
    PriorityField::lane(regs::nvic::pri(number / 4), (number % 4) as u32)
}

/// NVIC driver over a register accessor.
pub struct Nvic<R> {
    regs: R,
}

impl<R: RegisterAccess> Nvic<R> {
    /// Creates a driver. No register is touched.
    pub const fn new(regs: R) -> Self {
        Self { regs }
    }

    /// Returns true when `irq` is enabled.
    pub fn is_line_enabled(&self, irq: IrqNumber) -> bool {
        let (bank, mask) = line_enable_slot(irq);
        self.regs.read(regs::nvic::en(bank)) & mask != 0
    }

    /// Current priority of `irq`.
    pub fn line_priority(&self, irq: IrqNumber) -> Priority {
        let field = line_priority_field(irq);
        field.extract(self.regs.read(field.addr))
    }

    /// Whether `exception` is enabled, or `None` when the architecture keeps
    /// it permanently enabled.
    pub fn is_exception_enabled(&self, exception: SystemException) -> Option<bool> {
        exception
            .enable_mask()
            .map(|mask| self.regs.read(regs::scb::SYSHNDCTRL) & mask != 0)
    }

    /// Current priority of `exception`.
    pub fn exception_priority(&self, exception: SystemException) -> Priority {
        let field = exception.priority_field();
        field.extract(self.regs.read(field.addr))
    }

    fn write_priority(&self, field: PriorityField, priority: Priority) {
        self.regs
            .modify(field.addr, |value| field.insert(value, priority));
    }
}

impl<R: RegisterAccess> InterruptController for Nvic<R> {
    type Line = IrqNumber;
    type Exception = SystemException;
    type Priority = Priority;

    fn enable_line(&mut self, line: IrqNumber) {
        let (bank, mask) = line_enable_slot(line);
        log::debug!("nvic: enable {}", line);
        self.regs.write(regs::nvic::en(bank), mask);
    }

    fn disable_line(&mut self, line: IrqNumber) {
        let (bank, mask) = line_enable_slot(line);
        log::debug!("nvic: disable {}", line);
        self.regs.write(regs::nvic::dis(bank), mask);
    }

    fn set_line_priority(&mut self, line: IrqNumber, priority: Priority) {
        log::debug!("nvic: {} priority {}", line, priority.value());
        self.write_priority(line_priority_field(line), priority);
    }

    fn enable_exception(&mut self, exception: SystemException) {
        match exception.enable_mask() {
            Some(mask) => {
                log::debug!("scb: enable {}", exception);
                self.regs.modify(regs::scb::SYSHNDCTRL, |value| value | mask);
            }
            None => log::trace!("scb: {} is always enabled", exception),
        }
    }

    fn disable_exception(&mut self, exception: SystemException) {
        match exception.enable_mask() {
            Some(mask) => {
                log::debug!("scb: disable {}", exception);
                self.regs.modify(regs::scb::SYSHNDCTRL, |value| value & !mask);
            }
            None => log::trace!("scb: {} cannot be disabled", exception),
        }
    }

    fn set_exception_priority(&mut self, exception: SystemException, priority: Priority) {
        log::debug!("scb: {} priority {}", exception, priority.value());
        self.write_priority(exception.priority_field(), priority);
    }
}
