//! Priority values and their placement inside 8-bit priority byte lanes

use core::fmt;

use hal::{HalError, HalResult};

use crate::device::PRIORITY_BITS;

/// Mask covering the implemented priority bits, right-aligned.
const FIELD_MASK: u32 = (1 << PRIORITY_BITS) - 1;

/// Implemented bits sit at the top of each byte lane.
const LANE_SHIFT: u32 = 8 - PRIORITY_BITS as u32;

/// Type-safe interrupt priority. Lower values preempt higher ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(u8);

impl Priority {
    /// Most urgent priority.
    pub const HIGHEST: Priority = Priority(0);

    /// Least urgent priority.
    pub const LOWEST: Priority = Priority(FIELD_MASK as u8);

    /// Create a priority, rejecting values wider than the implemented bits.
    pub fn new(priority: u8) -> HalResult<Self> {
        if priority > Self::LOWEST.0 {
            log::warn!("priority {} exceeds {} implemented bits", priority, PRIORITY_BITS);
            Err(HalError::InvalidParameter)
        } else {
            Ok(Priority(priority))
        }
    }

    /// Get the raw priority value
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Priority {
    type Error = HalError;

    fn try_from(value: u8) -> HalResult<Self> {
        Self::new(value)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Priority({})", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Priority {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Priority({})", self.0);
    }
}

/// Location of one priority field: a register and the bit offset of the
/// field's least significant implemented bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityField {
    pub addr: u32,
    pub shift: u32,
}

impl PriorityField {
    /// Field in byte `lane` (0..=3) of the register at `addr`.
    pub const fn lane(addr: u32, lane: u32) -> Self {
        Self {
            addr,
            shift: lane * 8 + LANE_SHIFT,
        }
    }

    /// Bits owned by this field within its register.
    pub const fn mask(self) -> u32 {
        FIELD_MASK << self.shift
    }

    /// Returns `register` with this field replaced by `priority`; all other
    /// bits are preserved.
    pub const fn insert(self, register: u32, priority: Priority) -> u32 {
        (register & !self.mask()) | ((priority.0 as u32) << self.shift)
    }

    /// Extracts this field's priority from `register`.
    pub const fn extract(self, register: u32) -> Priority {
        Priority(((register >> self.shift) & FIELD_MASK) as u8)
    }
}
