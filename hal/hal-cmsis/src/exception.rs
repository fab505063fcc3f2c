//! Configurable core system exceptions

use core::fmt;

use crate::priority::PriorityField;
use crate::regs::scb;

/// Core system exceptions with a configurable priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemException {
    MemManagementFault,
    BusFault,
    UsageFault,
    SVCall,
    DebugMonitor,
    PendSV,
    SysTick,
}

impl SystemException {
    /// Every configurable exception, in vector table order.
    pub const ALL: [SystemException; 7] = [
        Self::MemManagementFault,
        Self::BusFault,
        Self::UsageFault,
        Self::SVCall,
        Self::DebugMonitor,
        Self::PendSV,
        Self::SysTick,
    ];

    /// Enable bit in SYSHNDCTRL, or `None` for exceptions that the
    /// architecture keeps permanently enabled.
    pub const fn enable_mask(self) -> Option<u32> {
        match self {
            Self::MemManagementFault => Some(scb::MEM_FAULT_ENABLE),
            Self::BusFault => Some(scb::BUS_FAULT_ENABLE),
            Self::UsageFault => Some(scb::USAGE_FAULT_ENABLE),
            Self::SVCall | Self::DebugMonitor | Self::PendSV | Self::SysTick => None,
        }
    }

    /// Priority field of this exception in the system priority registers.
    pub const fn priority_field(self) -> PriorityField {
        match self {
            Self::MemManagementFault => PriorityField::lane(scb::SYSPRI1, 0),
            Self::BusFault => PriorityField::lane(scb::SYSPRI1, 1),
            Self::UsageFault => PriorityField::lane(scb::SYSPRI1, 2),
            Self::SVCall => PriorityField::lane(scb::SYSPRI2, 3),
            Self::DebugMonitor => PriorityField::lane(scb::SYSPRI3, 0),
            Self::PendSV => PriorityField::lane(scb::SYSPRI3, 2),
            Self::SysTick => PriorityField::lane(scb::SYSPRI3, 3),
        }
    }

    /// Exception number in the vector table.
    pub const fn vector(self) -> u8 {
        match self {
            Self::MemManagementFault => 4,
            Self::BusFault => 5,
            Self::UsageFault => 6,
            Self::SVCall => 11,
            Self::DebugMonitor => 12,
            Self::PendSV => 14,
            Self::SysTick => 15,
        }
    }
}

impl fmt::Display for SystemException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MemManagementFault => "MemManage",
            Self::BusFault => "BusFault",
            Self::UsageFault => "UsageFault",
            Self::SVCall => "SVCall",
            Self::DebugMonitor => "DebugMonitor",
            Self::PendSV => "PendSV",
            Self::SysTick => "SysTick",
        };
        f.write_str(name)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SystemException {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Exception({=u8})", self.vector());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_faults_are_maskable() {
        let maskable: usize = SystemException::ALL
            .iter()
            .filter(|e| e.enable_mask().is_some())
            .count();
        assert_eq!(maskable, 3);
        assert_eq!(SystemException::SysTick.enable_mask(), None);
    }

    #[test]
    fn priority_table_matches_reference_layout() {
        let table = [
            (SystemException::MemManagementFault, scb::SYSPRI1, 5),
            (SystemException::BusFault, scb::SYSPRI1, 13),
            (SystemException::UsageFault, scb::SYSPRI1, 21),
            (SystemException::SVCall, scb::SYSPRI2, 29),
            (SystemException::DebugMonitor, scb::SYSPRI3, 5),
            (SystemException::PendSV, scb::SYSPRI3, 21),
            (SystemException::SysTick, scb::SYSPRI3, 29),
        ];
        for (exception, addr, shift) in table {
            let field = exception.priority_field();
            assert_eq!((field.addr, field.shift), (addr, shift), "{exception}");
        }
    }

    #[test]
    fn fields_sharing_a_register_do_not_overlap() {
        for a in SystemException::ALL {
            for b in SystemException::ALL {
                let (fa, fb) = (a.priority_field(), b.priority_field());
                if a != b && fa.addr == fb.addr {
                    assert_eq!(fa.mask() & fb.mask(), 0, "{a} overlaps {b}");
                }
            }
        }
    }
}
