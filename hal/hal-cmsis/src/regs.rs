//! ARMv7-M system control space register map.
//!
//! Addresses are fixed by the architecture. Bit positions follow the
//! ARMv7-M Architecture Reference Manual, section B3.

/// Nested Vectored Interrupt Controller.
pub mod nvic {
    /// Interrupt set-enable registers (write one to enable).
    pub const EN_BASE: u32 = 0xE000_E100;
    /// Interrupt clear-enable registers (write one to disable).
    pub const DIS_BASE: u32 = 0xE000_E180;
    /// Interrupt priority registers, four 8-bit fields each.
    pub const PRI_BASE: u32 = 0xE000_E400;

    /// Address of the enable register for `bank`.
    pub const fn en(bank: usize) -> u32 {
        EN_BASE + (bank as u32) * 4
    }

    /// Address of the disable register for `bank`.
    pub const fn dis(bank: usize) -> u32 {
        DIS_BASE + (bank as u32) * 4
    }

    /// Address of priority register `index`.
    pub const fn pri(index: usize) -> u32 {
        PRI_BASE + (index as u32) * 4
    }
}

/// System control block registers used for exception configuration.
pub mod scb {
    /// System handler priority 1: MemManage, BusFault, UsageFault.
    pub const SYSPRI1: u32 = 0xE000_ED18;
    /// System handler priority 2: SVCall.
    pub const SYSPRI2: u32 = 0xE000_ED1C;
    /// System handler priority 3: DebugMonitor, PendSV, SysTick.
    pub const SYSPRI3: u32 = 0xE000_ED20;
    /// System handler control and state.
    pub const SYSHNDCTRL: u32 = 0xE000_ED24;

    pub const MEM_FAULT_ENABLE: u32 = 1 << 16;
    pub const BUS_FAULT_ENABLE: u32 = 1 << 17;
    pub const USAGE_FAULT_ENABLE: u32 = 1 << 18;
}

/// SysTick 24-bit down counter.
pub mod systick {
    pub const CTRL: u32 = 0xE000_E010;
    pub const RELOAD: u32 = 0xE000_E014;
    pub const CURRENT: u32 = 0xE000_E018;

    /// Counter enable.
    pub const CTRL_ENABLE: u32 = 1 << 0;
    /// Exception request on count to zero.
    pub const CTRL_INTEN: u32 = 1 << 1;
    /// Clock source: 1 = core clock.
    pub const CTRL_CLK_SRC: u32 = 1 << 2;
    /// Counted to zero since last read. Read-only, cleared by reading CTRL.
    pub const CTRL_COUNT: u32 = 1 << 16;

    /// Largest value the reload register holds.
    pub const MAX_RELOAD: u32 = 0x00FF_FFFF;
}
