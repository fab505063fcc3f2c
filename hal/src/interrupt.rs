//! Interrupt controller abstraction
//!
//! An interrupt controller maps two kinds of identifiers onto hardware
//! registers: maskable peripheral interrupt lines and core system
//! exceptions. Implementations are stateless; the registers are the only
//! source of truth.
//!
//! Identifier and priority types are associated types so that each backend
//! can make out-of-range values unrepresentable. Once a value of those types
//! exists, every operation is infallible.

/// Interrupt controller abstraction
pub trait InterruptController {
    /// Peripheral interrupt line identifier.
    type Line: Copy;
    /// Core system exception identifier.
    type Exception: Copy;
    /// Priority encoding; lower values preempt higher ones.
    type Priority: Copy;

    /// Enable a peripheral interrupt line.
    fn enable_line(&mut self, line: Self::Line);

    /// Disable a peripheral interrupt line.
    fn disable_line(&mut self, line: Self::Line);

    /// Set the priority of a peripheral interrupt line.
    ///
    /// Priorities of lines sharing the same register are left untouched.
    fn set_line_priority(&mut self, line: Self::Line, priority: Self::Priority);

    /// Enable a configurable system exception.
    ///
    /// Exceptions the architecture keeps permanently enabled are ignored
    /// without any register access.
    fn enable_exception(&mut self, exception: Self::Exception);

    /// Disable a configurable system exception.
    ///
    /// Same no-op rule as [`enable_exception`](Self::enable_exception).
    fn disable_exception(&mut self, exception: Self::Exception);

    /// Set the priority of a system exception.
    fn set_exception_priority(&mut self, exception: Self::Exception, priority: Self::Priority);
}
