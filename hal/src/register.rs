//! Memory-mapped register access
//!
//! Drivers never dereference peripheral addresses directly. They go through
//! [`RegisterAccess`], which has two implementations:
//!
//! - [`Mmio`] performs volatile accesses on the real address space.
//! - [`FakeRegisters`] is an in-memory register file used by host tests. It
//!   models the write-one-to-set / write-one-to-clear register pairs and the
//!   read-to-clear status flags found on Cortex-M system peripherals.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::{LinearMap, Vec};

/// Word-wide access to a 32-bit register address space.
pub trait RegisterAccess {
    /// Read the register at `addr`.
    fn read(&self, addr: u32) -> u32;

    /// Write `value` to the register at `addr`.
    fn write(&self, addr: u32, value: u32);

    /// Read-modify-write the register at `addr`.
    ///
    /// Not atomic with respect to other contexts writing the same register.
    #[inline]
    fn modify<F>(&self, addr: u32, f: F)
    where
        F: FnOnce(u32) -> u32,
    {
        let value = self.read(addr);
        self.write(addr, f(value));
    }
}

impl<R: RegisterAccess + ?Sized> RegisterAccess for &R {
    #[inline]
    fn read(&self, addr: u32) -> u32 {
        (**self).read(addr)
    }

    #[inline]
    fn write(&self, addr: u32, value: u32) {
        (**self).write(addr, value)
    }
}

/// Volatile access to the physical address space.
#[derive(Debug, Clone, Copy)]
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// Creates an accessor for the physical address space.
    ///
    /// # Safety
    ///
    /// Every address later passed to [`RegisterAccess::read`] or
    /// [`RegisterAccess::write`] must be a valid, word-aligned peripheral
    /// register on the running device. Drivers in this workspace only use
    /// addresses from their device register map.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl RegisterAccess for Mmio {
    #[inline]
    fn read(&self, addr: u32) -> u32 {
        // SAFETY: validity of `addr` is the contract of `Mmio::new`.
        unsafe { core::ptr::read_volatile(addr as usize as *const u32) }
    }

    #[inline]
    fn write(&self, addr: u32, value: u32) {
        // SAFETY: validity of `addr` is the contract of `Mmio::new`.
        unsafe { core::ptr::write_volatile(addr as usize as *mut u32, value) };
        write_barrier();
    }
}

/// Makes a register write take effect before the next instruction.
#[inline(always)]
fn write_barrier() {
    #[cfg(all(target_arch = "arm", target_os = "none"))]
    {
        cortex_m::asm::dsb();
        cortex_m::asm::isb();
    }
    #[cfg(not(all(target_arch = "arm", target_os = "none")))]
    core::sync::atomic::compiler_fence(core::sync::atomic::Ordering::SeqCst);
}

/// Maximum number of write-one-to-clear aliases a fake register file tracks.
const MAX_ALIASES: usize = 16;
/// Maximum number of pulsed status flags a fake register file tracks.
const MAX_PULSES: usize = 4;

#[derive(Debug, Clone, Copy)]
struct Pulse {
    mask: u32,
    period: u32,
    reads: u32,
}

struct FakeState<const N: usize> {
    values: LinearMap<u32, u32, N>,
    set_on_write: Vec<u32, MAX_ALIASES>,
    clear_aliases: LinearMap<u32, u32, MAX_ALIASES>,
    pulses: LinearMap<u32, Pulse, MAX_PULSES>,
    reads: usize,
    writes: usize,
}

impl<const N: usize> FakeState<N> {
    fn stored(&self, addr: u32) -> u32 {
        self.values.get(&addr).copied().unwrap_or(0)
    }

    fn store(&mut self, addr: u32, value: u32) {
        if self.values.insert(addr, value).is_err() {
            panic!("fake register file full at {:#010x}", addr);
        }
    }
}

/// In-memory register file for host-side driver tests.
///
/// Unknown addresses read as zero, matching the reset state of the modeled
/// peripherals. Capacity is fixed at `N` distinct addresses; exceeding it
/// panics.
pub struct FakeRegisters<const N: usize = 64> {
    state: Mutex<RefCell<FakeState<N>>>,
}

impl FakeRegisters {
    /// Creates an empty register file with the default capacity.
    pub const fn new() -> Self {
        Self::empty()
    }
}

impl<const N: usize> FakeRegisters<N> {
    /// Creates an empty register file with every register reading zero.
    pub const fn empty() -> Self {
        Self {
            state: Mutex::new(RefCell::new(FakeState {
                values: LinearMap::new(),
                set_on_write: Vec::new(),
                clear_aliases: LinearMap::new(),
                pulses: LinearMap::new(),
                reads: 0,
                writes: 0,
            })),
        }
    }

    /// Models a write-one-to-set / write-one-to-clear register pair.
    ///
    /// Writing ones to `set_addr` sets those bits, writing ones to
    /// `clear_addr` clears them in `set_addr`. Reading either address returns
    /// the shared state.
    pub fn bind_set_clear_pair(&self, set_addr: u32, clear_addr: u32) {
        self.with(|state| {
            if !state.set_on_write.contains(&set_addr) && state.set_on_write.push(set_addr).is_err() {
                panic!("fake register file alias table full");
            }
            if state.clear_aliases.insert(clear_addr, set_addr).is_err() {
                panic!("fake register file alias table full");
            }
        });
    }

    /// Makes the read-only `mask` bits of `addr` read as set on every
    /// `period`-th read and as clear otherwise.
    ///
    /// This models a hardware status flag that is raised periodically and
    /// cleared by the read that observes it. Writes never change `mask` bits.
    pub fn pulse_on_read(&self, addr: u32, mask: u32, period: u32) {
        let pulse = Pulse {
            mask,
            period: period.max(1),
            reads: 0,
        };
        self.with(|state| {
            if state.pulses.insert(addr, pulse).is_err() {
                panic!("fake register file pulse table full");
            }
        });
    }

    /// Presets a register without counting it as a driver write.
    pub fn set(&self, addr: u32, value: u32) {
        self.with(|state| state.store(addr, value));
    }

    /// Peeks at a register without counting it as a driver read.
    pub fn get(&self, addr: u32) -> u32 {
        self.with(|state| match state.clear_aliases.get(&addr) {
            Some(&backing) => state.stored(backing),
            None => state.stored(addr),
        })
    }

    /// Number of writes performed through [`RegisterAccess`].
    pub fn write_count(&self) -> usize {
        self.with(|state| state.writes)
    }

    /// Number of reads performed through [`RegisterAccess`].
    pub fn read_count(&self) -> usize {
        self.with(|state| state.reads)
    }

    fn with<T>(&self, f: impl FnOnce(&mut FakeState<N>) -> T) -> T {
        critical_section::with(|cs| f(&mut *self.state.borrow_ref_mut(cs)))
    }
}

impl<const N: usize> Default for FakeRegisters<N> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<const N: usize> RegisterAccess for FakeRegisters<N> {
    fn read(&self, addr: u32) -> u32 {
        self.with(|state| {
            state.reads += 1;
            let backing = state.clear_aliases.get(&addr).copied().unwrap_or(addr);
            let mut value = state.stored(backing);
            if let Some(pulse) = state.pulses.get_mut(&addr) {
                pulse.reads += 1;
                if pulse.reads % pulse.period == 0 {
                    value |= pulse.mask;
                }
            }
            value
        })
    }

    fn write(&self, addr: u32, value: u32) {
        self.with(|state| {
            state.writes += 1;
            let read_only = state.pulses.get(&addr).map_or(0, |pulse| pulse.mask);
            let value = value & !read_only;
            let alias = state.clear_aliases.get(&addr).copied();
            if let Some(backing) = alias {
                let current = state.stored(backing);
                state.store(backing, current & !value);
            } else if state.set_on_write.contains(&addr) {
                let current = state.stored(addr);
                state.store(addr, current | value);
            } else {
                state.store(addr, value);
            }
        });
    }
}
