//! # Memory Discovery
//!
//! Sizes real storage at boot and hands the free part to the allocator.
//!
//! 1. READ SCP INFO (through [`kernel_sclp`]) yields the storage increment
//!    size and the maximum number of increments.
//! 2. The first increment holds the lowcore and the image and is usable by
//!    definition. Each following increment is probed at its last byte with
//!    TEST PROTECTION while a program interrupt is expected.
//! 3. The first increment that traps, or that is not fully accessible, ends
//!    usable storage. Everything from the end of the image up to there
//!    becomes the allocation arena.
//!
//! ```text
//!        increment 0      increment 1      increment 2      increment 3
//!   ├────────────────┼────────────────┼────────────────┼────────────────┤
//!   lowcore+image    ▲ probe          ▲ probe ✗ trap
//!                    accessible       ─► ram_size = 2 increments
//! ```
//!
//! The hardware pieces (service call, `tprot`, trap slot) enter through
//! traits, so the whole sequence runs against simulators in hosted tests.
//! Anything that leaves boot without a memory size ends in one call of the
//! [`FatalAbort`] collaborator.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod layout;
mod probe;
mod state;

pub use layout::{LayoutError, StorageLayout};
#[cfg(target_arch = "s390x")]
pub use probe::Tprot;
pub use probe::{ProbeOutcome, StorageProbe, TestProtection, TrapGuardedProbe};
pub use state::MemoryInitState;

use kernel_alloc::ArenaInit;
use kernel_info::memory::SCCB_SIZE;
use kernel_interrupts::ProgramInterruptCode;
use kernel_memory_addresses::PhysicalAddress;
use kernel_report::FatalAbort;
use kernel_sclp::{ReadInfo, ReadInfoError, Sccb, ServiceCall, try_read_configuration};
use log::{debug, error, info, trace};

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoryInitError {
    #[error("READ_SCP_INFO failed: {0}")]
    ReadInfo(#[from] ReadInfoError),
    #[error("invalid storage layout: {0}")]
    Layout(#[from] LayoutError),
    #[error("unexpected {code} while probing {addr}")]
    UnexpectedTrap {
        code: ProgramInterruptCode,
        addr: PhysicalAddress,
    },
    #[error("free storage starts at {start} beyond usable storage ({ram_size:#x} bytes)")]
    ImageBeyondMemory {
        start: PhysicalAddress,
        ram_size: u64,
    },
}

/// Result of memory discovery.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DiscoveredMemory {
    pub layout: StorageLayout,
    /// Usable storage in bytes, from address zero.
    pub ram_size: u64,
    /// First byte after the image and boot stack.
    pub free_start: PhysicalAddress,
}

impl DiscoveredMemory {
    /// Exclusive end of usable storage.
    #[must_use]
    pub const fn ram_end(&self) -> PhysicalAddress {
        PhysicalAddress::new(self.ram_size)
    }

    /// Bytes between the free start and the end of usable storage.
    ///
    /// Zero if the free start lies at or past the end.
    #[must_use]
    pub const fn free_size(&self) -> u64 {
        self.ram_size.saturating_sub(self.free_start.as_u64())
    }
}

/// Probe the increment following the first `ram_size` bytes.
///
/// The probe targets the increment's last byte, so a hit means the whole
/// increment exists.
pub fn probe_next_increment<P>(
    probe: &mut P,
    layout: &StorageLayout,
    ram_size: u64,
) -> ProbeOutcome
where
    P: StorageProbe + ?Sized,
{
    let last_byte = ram_size + layout.increment_size - 1;
    probe.probe(PhysicalAddress::new(last_byte))
}

/// Grow from one increment until a boundary or the maximum size is reached.
///
/// The result is a multiple of the increment size and never exceeds
/// [`StorageLayout::max_ram_size`].
///
/// # Errors
/// [`MemoryInitError::UnexpectedTrap`] if a probe faulted for a reason other
/// than the end of storage.
pub fn probe_ram_size<P>(probe: &mut P, layout: &StorageLayout) -> Result<u64, MemoryInitError>
where
    P: StorageProbe + ?Sized,
{
    probe_ram_size_with(probe, layout, |_| {})
}

/// [`probe_ram_size`], calling `on_accept` with the grown size after every
/// accessible increment.
///
/// # Errors
/// See [`probe_ram_size`].
pub fn probe_ram_size_with<P, F>(
    probe: &mut P,
    layout: &StorageLayout,
    mut on_accept: F,
) -> Result<u64, MemoryInitError>
where
    P: StorageProbe + ?Sized,
    F: FnMut(u64),
{
    let mut ram_size = layout.increment_size;
    while ram_size < layout.max_ram_size {
        match probe_next_increment(probe, layout, ram_size) {
            ProbeOutcome::Accessible => {
                ram_size += layout.increment_size;
                trace!("meminit: {ram_size:#x} bytes accessible");
                on_accept(ram_size);
            }
            ProbeOutcome::Boundary => {
                trace!("meminit: boundary at {ram_size:#x}");
                break;
            }
            ProbeOutcome::Fault(code) => {
                return Err(MemoryInitError::UnexpectedTrap {
                    code,
                    addr: PhysicalAddress::new(ram_size + layout.increment_size - 1),
                });
            }
        }
    }
    Ok(ram_size)
}

/// Everything memory discovery touches, passed explicitly.
pub struct BootContext<'a, S, P, A>
where
    S: ServiceCall,
    P: StorageProbe,
    A: FatalAbort + ?Sized,
{
    sclp: S,
    sccb: &'a mut Sccb,
    probe: P,
    abort: &'a A,
    state: MemoryInitState,
}

impl<'a, S, P, A> BootContext<'a, S, P, A>
where
    S: ServiceCall,
    P: StorageProbe,
    A: FatalAbort + ?Sized,
{
    pub const fn new(sclp: S, sccb: &'a mut Sccb, probe: P, abort: &'a A) -> Self {
        Self {
            sclp,
            sccb,
            probe,
            abort,
            state: MemoryInitState::Start,
        }
    }

    #[must_use]
    pub const fn state(&self) -> MemoryInitState {
        self.state
    }

    pub const fn sclp(&mut self) -> &mut S {
        &mut self.sclp
    }

    pub const fn probe(&mut self) -> &mut P {
        &mut self.probe
    }

    /// Run discovery without initializing an allocator.
    ///
    /// May be repeated; every run starts over from [`MemoryInitState::Start`].
    ///
    /// # Errors
    /// See [`MemoryInitError`]. The state is [`MemoryInitState::Aborted`] afterwards.
    pub fn try_discover_memory(
        &mut self,
        free_start: PhysicalAddress,
    ) -> Result<DiscoveredMemory, MemoryInitError> {
        self.state = MemoryInitState::Start;
        let result = self.discover(free_start);
        if result.is_err() {
            self.state.advance(MemoryInitState::Aborted);
        }
        result
    }

    /// Size storage and initialize `arena` over `[free_start, ram end)`.
    ///
    /// Never returns on failure: boot cannot go on without a memory size, so
    /// the error goes to the abort collaborator exactly once.
    pub fn discover_and_init_memory<I>(
        &mut self,
        arena: &mut I,
        free_start: PhysicalAddress,
    ) -> DiscoveredMemory
    where
        I: ArenaInit + ?Sized,
    {
        match self.try_discover_memory(free_start) {
            Ok(memory) => {
                arena.init_arena(memory.free_start, memory.free_size());
                memory
            }
            Err(e) => {
                error!("meminit: {e}");
                self.abort.abort(format_args!("{e}"))
            }
        }
    }

    fn discover(
        &mut self,
        free_start: PhysicalAddress,
    ) -> Result<DiscoveredMemory, MemoryInitError> {
        self.state.advance(MemoryInitState::RequestingConfig);
        #[allow(clippy::cast_possible_truncation)]
        let length = SCCB_SIZE as u16;
        let command = try_read_configuration(&mut self.sclp, self.sccb, length)?;
        debug!("meminit: configuration read with {command}");

        self.state.advance(MemoryInitState::DerivingSizes);
        let info = ReadInfo::from_sccb(self.sccb);
        let layout = StorageLayout::from_read_info(&info)?;
        debug!(
            "meminit: increment size {:#x}, max storage {:#x}, SCLP facilities {:#018x}",
            layout.increment_size, layout.max_ram_size, info.facilities
        );

        self.state.advance(MemoryInitState::Probing);
        let state = &mut self.state;
        let ram_size = probe_ram_size_with(&mut self.probe, &layout, |_| {
            state.advance(MemoryInitState::Probing);
        })?;

        if free_start.as_u64() >= ram_size {
            return Err(MemoryInitError::ImageBeyondMemory {
                start: free_start,
                ram_size,
            });
        }

        self.state.advance(MemoryInitState::Done);
        info!(
            "meminit: {} MiB usable of {} MiB",
            ram_size >> 20,
            layout.max_ram_size >> 20
        );
        Ok(DiscoveredMemory {
            layout,
            ram_size,
            free_start,
        })
    }
}
