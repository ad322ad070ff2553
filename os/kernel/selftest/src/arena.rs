//! Physical arena checks.
//!
//! Stand-ins for the virtual-memory `malloc` checks: two allocations out of
//! the freshly initialized arena must be distinct, usable and inside the
//! storage discovery found, while the first byte past that storage must raise
//! an addressing exception.

use crate::program::check_program_interrupt;
use kernel_alloc::PhysArena;
use kernel_interrupts::{ProgramInterruptCode, TrapInterception};
use kernel_memory_addresses::PhysicalAddress;
use kernel_meminit::DiscoveredMemory;
use kernel_report::Report;
use log::info;

/// Size of each test allocation.
const ALLOCATION_SIZE: u64 = 4096;

/// Arbitrary pattern written through each allocation.
const PATTERN: u64 = 123_456_789;

/// Doubleword access to real storage.
pub trait StorageAccess {
    fn store(&mut self, addr: PhysicalAddress, value: u64);
    fn load(&mut self, addr: PhysicalAddress) -> u64;

    /// Store one byte; used on the address right past usable storage.
    fn store_byte(&mut self, addr: PhysicalAddress, value: u8);
}

/// Allocate twice from `arena` and check the results against `memory`.
pub fn check_arena<T, S>(
    report: &mut Report,
    arena: &mut PhysArena,
    memory: &DiscoveredMemory,
    traps: &mut T,
    storage: &mut S,
) -> bool
where
    T: TrapInterception + ?Sized,
    S: StorageAccess + ?Sized,
{
    report.prefix_push("arena");
    let pass = run(report, arena, memory, traps, storage);
    arena.show();
    report.prefix_pop();
    pass
}

fn run<T, S>(
    report: &mut Report,
    arena: &mut PhysArena,
    memory: &DiscoveredMemory,
    traps: &mut T,
    storage: &mut S,
) -> bool
where
    T: TrapInterception + ?Sized,
    S: StorageAccess + ?Sized,
{
    let (first, second) = match (arena.alloc(ALLOCATION_SIZE), arena.alloc(ALLOCATION_SIZE)) {
        (Ok(first), Ok(second)) => (first, second),
        (Err(e), _) | (_, Err(e)) => {
            info!("allocation failed: {e}");
            return report.report("two allocations", false);
        }
    };

    let inside = |addr: PhysicalAddress| {
        addr >= memory.free_start
            && addr
                .checked_add(ALLOCATION_SIZE)
                .is_some_and(|end| end <= memory.ram_end())
    };

    let mut pass = report.report("got address inside storage", inside(first));
    storage.store(first, PATTERN);
    pass &= report.report("access works", storage.load(first) == PATTERN);

    pass &= report.report("got 2nd address inside storage", inside(second));
    storage.store(second, PATTERN);
    pass &= report.report("access works", storage.load(second) == PATTERN);

    pass &= report.report("addresses differ", first != second);

    let ram_end = memory.ram_end();
    pass &= check_program_interrupt(
        report,
        traps,
        "store past end of storage",
        ProgramInterruptCode::ADDRESSING,
        || storage.store_byte(ram_end, 0),
    );
    pass
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel_alloc::ArenaInit;
    use kernel_interrupts::SimulatedTraps;
    use kernel_meminit::StorageLayout;
    use std::collections::BTreeMap;

    const MIB: u64 = 1 << 20;

    struct Storage<'t> {
        ram_end: PhysicalAddress,
        traps: &'t SimulatedTraps,
        words: BTreeMap<u64, u64>,
    }

    impl StorageAccess for Storage<'_> {
        fn store(&mut self, addr: PhysicalAddress, value: u64) {
            assert!(addr < self.ram_end, "store outside storage at {addr}");
            self.words.insert(addr.as_u64(), value);
        }

        fn load(&mut self, addr: PhysicalAddress) -> u64 {
            self.words.get(&addr.as_u64()).copied().unwrap_or_default()
        }

        fn store_byte(&mut self, addr: PhysicalAddress, _value: u8) {
            if addr >= self.ram_end {
                self.traps.deliver(ProgramInterruptCode::ADDRESSING);
            }
        }
    }

    fn discovered(ram_size: u64) -> DiscoveredMemory {
        DiscoveredMemory {
            layout: StorageLayout {
                increment_size: MIB,
                max_ram_size: 4 * MIB,
            },
            ram_size,
            free_start: PhysicalAddress::new(0x2_0000),
        }
    }

    #[test]
    fn allocations_inside_discovered_storage_pass() {
        let memory = discovered(2 * MIB);
        let traps = SimulatedTraps::new();
        let mut storage = Storage {
            ram_end: memory.ram_end(),
            traps: &traps,
            words: BTreeMap::new(),
        };
        let mut arena = PhysArena::new();
        arena.init_arena(memory.free_start, memory.free_size());

        let mut report = Report::new();
        assert!(check_arena(&mut report, &mut arena, &memory, &mut &traps, &mut storage));
        assert_eq!(report.tests(), 6);
        assert_eq!(report.failures(), 0);
        assert_eq!(arena.regions().count(), 2);
        assert_eq!(storage.words.len(), 2);
        assert_eq!(report.prefixes().to_string(), "");
    }

    #[test]
    fn exhausted_arena_fails_once() {
        let memory = discovered(2 * MIB);
        let traps = SimulatedTraps::new();
        let mut storage = Storage {
            ram_end: memory.ram_end(),
            traps: &traps,
            words: BTreeMap::new(),
        };
        let mut arena = PhysArena::new();
        arena.init_arena(memory.free_start, ALLOCATION_SIZE);

        let mut report = Report::new();
        assert!(!check_arena(&mut report, &mut arena, &memory, &mut &traps, &mut storage));
        assert_eq!(report.tests(), 1);
        assert_eq!(report.failures(), 1);
        assert!(storage.words.is_empty());
    }

    #[test]
    fn missing_boundary_trap_fails() {
        let memory = discovered(2 * MIB);
        let traps = SimulatedTraps::new();
        // Storage continues past what discovery reported.
        let mut storage = Storage {
            ram_end: PhysicalAddress::new(4 * MIB),
            traps: &traps,
            words: BTreeMap::new(),
        };
        let mut arena = PhysArena::new();
        arena.init_arena(memory.free_start, memory.free_size());

        let mut report = Report::new();
        assert!(!check_arena(&mut report, &mut arena, &memory, &mut &traps, &mut storage));
        assert_eq!(report.failures(), 1);
        assert_eq!(traps.delivered(), 0);
    }
}
