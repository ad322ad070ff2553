use kernel_alloc::{
    ArenaError, ArenaInit, DEFAULT_MINIMUM_ALIGNMENT, PhysArena, REGION_LOG_CAPACITY, Region,
};
use kernel_memory_addresses::PhysicalAddress;

const MIB: u64 = 1 << 20;

fn arena(start: u64, end: u64) -> PhysArena {
    let mut arena = PhysArena::new();
    arena.init_arena(PhysicalAddress::new(start), end - start);
    arena
}

#[test]
fn uninitialized_arena_is_empty() {
    let mut arena = PhysArena::new();
    assert_eq!(arena.free(), 0);
    assert!(matches!(
        arena.alloc(1),
        Err(ArenaError::OutOfMemory { free: 0, .. })
    ));
}

#[test]
fn allocations_are_distinct_and_minimally_aligned() {
    let mut arena = arena(0x2_0010, 2 * MIB);

    let a = arena.alloc(1).unwrap();
    let b = arena.alloc(1).unwrap();

    assert!(a.is_aligned(DEFAULT_MINIMUM_ALIGNMENT));
    assert!(b.is_aligned(DEFAULT_MINIMUM_ALIGNMENT));
    assert_eq!(a.as_u64(), 0x2_0020);
    assert!(b > a);
    assert!(b.as_u64() < 2 * MIB);
}

#[test]
fn alignment_padding_is_consumed() {
    let mut arena = arena(0x1_0008, 0x2_0000);
    let free_before = arena.free();

    let page = arena.alloc_aligned(0x100, 0x1000).unwrap();

    assert_eq!(page.as_u64(), 0x1_1000);
    assert_eq!(arena.free(), free_before - (0x1_1100 - 0x1_0008));
}

#[test]
fn exhaustion_reports_need_and_free() {
    let mut arena = arena(0x1000, 0x2000);
    let err = arena.alloc_aligned(0x1001, 0x100).unwrap_err();
    assert_eq!(
        err,
        ArenaError::OutOfMemory {
            requested: 0x1001,
            align: 0x100,
            need: 0x1001,
            free: 0x1000,
        }
    );
    // an exactly fitting request still succeeds
    assert_eq!(arena.alloc(0x1000).unwrap().as_u64(), 0x1000);
    assert_eq!(arena.free(), 0);
}

#[test]
fn failed_allocation_leaves_arena_untouched() {
    let mut arena = arena(0x1000, 0x1800);
    assert!(arena.alloc(0x1000).is_err());
    assert_eq!(arena.free(), 0x800);
    assert_eq!(arena.regions().count(), 0);
}

#[test]
fn rejects_non_power_of_two_alignment() {
    let mut arena = arena(0x1000, 0x2000);
    assert_eq!(
        arena.alloc_aligned(8, 24),
        Err(ArenaError::InvalidAlignment(24))
    );
    assert_eq!(
        arena.set_minimum_alignment(0),
        Err(ArenaError::InvalidAlignment(0))
    );
    arena.set_minimum_alignment(0x100).unwrap();
    assert!(arena.alloc(1).unwrap().is_aligned(0x100));
}

#[test]
fn region_log_is_bounded() {
    let mut arena = arena(0, MIB);
    for _ in 0..REGION_LOG_CAPACITY + 3 {
        arena.alloc(1).unwrap();
    }
    assert_eq!(arena.regions().count(), REGION_LOG_CAPACITY);
    assert_eq!(
        arena.regions().next(),
        Some(Region {
            base: PhysicalAddress::zero(),
            size: 1
        })
    );
    arena.show();
}

#[test]
fn take_unused_empties_the_arena() {
    let mut arena = arena(0x1000, 0x3000);
    arena.alloc(0x20).unwrap();

    let (base, top) = arena.take_unused().unwrap();
    assert_eq!(base.as_u64(), 0x1020);
    assert_eq!(top.as_u64(), 0x3000);
    assert!(arena.take_unused().is_none());
}

#[test]
fn zeroed_allocation_clears_storage() {
    #[repr(align(4096))]
    struct Backing([u8; 0x2000]);
    let mut backing = Box::new(Backing([0xaa; 0x2000]));
    let start = PhysicalAddress::from_ptr(backing.0.as_mut_ptr());

    let mut arena = PhysArena::new();
    arena.init_arena(start, 0x2000);
    // SAFETY: the arena covers `backing`, which nothing else touches meanwhile.
    let addr = unsafe { arena.alloc_zeroed(0x40, 0x1000) }.unwrap();

    let offset = usize::try_from(addr.as_u64() - start.as_u64()).unwrap();
    assert!(backing.0[offset..offset + 0x40].iter().all(|&b| b == 0));
    assert_eq!(backing.0[offset + 0x40], 0xaa);
}
