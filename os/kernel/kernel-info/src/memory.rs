//! # Memory Layout

/// Where the image is linked and loaded in real storage.
///
/// # Selftest Build
/// This information is sourced in the selftest's `build.rs` to configure
/// the linker.
pub const LOAD_ADDRESS: u64 = 0x0001_0000;

/// Size of a service-call control block in bytes.
///
/// An SCCB must not cross a page boundary; one full page is the largest
/// buffer the service processor accepts.
pub const SCCB_SIZE: usize = 4096;

/// Storage increment sizes are reported in units of `1 << STORAGE_INCREMENT_UNIT_SHIFT` bytes (1 MiB).
pub const STORAGE_INCREMENT_UNIT_SHIFT: u32 = 20;

/// One storage-increment unit in bytes.
pub const STORAGE_INCREMENT_UNIT: u64 = 1 << STORAGE_INCREMENT_UNIT_SHIFT;

/// Page size used for alignment of the image end and the SCCB.
pub const PAGE_SIZE: u64 = 4096;

/// Size of the boot stack.
pub const BOOT_STACK_SIZE: usize = 64 * 1024;

/// Size of the stack frame the s390x ELF ABI requires callers to provide.
pub const STACK_FRAME_OVERHEAD: usize = 160;

const _: () = {
    assert!(SCCB_SIZE as u64 == PAGE_SIZE);
    assert!(LOAD_ADDRESS.is_multiple_of(PAGE_SIZE));
    assert!(LOAD_ADDRESS >= crate::lowcore::LOWCORE_SIZE);
    assert!(LOAD_ADDRESS < STORAGE_INCREMENT_UNIT);
    assert!(BOOT_STACK_SIZE.is_multiple_of(4096));
    assert!(BOOT_STACK_SIZE > STACK_FRAME_OVERHEAD);
};
