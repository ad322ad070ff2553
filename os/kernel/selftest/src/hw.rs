//! The instructions behind the checks.

use crate::arena::StorageAccess;
use crate::facility::{FACILITY_LIST_DOUBLEWORDS, FacilityList};
use crate::fp::{FloatingPoint, RoundingMode};
use crate::vector::{ReservedEncoding, Vector, VectorUnit};
use core::arch::asm;
use core::ptr;
use kernel_memory_addresses::PhysicalAddress;

/// The BFP unit. Requires the AFP-register control in CR0.
#[derive(Debug, Default, Copy, Clone)]
pub struct Bfp;

// The M3 field is an immediate, so each rounding mode gets its own encoding.
macro_rules! round_with_mode {
    ($mode:expr, $insn:literal, $out:ident, $inp:expr, $class:ident) => {
        match $mode {
            RoundingMode::TowardZero => unsafe {
                asm!(
                    concat!($insn, " {r},5,{v},0"),
                    r = lateout($class) $out,
                    v = in($class) $inp,
                    options(pure, nomem, nostack),
                );
            },
            RoundingMode::PrepareForShorterPrecision => unsafe {
                asm!(
                    concat!($insn, " {r},3,{v},0"),
                    r = lateout($class) $out,
                    v = in($class) $inp,
                    options(pure, nomem, nostack),
                );
            },
        }
    };
}

impl FloatingPoint for Bfp {
    fn divide(&mut self, dividend: f64, divisor: f64) -> f64 {
        let mut quotient = dividend;
        // SAFETY: register-only arithmetic.
        unsafe {
            asm!(
                "ddbr {q},{d}",
                q = inout(freg) quotient,
                d = in(freg) divisor,
                options(pure, nomem, nostack),
            );
        }
        quotient
    }

    fn round_long(&mut self, mode: RoundingMode, value: f64) -> f64 {
        let rounded: f64;
        // SAFETY: register-only arithmetic.
        round_with_mode!(mode, "fidbra", rounded, value, freg);
        rounded
    }

    fn round_short(&mut self, mode: RoundingMode, value: f32) -> f32 {
        let rounded: f32;
        // SAFETY: register-only arithmetic.
        round_with_mode!(mode, "fiebra", rounded, value, freg);
        rounded
    }

    fn round_extended(&mut self, mode: RoundingMode, value: f64) -> f64 {
        let rounded: f64;
        // Extended operands live in the %f0/%f2 pair.
        // SAFETY: register-only arithmetic; the pair is declared clobbered.
        unsafe {
            match mode {
                RoundingMode::TowardZero => asm!(
                    "lxdbr %f0,{v}",
                    "fixbra %f0,5,%f0,0",
                    "ldxbr %f0,%f0",
                    "ldr {r},%f0",
                    v = in(freg) value,
                    r = lateout(freg) rounded,
                    out("f0") _,
                    out("f2") _,
                    options(pure, nomem, nostack),
                ),
                RoundingMode::PrepareForShorterPrecision => asm!(
                    "lxdbr %f0,{v}",
                    "fixbra %f0,3,%f0,0",
                    "ldxbr %f0,%f0",
                    "ldr {r},%f0",
                    v = in(freg) value,
                    r = lateout(freg) rounded,
                    out("f0") _,
                    out("f2") _,
                    options(pure, nomem, nostack),
                ),
            }
        }
        rounded
    }
}

/// Real storage accessed through its absolute address.
#[derive(Debug, Default, Copy, Clone)]
pub struct RealStorage;

impl StorageAccess for RealStorage {
    fn store(&mut self, addr: PhysicalAddress, value: u64) {
        // SAFETY: DAT is off; callers pass storage the arena handed out.
        unsafe { addr.as_mut_ptr::<u64>().write_volatile(value) }
    }

    fn load(&mut self, addr: PhysicalAddress) -> u64 {
        // SAFETY: as above.
        unsafe { addr.as_mut_ptr::<u64>().read_volatile() }
    }

    fn store_byte(&mut self, addr: PhysicalAddress, value: u8) {
        // Not a Rust store: the address may lie past the end of storage.
        // SAFETY: only called with an addressing exception expected.
        unsafe {
            asm!(
                "stc {v},0({a})",
                a = in(reg_addr) addr.as_u64(),
                v = in(reg) u32::from(value),
                options(nostack),
            );
        }
    }
}

/// Execute opcode 0x0000, which is not assigned.
///
/// Raises an operation exception; only call with a trap expected.
pub fn execute_unassigned_opcode() {
    // SAFETY: the interrupt is expected and resumes after the instruction.
    unsafe { asm!(".insn e,0x0000", options(nostack)) }
}

/// Store a doubleword to the highest possible address.
///
/// Raises an addressing exception; only call with a trap expected.
pub fn store_to_highest_address() {
    let addr: u64 = u64::MAX;
    // SAFETY: as above.
    unsafe {
        asm!(
            "stg {a},0({a})",
            a = in(reg_addr) addr,
            options(nostack),
        );
    }
}

/// The installed facilities, as stored by `stfle`.
pub fn store_facility_list() -> FacilityList {
    let mut words = [0u64; FACILITY_LIST_DOUBLEWORDS];
    // SAFETY: stores at most r0 + 1 doublewords into `words`.
    unsafe {
        asm!(
            "stfle 0({list})",
            list = in(reg_addr) words.as_mut_ptr(),
            inout("r0") FACILITY_LIST_DOUBLEWORDS as u64 - 1 => _,
            options(nostack),
        );
    }
    FacilityList::from_doublewords(words)
}

/// The vector registers. Requires the vector enablement control in CR0.
///
/// Operands travel through storage; %v1 to %v3 are scratch.
#[derive(Debug, Default, Copy, Clone)]
pub struct VectorRegisters;

impl VectorUnit for VectorRegisters {
    fn gather_word<const INDEX: u8>(
        &mut self,
        target: Vector,
        offsets: Vector,
        base: *const u8,
    ) -> Vector {
        let mut result = target;
        // SAFETY: the caller guarantees the selected word is readable.
        unsafe {
            asm!(
                "vl %v1,0({v1})",
                "vl %v2,0({v2})",
                "vgef %v1,0(%v2,{base}),{m3}",
                "vst %v1,0({v1})",
                v1 = in(reg_addr) &raw mut result,
                v2 = in(reg_addr) &raw const offsets,
                base = in(reg_addr) base,
                m3 = const INDEX,
                out("v1") _,
                out("v2") _,
                options(nostack),
            );
        }
        result
    }

    fn gather_doubleword<const INDEX: u8>(
        &mut self,
        target: Vector,
        offsets: Vector,
        base: *const u8,
    ) -> Vector {
        let mut result = target;
        // SAFETY: as above.
        unsafe {
            asm!(
                "vl %v1,0({v1})",
                "vl %v2,0({v2})",
                "vgeg %v1,0(%v2,{base}),{m3}",
                "vst %v1,0({v1})",
                v1 = in(reg_addr) &raw mut result,
                v2 = in(reg_addr) &raw const offsets,
                base = in(reg_addr) base,
                m3 = const INDEX,
                out("v1") _,
                out("v2") _,
                options(nostack),
            );
        }
        result
    }

    fn generate_byte_mask<const MASK: u16>(&mut self) -> Vector {
        let mut result = Vector::ZERO;
        // SAFETY: stores only into `result`.
        unsafe {
            asm!(
                "vgbm %v1,{i2}",
                "vst %v1,0({v1})",
                v1 = in(reg_addr) &raw mut result,
                i2 = const MASK,
                out("v1") _,
                options(nostack),
            );
        }
        result
    }

    fn generate_mask<const START: u8, const END: u8, const SIZE: u8>(&mut self) -> Vector {
        let mut result = Vector::ZERO;
        // SAFETY: stores only into `result`.
        unsafe {
            asm!(
                "vgm %v1,{i2},{i3},{m4}",
                "vst %v1,0({v1})",
                v1 = in(reg_addr) &raw mut result,
                i2 = const START,
                i3 = const END,
                m4 = const SIZE,
                out("v1") _,
                options(nostack),
            );
        }
        result
    }

    fn load_and_replicate<const SIZE: u8>(&mut self, data: &u64) -> Vector {
        let mut result = Vector::ZERO;
        // SAFETY: reads `data`, stores only into `result`.
        unsafe {
            asm!(
                "vlrep %v1,0({d2}),{m3}",
                "vst %v1,0({v1})",
                v1 = in(reg_addr) &raw mut result,
                d2 = in(reg_addr) ptr::from_ref(data),
                m3 = const SIZE,
                out("v1") _,
                options(nostack),
            );
        }
        result
    }

    fn extract_element<const SIZE: u8>(&mut self, source: Vector, index: u64) -> u64 {
        let element: u64;
        // SAFETY: reads `source` only.
        unsafe {
            asm!(
                "vl %v3,0({v3})",
                "vlgv {r1},%v3,0({b2}),{m4}",
                v3 = in(reg_addr) &raw const source,
                b2 = in(reg_addr) index,
                r1 = lateout(reg) element,
                m4 = const SIZE,
                out("v3") _,
                options(nostack, readonly),
            );
        }
        element
    }

    fn add<const SIZE: u8>(&mut self, augend: Vector, addend: Vector) -> Vector {
        let mut result = Vector::ZERO;
        // SAFETY: reads the operands, stores only into `result`.
        unsafe {
            asm!(
                "vl %v2,0({v2})",
                "vl %v3,0({v3})",
                "va %v1,%v2,%v3,{m4}",
                "vst %v1,0({v1})",
                v1 = in(reg_addr) &raw mut result,
                v2 = in(reg_addr) &raw const augend,
                v3 = in(reg_addr) &raw const addend,
                m4 = const SIZE,
                out("v1") _,
                out("v2") _,
                out("v3") _,
                options(nostack),
            );
        }
        result
    }

    fn execute_reserved(&mut self, encoding: ReservedEncoding) {
        let data: u64 = 0;
        // The assembler refuses reserved fields, so these are spelled out.
        // SAFETY: only called with a specification exception expected; the
        // interrupt resumes after the instruction.
        unsafe {
            match encoding {
                // vgef %v1,0(%v2),4
                ReservedEncoding::GatherWordIndex => asm!(
                    ".byte 0xe7,0x12,0x00,0x00,0x40,0x13",
                    out("v1") _,
                    options(nostack),
                ),
                // vgeg %v1,0(%v2),2
                ReservedEncoding::GatherDoublewordIndex => asm!(
                    ".byte 0xe7,0x12,0x00,0x00,0x20,0x12",
                    out("v1") _,
                    options(nostack),
                ),
                // vgm %v1,0,0,4
                ReservedEncoding::MaskQuadword => asm!(
                    ".byte 0xe7,0x10,0x00,0x00,0x40,0x46",
                    out("v1") _,
                    options(nostack),
                ),
                // vlrep %v1,0(%r1),4
                ReservedEncoding::ReplicateQuadword => asm!(
                    ".byte 0xe7,0x10,0x10,0x00,0x40,0x05",
                    in("r1") ptr::from_ref(&data),
                    out("v1") _,
                    options(nostack),
                ),
                // va %v1,%v2,%v3,5
                ReservedEncoding::AddReservedSize => asm!(
                    ".byte 0xe7,0x12,0x30,0x00,0x50,0xf3",
                    out("v1") _,
                    options(nostack),
                ),
            }
        }
    }
}
