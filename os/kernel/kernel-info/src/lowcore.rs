//! # Lowcore Offsets
//!
//! Absolute offsets into the z/Architecture lowcore (prefix area) for the
//! fields the program-interrupt facility touches. The lowcore is addressed
//! with real addresses; with a zero prefix these are also absolute addresses.

/// Size of the z/Architecture lowcore.
pub const LOWCORE_SIZE: u64 = 0x2000;

/// Program-interruption identification: the instruction-length code of the
/// interrupted instruction, already scaled to bytes.
pub const PGM_INT_ID: u64 = 0x8c;

/// Program-interruption code.
pub const PGM_INT_CODE: u64 = 0x8e;

/// Program old PSW, stored by the CPU when a program interrupt is taken.
pub const PGM_OLD_PSW: u64 = 0x150;

/// Program new PSW, loaded by the CPU when a program interrupt is taken.
pub const PGM_NEW_PSW: u64 = 0x1d0;

/// Software-defined save area for general registers 0-15 during interrupt handling.
pub const SW_INT_GRS: u64 = 0x200;

/// Software-defined save area for the floating-point control register.
pub const SW_INT_FPC: u64 = 0x280;

/// Software-defined save area for vector registers 0-31, 16 bytes each.
///
/// The floating-point registers are the leftmost halves of vector
/// registers 0-15 and are saved with them.
pub const SW_INT_VRS: u64 = 0x400;

/// Size of [`SW_INT_VRS`].
pub const SW_INT_VRS_SIZE: u64 = 32 * 16;

const _: () = {
    assert!(PGM_OLD_PSW.is_multiple_of(16));
    assert!(PGM_NEW_PSW.is_multiple_of(16));
    assert!(SW_INT_GRS + 16 * 8 <= SW_INT_FPC);
    assert!(SW_INT_FPC + 4 <= SW_INT_VRS);
    assert!(SW_INT_VRS.is_multiple_of(16));
    // vstm/vlm address the area with a 12-bit displacement and no base.
    assert!(SW_INT_VRS + SW_INT_VRS_SIZE <= 0x1000);
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_areas_do_not_overlap_the_interrupt_fields() {
        let areas = [
            (SW_INT_GRS, 16 * 8),
            (SW_INT_FPC, 4),
            (SW_INT_VRS, SW_INT_VRS_SIZE),
        ];
        for (start, len) in areas {
            for field in [PGM_INT_ID, PGM_INT_CODE, PGM_OLD_PSW, PGM_NEW_PSW] {
                assert!(!(start..start + len).contains(&field), "{field:#x} in {start:#x}");
            }
        }
        for pair in areas.windows(2) {
            assert!(pair[0].0 + pair[0].1 <= pair[1].0);
        }
    }

    #[test]
    fn upper_vector_half_starts_256_bytes_in() {
        // The stub stores %v16-%v31 at SW_INT_VRS + 256.
        assert_eq!(SW_INT_VRS_SIZE / 2, 256);
        assert!(SW_INT_VRS + 256 + 16 * 16 <= 0x1000);
    }
}
