//! Installed facilities as stored by STORE FACILITY LIST EXTENDED.

/// Doublewords requested from `stfle`; covers facility bits 0-255.
pub const FACILITY_LIST_DOUBLEWORDS: usize = 4;

/// Vector facility for z/Architecture.
pub const VECTOR_FACILITY: u32 = 129;

/// The facility list, bit 0 being the leftmost bit of the first doubleword.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct FacilityList([u64; FACILITY_LIST_DOUBLEWORDS]);

impl FacilityList {
    #[must_use]
    pub const fn from_doublewords(words: [u64; FACILITY_LIST_DOUBLEWORDS]) -> Self {
        Self(words)
    }

    /// Bits past the stored list read as not installed.
    #[must_use]
    pub const fn is_installed(&self, facility: u32) -> bool {
        let word = (facility / 64) as usize;
        if word >= FACILITY_LIST_DOUBLEWORDS {
            return false;
        }
        self.0[word] & (1 << (63 - facility % 64)) != 0
    }
}
