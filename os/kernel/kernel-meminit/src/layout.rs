use kernel_info::memory::STORAGE_INCREMENT_UNIT_SHIFT;
use kernel_sclp::ReadInfo;

/// Storage geometry as reported by READ SCP INFO.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    /// Size of one storage increment in bytes.
    pub increment_size: u64,
    /// Largest storage size the configuration could ever provide, in bytes.
    ///
    /// Not all of it needs to be backed.
    pub max_ram_size: u64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("storage increment size is zero")]
    ZeroIncrementSize,
    #[error("maximum storage increment count is zero")]
    ZeroMaxIncrements,
    #[error("storage size does not fit into 64 bits")]
    Overflow,
}

impl StorageLayout {
    /// Derive the layout from the narrow or wide sizing fields.
    ///
    /// # Errors
    /// A zero increment size or increment count is rejected, as is a size
    /// that overflows.
    pub fn from_read_info(info: &ReadInfo) -> Result<Self, LayoutError> {
        let units = info.increment_size_units();
        if units == 0 {
            return Err(LayoutError::ZeroIncrementSize);
        }
        if units > u64::MAX >> STORAGE_INCREMENT_UNIT_SHIFT {
            return Err(LayoutError::Overflow);
        }
        let increment_size = units << STORAGE_INCREMENT_UNIT_SHIFT;

        let increments = info.max_increments();
        if increments == 0 {
            return Err(LayoutError::ZeroMaxIncrements);
        }
        let max_ram_size = increments
            .checked_mul(increment_size)
            .ok_or(LayoutError::Overflow)?;

        Ok(Self {
            increment_size,
            max_ram_size,
        })
    }

    /// Number of increments in [`StorageLayout::max_ram_size`].
    #[must_use]
    pub const fn max_increments(&self) -> u64 {
        self.max_ram_size / self.increment_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: u64 = 1 << 20;

    #[test]
    fn narrow_fields() {
        let info = ReadInfo {
            rnsize: 1,
            rnmax: 4,
            ..ReadInfo::default()
        };
        let layout = StorageLayout::from_read_info(&info).unwrap();
        assert_eq!(layout.increment_size, MIB);
        assert_eq!(layout.max_ram_size, 4 * MIB);
        assert_eq!(layout.max_increments(), 4);
    }

    #[test]
    fn wide_fields() {
        let info = ReadInfo {
            rnsize2: 2,
            rnmax2: 8,
            ..ReadInfo::default()
        };
        let layout = StorageLayout::from_read_info(&info).unwrap();
        assert_eq!(layout.increment_size, 2 * MIB);
        assert_eq!(layout.max_ram_size, 16 * MIB);
    }

    #[test]
    fn narrow_and_wide_pick_independently() {
        // narrow size, wide count
        let info = ReadInfo {
            rnsize: 4,
            rnmax2: 0x1_0000,
            ..ReadInfo::default()
        };
        let layout = StorageLayout::from_read_info(&info).unwrap();
        assert_eq!(layout.increment_size, 4 * MIB);
        assert_eq!(layout.max_ram_size, 0x1_0000 * 4 * MIB);
    }

    #[test]
    fn zero_fields_are_errors() {
        assert_eq!(
            StorageLayout::from_read_info(&ReadInfo::default()),
            Err(LayoutError::ZeroIncrementSize)
        );
        let info = ReadInfo {
            rnsize: 1,
            ..ReadInfo::default()
        };
        assert_eq!(
            StorageLayout::from_read_info(&info),
            Err(LayoutError::ZeroMaxIncrements)
        );
    }

    #[test]
    fn overflow_is_detected() {
        let info = ReadInfo {
            rnsize2: u32::MAX,
            rnmax2: u64::MAX,
            ..ReadInfo::default()
        };
        assert_eq!(
            StorageLayout::from_read_info(&info),
            Err(LayoutError::Overflow)
        );
    }
}
