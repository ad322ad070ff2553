/// The two-bit condition code of the PSW.
///
/// Privileged instructions such as `servc` and `tprot` report their outcome
/// only through the condition code; the usual way to get at it is
///
/// ```text
/// ipm   %rX        # insert program mask: CC lands in bits 34-35
/// srl   %rX, 28    # shift it down to bits 62-63
/// ```
///
/// which yields a value in `0..=3` for [`ConditionCode::from_ipm`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ConditionCode {
    Zero = 0,
    One = 1,
    Two = 2,
    Three = 3,
}

impl ConditionCode {
    /// Decode the value left in a register by `ipm` followed by `srl 28`.
    ///
    /// Bits above the condition code (the program mask) are ignored.
    #[inline]
    #[must_use]
    pub const fn from_ipm(raw: u32) -> Self {
        match raw & 0b11 {
            0 => Self::Zero,
            1 => Self::One,
            2 => Self::Two,
            _ => Self::Three,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        matches!(self, Self::Zero)
    }

    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}
