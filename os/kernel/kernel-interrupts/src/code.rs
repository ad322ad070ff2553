use core::fmt;

/// Program-interruption code as stored at lowcore offset `0x8e`.
///
/// Bits above the low seven carry PER and transaction indications and are
/// ignored by [`ProgramInterruptCode::exception`].
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct ProgramInterruptCode(u16);

impl ProgramInterruptCode {
    pub const OPERATION: Self = Self(0x01);
    pub const PRIVILEGED_OPERATION: Self = Self(0x02);
    pub const EXECUTE: Self = Self(0x03);
    pub const PROTECTION: Self = Self(0x04);
    pub const ADDRESSING: Self = Self(0x05);
    pub const SPECIFICATION: Self = Self(0x06);
    pub const DATA: Self = Self(0x07);
    pub const FIXED_POINT_OVERFLOW: Self = Self(0x08);
    pub const FIXED_POINT_DIVIDE: Self = Self(0x09);
    pub const HFP_DIVIDE: Self = Self(0x0f);
    pub const SEGMENT_TRANSLATION: Self = Self(0x10);
    pub const PAGE_TRANSLATION: Self = Self(0x11);
    pub const TRACE_TABLE: Self = Self(0x16);
    pub const ASCE_TYPE: Self = Self(0x38);
    pub const REGION_FIRST_TRANSLATION: Self = Self(0x39);
    pub const REGION_SECOND_TRANSLATION: Self = Self(0x3a);
    pub const REGION_THIRD_TRANSLATION: Self = Self(0x3b);

    #[inline]
    #[must_use]
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// The exception-type part of the code.
    #[inline]
    #[must_use]
    pub const fn exception(self) -> u8 {
        (self.0 & 0x7f) as u8
    }

    /// Whether the exception nullifies the instruction.
    ///
    /// The old PSW then still points at the faulting instruction and must be
    /// moved past it, otherwise returning re-executes it forever.
    #[must_use]
    pub const fn is_nullifying(self) -> bool {
        matches!(
            self.exception(),
            0x10 | 0x11 | 0x16 | 0x20..=0x2e | 0x30..=0x34 | 0x38..=0x3b
        )
    }

    /// Addressing and protection exceptions mark the end of usable storage.
    #[must_use]
    pub const fn is_storage_boundary(self) -> bool {
        matches!(self.exception(), 0x04 | 0x05)
    }

    const fn name(self) -> Option<&'static str> {
        Some(match self.exception() {
            0x01 => "operation",
            0x02 => "privileged operation",
            0x03 => "execute",
            0x04 => "protection",
            0x05 => "addressing",
            0x06 => "specification",
            0x07 => "data",
            0x08 => "fixed-point overflow",
            0x09 => "fixed-point divide",
            0x0f => "HFP divide",
            0x10 => "segment translation",
            0x11 => "page translation",
            0x16 => "trace table",
            0x38 => "ASCE type",
            0x39 => "region-first translation",
            0x3a => "region-second translation",
            0x3b => "region-third translation",
            _ => return None,
        })
    }
}

impl fmt::Debug for ProgramInterruptCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProgramInterruptCode({:#06x})", self.0)
    }
}

impl fmt::Display for ProgramInterruptCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name} exception ({:#04x})", self.0),
            None => write!(f, "program interrupt {:#04x}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_codes() {
        assert!(ProgramInterruptCode::ADDRESSING.is_storage_boundary());
        assert!(ProgramInterruptCode::PROTECTION.is_storage_boundary());
        assert!(!ProgramInterruptCode::SPECIFICATION.is_storage_boundary());
        // PER bit set on top of an addressing exception
        assert!(ProgramInterruptCode::new(0x85).is_storage_boundary());
    }

    #[test]
    fn translation_exceptions_nullify() {
        assert!(ProgramInterruptCode::PAGE_TRANSLATION.is_nullifying());
        assert!(ProgramInterruptCode::REGION_THIRD_TRANSLATION.is_nullifying());
        assert!(ProgramInterruptCode::new(0x2a).is_nullifying());
        assert!(!ProgramInterruptCode::OPERATION.is_nullifying());
        assert!(!ProgramInterruptCode::ADDRESSING.is_nullifying());
    }

    #[test]
    fn display() {
        assert_eq!(
            ProgramInterruptCode::ADDRESSING.to_string(),
            "addressing exception (0x05)"
        );
        assert_eq!(
            ProgramInterruptCode::new(0x40).to_string(),
            "program interrupt 0x40"
        );
    }
}
