use core::fmt;

/// SCLP command words issued through `servc`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum SclpCommand {
    /// Read SCP information.
    ReadScpInfo = 0x0002_0001,
    /// Read SCP information, forced variant.
    ///
    /// Preferred where available; older machines reject it as invalid.
    ReadScpInfoForced = 0x0012_0001,
    /// Write event data (console output).
    WriteEventData = 0x0076_0005,
}

impl SclpCommand {
    #[inline]
    #[must_use]
    pub const fn word(self) -> u32 {
        self as u32
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ReadScpInfo => "READ_SCP_INFO",
            Self::ReadScpInfoForced => "READ_SCP_INFO_FORCED",
            Self::WriteEventData => "WRITE_EVENT_DATA",
        }
    }
}

impl fmt::Display for SclpCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:#010x})", self.name(), self.word())
    }
}

/// Response code stored by the service processor in the SCCB header.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ResponseCode {
    /// `0x0010`: the read completed normally.
    NormalReadCompletion,
    /// `0x0020`: the command completed normally.
    NormalCompletion,
    /// `0x0100`: the SCCB crosses a boundary it must not cross.
    SccbBoundaryViolation,
    /// `0x01F0`: the command word is not recognized.
    InvalidCommand,
    /// `0x0300`: the advertised SCCB length is too small for the response.
    InsufficientSccbLength,
    Other(u16),
}

impl ResponseCode {
    #[must_use]
    pub const fn raw(self) -> u16 {
        match self {
            Self::NormalReadCompletion => 0x0010,
            Self::NormalCompletion => 0x0020,
            Self::SccbBoundaryViolation => 0x0100,
            Self::InvalidCommand => 0x01f0,
            Self::InsufficientSccbLength => 0x0300,
            Self::Other(code) => code,
        }
    }

    /// Both normal completions count as success.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::NormalReadCompletion | Self::NormalCompletion)
    }
}

impl From<u16> for ResponseCode {
    fn from(code: u16) -> Self {
        match code {
            0x0010 => Self::NormalReadCompletion,
            0x0020 => Self::NormalCompletion,
            0x0100 => Self::SccbBoundaryViolation,
            0x01f0 => Self::InvalidCommand,
            0x0300 => Self::InsufficientSccbLength,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NormalReadCompletion => "normal read completion",
            Self::NormalCompletion => "normal completion",
            Self::SccbBoundaryViolation => "SCCB boundary violation",
            Self::InvalidCommand => "invalid command",
            Self::InsufficientSccbLength => "insufficient SCCB length",
            Self::Other(_) => "unknown",
        };
        write!(f, "{name} ({:#06x})", self.raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_decode_to_variants() {
        for code in [0x0010, 0x0020, 0x0100, 0x01f0, 0x0300] {
            let decoded = ResponseCode::from(code);
            assert!(!matches!(decoded, ResponseCode::Other(_)), "{code:#x}");
            assert_eq!(decoded.raw(), code);
        }
        assert_eq!(ResponseCode::from(0x0040), ResponseCode::Other(0x0040));
    }

    #[test]
    fn only_normal_completions_succeed() {
        assert!(ResponseCode::NormalReadCompletion.is_success());
        assert!(ResponseCode::NormalCompletion.is_success());
        assert!(!ResponseCode::InvalidCommand.is_success());
        assert!(!ResponseCode::Other(0).is_success());
    }

    #[test]
    fn display() {
        assert_eq!(
            SclpCommand::ReadScpInfoForced.to_string(),
            "READ_SCP_INFO_FORCED (0x00120001)"
        );
        assert_eq!(
            ResponseCode::InvalidCommand.to_string(),
            "invalid command (0x01f0)"
        );
    }
}
