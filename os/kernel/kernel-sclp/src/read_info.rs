use crate::sccb::Sccb;
use utils_sccb_derive::SccbLayout;

/// Payload of a READ SCP INFO response, at its offsets from the SCCB start.
///
/// Storage sizing comes in two encodings. The narrow `rnsize`/`rnmax` pair
/// predates large machines; when it reads zero, the wide `rnsize2`/`rnmax2`
/// pair holds the value instead.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, SccbLayout)]
pub struct ReadInfo {
    /// Maximum number of storage increments (narrow).
    #[sccb(offset = 8)]
    pub rnmax: u16,
    /// Storage increment size in MiB (narrow).
    #[sccb(offset = 10)]
    pub rnsize: u8,
    #[sccb(offset = 16)]
    pub entries_cpu: u16,
    #[sccb(offset = 18)]
    pub offset_cpu: u16,
    /// Load parameter, EBCDIC.
    #[sccb(offset = 24)]
    pub loadparm: [u8; 8],
    #[sccb(offset = 48)]
    pub facilities: u64,
    /// Storage increment size in MiB (wide).
    #[sccb(offset = 100)]
    pub rnsize2: u32,
    /// Maximum number of storage increments (wide).
    #[sccb(offset = 104)]
    pub rnmax2: u64,
}

const _: () = assert!(ReadInfo::ENCODED_LEN == 112);

impl ReadInfo {
    /// Decode the payload of a completed READ SCP INFO block.
    #[must_use]
    pub fn from_sccb(sccb: &Sccb) -> Self {
        Self::decode(sccb.as_bytes()).unwrap_or_default()
    }

    /// Write the payload into `sccb`, leaving the header alone.
    pub fn store(&self, sccb: &mut Sccb) {
        let stored = self.encode(sccb.as_bytes_mut());
        debug_assert!(stored.is_some());
    }

    /// Storage increment size in 1 MiB units, whichever encoding carries it.
    #[must_use]
    pub fn increment_size_units(&self) -> u64 {
        narrow_unless_zero(u64::from(self.rnsize), u64::from(self.rnsize2))
    }

    /// Maximum number of storage increments, whichever encoding carries it.
    #[must_use]
    pub fn max_increments(&self) -> u64 {
        narrow_unless_zero(u64::from(self.rnmax), self.rnmax2)
    }
}

/// `narrow` unless it is zero, then `wide`.
///
/// ```
/// # use kernel_sclp::narrow_unless_zero;
/// assert_eq!(narrow_unless_zero(4, 8), 4);
/// assert_eq!(narrow_unless_zero(0, 8), 8);
/// assert_eq!(narrow_unless_zero(0, 0), 0);
/// ```
#[inline]
#[must_use]
pub const fn narrow_unless_zero(narrow: u64, wide: u64) -> u64 {
    if narrow != 0 { narrow } else { wide }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_fields_at_architected_offsets() {
        let mut sccb = Sccb::new();
        let bytes = sccb.as_bytes_mut();
        bytes[8..10].copy_from_slice(&[0x01, 0x02]);
        bytes[10] = 0x80;
        bytes[24..32].copy_from_slice(b"\xd3\xd6\xc1\xc4\x40\x40\x40\x40");
        bytes[100..104].copy_from_slice(&0x0000_0100_u32.to_be_bytes());
        bytes[104..112].copy_from_slice(&0x0001_0000_0000_u64.to_be_bytes());

        let ri = ReadInfo::from_sccb(&sccb);
        assert_eq!(ri.rnmax, 0x0102);
        assert_eq!(ri.rnsize, 0x80);
        assert_eq!(ri.loadparm[0], 0xd3);
        assert_eq!(ri.rnsize2, 0x100);
        assert_eq!(ri.rnmax2, 0x1_0000_0000);
    }

    #[test]
    fn narrow_fields_win_when_nonzero() {
        let ri = ReadInfo {
            rnsize: 1,
            rnmax: 4,
            rnsize2: 99,
            rnmax2: 99,
            ..ReadInfo::default()
        };
        assert_eq!(ri.increment_size_units(), 1);
        assert_eq!(ri.max_increments(), 4);
    }

    #[test]
    fn wide_fields_used_when_narrow_zero() {
        let ri = ReadInfo {
            rnsize2: 2,
            rnmax2: 8,
            ..ReadInfo::default()
        };
        assert_eq!(ri.increment_size_units(), 2);
        assert_eq!(ri.max_increments(), 8);
    }

    #[test]
    fn store_leaves_header_alone() {
        let mut sccb = Sccb::new();
        sccb.prepare_request(4096);
        let ri = ReadInfo {
            rnsize: 1,
            rnmax: 4,
            ..ReadInfo::default()
        };
        ri.store(&mut sccb);
        assert_eq!(sccb.header().length, 4096);
        assert_eq!(ReadInfo::from_sccb(&sccb), ri);
    }
}
