use crate::command::ResponseCode;
use kernel_info::memory::SCCB_SIZE;
use utils_sccb_derive::SccbLayout;

/// Function code "normal write"; the only one the client ever requests.
pub const FC_NORMAL_WRITE: u8 = 0;

/// Control mask requesting a variable-length response.
///
/// Without it, newer machines truncate READ SCP INFO before the wide
/// (`rnsize2`/`rnmax2`) fields.
pub const CONTROL_MASK_VARIABLE_RESPONSE: [u8; 3] = [0, 0, 0x80];

/// The 8-byte header at the start of every SCCB.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, SccbLayout)]
pub struct SccbHeader {
    /// Total length of the block the service processor may use.
    #[sccb(offset = 0)]
    pub length: u16,
    #[sccb(offset = 2)]
    pub function_code: u8,
    #[sccb(offset = 3)]
    pub control_mask: [u8; 3],
    /// Written by the service processor.
    #[sccb(offset = 6)]
    pub response_code: u16,
}

/// A page-sized, page-aligned service-call control block.
///
/// The service processor receives the block's real address, so it must not
/// move while a call is in flight; callers keep it in a `static` or on the
/// boot stack and lend it out by `&mut`.
#[repr(C, align(4096))]
pub struct Sccb([u8; SCCB_SIZE]);

const _: () = {
    assert!(core::mem::align_of::<Sccb>() == SCCB_SIZE);
    assert!(SccbHeader::ENCODED_LEN <= SCCB_SIZE);
    assert!(SCCB_SIZE <= 0xffff);
};

impl Default for Sccb {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Sccb {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Sccb")
            .field("header", &self.header())
            .finish_non_exhaustive()
    }
}

impl Sccb {
    #[must_use]
    pub const fn new() -> Self {
        Self([0; SCCB_SIZE])
    }

    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; SCCB_SIZE] {
        &self.0
    }

    #[inline]
    pub const fn as_bytes_mut(&mut self) -> &mut [u8; SCCB_SIZE] {
        &mut self.0
    }

    #[inline]
    pub const fn as_mut_ptr(&mut self) -> *mut u8 {
        self.0.as_mut_ptr()
    }

    #[must_use]
    pub fn header(&self) -> SccbHeader {
        // The header always fits (see the const assertion above).
        SccbHeader::decode(&self.0).unwrap_or_default()
    }

    pub fn set_header(&mut self, header: &SccbHeader) {
        let stored = header.encode(&mut self.0);
        debug_assert!(stored.is_some());
    }

    /// Reset the header for a new request advertising `length` bytes.
    ///
    /// Sets the normal-write function code and the variable-response control
    /// mask, and clears the previous response code. The payload is left as is.
    pub fn prepare_request(&mut self, length: u16) {
        self.set_header(&SccbHeader {
            length,
            function_code: FC_NORMAL_WRITE,
            control_mask: CONTROL_MASK_VARIABLE_RESPONSE,
            response_code: 0,
        });
    }

    #[must_use]
    pub fn response_code(&self) -> ResponseCode {
        ResponseCode::from(self.header().response_code)
    }

    /// Store a response code, as the service processor does on completion.
    pub fn set_response_code(&mut self, code: ResponseCode) {
        let mut header = self.header();
        header.response_code = code.raw();
        self.set_header(&header);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepare_request_writes_big_endian_header() {
        let mut sccb = Sccb::new();
        sccb.as_bytes_mut()[6] = 0xde;
        sccb.as_bytes_mut()[7] = 0xad;
        sccb.as_bytes_mut()[8] = 0x55;

        sccb.prepare_request(0x1000);

        assert_eq!(&sccb.as_bytes()[..8], &[0x10, 0x00, 0, 0, 0, 0x80, 0, 0]);
        // payload untouched
        assert_eq!(sccb.as_bytes()[8], 0x55);
    }

    #[test]
    fn response_code_round_trips_through_header() {
        let mut sccb = Sccb::new();
        sccb.prepare_request(4096);
        sccb.set_response_code(ResponseCode::InvalidCommand);

        assert_eq!(&sccb.as_bytes()[6..8], &[0x01, 0xf0]);
        assert_eq!(sccb.response_code(), ResponseCode::InvalidCommand);
        assert_eq!(sccb.header().length, 4096);
    }

    #[test]
    fn is_page_aligned() {
        let sccb = Sccb::new();
        assert_eq!(core::ptr::from_ref(&sccb).addr() % SCCB_SIZE, 0);
    }
}
