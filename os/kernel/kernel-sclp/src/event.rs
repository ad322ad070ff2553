use crate::command::{ResponseCode, SclpCommand};
use crate::sccb::{FC_NORMAL_WRITE, Sccb, SccbHeader};
use crate::servc::{ServiceCall, ServiceCallError};
use kernel_info::memory::SCCB_SIZE;
use utils_sccb_derive::SccbLayout;

/// Event type of ASCII console data.
pub const EVENT_TYPE_ASCII_CONSOLE: u8 = 0x1a;

/// Offset of the event payload from the start of the SCCB.
pub const EVENT_DATA_OFFSET: usize = SccbHeader::ENCODED_LEN + EventBufferHeader::LEN;

/// Largest payload a single write-event SCCB can carry.
pub const MAX_EVENT_DATA: usize = SCCB_SIZE - EVENT_DATA_OFFSET;

/// Event buffer header following the SCCB header of a WRITE EVENT DATA block.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, SccbLayout)]
pub struct EventBufferHeader {
    /// Length of this header plus the event data.
    #[sccb(offset = 8)]
    pub length: u16,
    #[sccb(offset = 10)]
    pub event_type: u8,
    #[sccb(offset = 11)]
    pub flags: u8,
    #[sccb(offset = 12)]
    pub reserved: u16,
}

impl EventBufferHeader {
    /// Size of the header itself.
    pub const LEN: usize = 6;
}

const _: () =
    assert!(EventBufferHeader::ENCODED_LEN == SccbHeader::ENCODED_LEN + EventBufferHeader::LEN);

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsoleError {
    #[error("console line of {len} bytes exceeds {max} bytes")]
    TooLong { len: usize, max: usize },
    #[error(transparent)]
    ServiceCall(#[from] ServiceCallError),
    #[error("WRITE_EVENT_DATA rejected: {0}")]
    Rejected(ResponseCode),
}

impl Sccb {
    /// Lay out an ASCII console event carrying `text`.
    ///
    /// # Errors
    /// [`ConsoleError::TooLong`] if `text` does not fit into one block.
    pub fn prepare_ascii_event(&mut self, text: &[u8]) -> Result<(), ConsoleError> {
        let too_long = ConsoleError::TooLong {
            len: text.len(),
            max: MAX_EVENT_DATA,
        };
        if text.len() > MAX_EVENT_DATA {
            return Err(too_long);
        }
        let total = u16::try_from(EVENT_DATA_OFFSET + text.len()).map_err(|_| too_long)?;
        let event = u16::try_from(EventBufferHeader::LEN + text.len()).map_err(|_| too_long)?;

        self.set_header(&SccbHeader {
            length: total,
            function_code: FC_NORMAL_WRITE,
            control_mask: [0; 3],
            response_code: 0,
        });
        let stored = EventBufferHeader {
            length: event,
            event_type: EVENT_TYPE_ASCII_CONSOLE,
            flags: 0,
            reserved: 0,
        }
        .encode(self.as_bytes_mut());
        debug_assert!(stored.is_some());

        self.as_bytes_mut()[EVENT_DATA_OFFSET..EVENT_DATA_OFFSET + text.len()]
            .copy_from_slice(text);
        Ok(())
    }

    /// The payload of an ASCII console event, as laid out by [`Sccb::prepare_ascii_event`].
    #[must_use]
    pub fn ascii_event_data(&self) -> &[u8] {
        let len = EventBufferHeader::decode(self.as_bytes())
            .map_or(0, |h| usize::from(h.length).saturating_sub(EventBufferHeader::LEN));
        let end = (EVENT_DATA_OFFSET + len).min(SCCB_SIZE);
        &self.as_bytes()[EVENT_DATA_OFFSET..end]
    }
}

/// Send one line of text to the hypervisor's ASCII console.
///
/// # Errors
/// See [`ConsoleError`]. Callers writing log output usually drop the line.
pub fn write_console<S>(sclp: &mut S, sccb: &mut Sccb, text: &[u8]) -> Result<(), ConsoleError>
where
    S: ServiceCall + ?Sized,
{
    sccb.prepare_ascii_event(text)?;
    sclp.service_call(SclpCommand::WriteEventData, sccb)?;
    match sccb.response_code() {
        code if code.is_success() => Ok(()),
        code => Err(ConsoleError::Rejected(code)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lays_out_event_after_header() {
        let mut sccb = Sccb::new();
        sccb.prepare_ascii_event(b"hello\n").unwrap();

        let bytes = sccb.as_bytes();
        assert_eq!(&bytes[0..2], &20u16.to_be_bytes());
        assert_eq!(&bytes[8..10], &12u16.to_be_bytes());
        assert_eq!(bytes[10], EVENT_TYPE_ASCII_CONSOLE);
        assert_eq!(&bytes[14..20], b"hello\n");
        assert_eq!(sccb.ascii_event_data(), b"hello\n");
    }

    #[test]
    fn rejects_oversized_text() {
        let mut sccb = Sccb::new();
        let text = [b'x'; MAX_EVENT_DATA + 1];
        assert_eq!(
            sccb.prepare_ascii_event(&text),
            Err(ConsoleError::TooLong {
                len: MAX_EVENT_DATA + 1,
                max: MAX_EVENT_DATA
            })
        );
        assert!(sccb.prepare_ascii_event(&text[..MAX_EVENT_DATA]).is_ok());
    }
}
