use crate::command::{ResponseCode, SclpCommand};
use crate::read_info::ReadInfo;
use crate::sccb::{Sccb, SccbHeader};
use crate::servc::{ServiceCall, ServiceCallError};

/// Number of calls [`SimulatedSclp`] keeps a record of.
const MAX_RECORDED_CALLS: usize = 16;

/// Size of the captured console output.
const CONSOLE_CAPACITY: usize = 1024;

/// How the simulated service processor answers a command.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SimulatedReply {
    /// Accept the call and store this response code.
    Respond(ResponseCode),
    /// Refuse the call at the instruction level; the SCCB is not touched.
    Refuse(ServiceCallError),
}

/// Scripted service processor.
///
/// Answers READ SCP INFO with a fixed [`ReadInfo`] whenever the scripted
/// response is a success, records every command it sees and captures console
/// output.
#[derive(Debug)]
pub struct SimulatedSclp {
    read_info: ReadInfo,
    forced: SimulatedReply,
    legacy: SimulatedReply,
    write_event: SimulatedReply,
    calls: [Option<SclpCommand>; MAX_RECORDED_CALLS],
    call_count: usize,
    last_request: Option<SccbHeader>,
    console: [u8; CONSOLE_CAPACITY],
    console_len: usize,
}

impl SimulatedSclp {
    /// A machine that supports the forced READ SCP INFO variant.
    #[must_use]
    pub const fn new(read_info: ReadInfo) -> Self {
        Self {
            read_info,
            forced: SimulatedReply::Respond(ResponseCode::NormalReadCompletion),
            legacy: SimulatedReply::Respond(ResponseCode::NormalReadCompletion),
            write_event: SimulatedReply::Respond(ResponseCode::NormalCompletion),
            calls: [None; MAX_RECORDED_CALLS],
            call_count: 0,
            last_request: None,
            console: [0; CONSOLE_CAPACITY],
            console_len: 0,
        }
    }

    #[must_use]
    pub const fn with_forced(mut self, reply: SimulatedReply) -> Self {
        self.forced = reply;
        self
    }

    #[must_use]
    pub const fn with_legacy(mut self, reply: SimulatedReply) -> Self {
        self.legacy = reply;
        self
    }

    #[must_use]
    pub const fn with_write_event(mut self, reply: SimulatedReply) -> Self {
        self.write_event = reply;
        self
    }

    /// Total number of calls, including ones beyond the recorded window.
    #[must_use]
    pub const fn call_count(&self) -> usize {
        self.call_count
    }

    /// The recorded commands, oldest first.
    pub fn calls(&self) -> impl Iterator<Item = SclpCommand> + '_ {
        self.calls.iter().flatten().copied()
    }

    /// The header of the most recent request as the client prepared it.
    #[must_use]
    pub const fn last_request(&self) -> Option<SccbHeader> {
        self.last_request
    }

    /// Everything written to the console so far.
    #[must_use]
    pub fn console(&self) -> &[u8] {
        &self.console[..self.console_len]
    }

    const fn reply_for(&self, command: SclpCommand) -> SimulatedReply {
        match command {
            SclpCommand::ReadScpInfoForced => self.forced,
            SclpCommand::ReadScpInfo => self.legacy,
            SclpCommand::WriteEventData => self.write_event,
        }
    }

    fn capture_console(&mut self, sccb: &Sccb) {
        let data = sccb.ascii_event_data();
        let room = CONSOLE_CAPACITY - self.console_len;
        let n = data.len().min(room);
        self.console[self.console_len..self.console_len + n].copy_from_slice(&data[..n]);
        self.console_len += n;
    }
}

impl ServiceCall for SimulatedSclp {
    fn service_call(
        &mut self,
        command: SclpCommand,
        sccb: &mut Sccb,
    ) -> Result<(), ServiceCallError> {
        if let Some(slot) = self.calls.get_mut(self.call_count) {
            *slot = Some(command);
        }
        self.call_count += 1;
        self.last_request = Some(sccb.header());

        let code = match self.reply_for(command) {
            SimulatedReply::Refuse(e) => return Err(e),
            SimulatedReply::Respond(code) => code,
        };

        if code.is_success() {
            match command {
                SclpCommand::ReadScpInfo | SclpCommand::ReadScpInfoForced => {
                    self.read_info.store(sccb);
                }
                SclpCommand::WriteEventData => self.capture_console(sccb),
            }
        }
        sccb.set_response_code(code);
        Ok(())
    }
}
