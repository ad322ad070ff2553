use crate::command::{ResponseCode, SclpCommand};
use crate::read_info::ReadInfo;
use crate::sccb::Sccb;
use crate::servc::ServiceCall;
use kernel_report::FatalAbort;
use log::{debug, error, warn};

/// READ SCP INFO variants in the order they are tried.
pub const READ_INFO_COMMANDS: [SclpCommand; 2] =
    [SclpCommand::ReadScpInfoForced, SclpCommand::ReadScpInfo];

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadInfoError {
    #[error("{command} rejected: {code}")]
    Rejected {
        command: SclpCommand,
        code: ResponseCode,
    },
    #[error("no READ SCP INFO variant was accepted")]
    Exhausted,
}

/// Negotiate READ SCP INFO, advertising `length` bytes of `sccb`.
///
/// Commands are tried in [`READ_INFO_COMMANDS`] order. A variant that the
/// primitive refuses, or that the service processor reports as an invalid
/// command, moves on to the next one; any other response ends the
/// negotiation. Returns the command that succeeded.
///
/// # Errors
/// [`ReadInfoError::Rejected`] for a response that is neither success nor
/// "invalid command", [`ReadInfoError::Exhausted`] when every variant failed.
pub fn try_read_configuration<S>(
    sclp: &mut S,
    sccb: &mut Sccb,
    length: u16,
) -> Result<SclpCommand, ReadInfoError>
where
    S: ServiceCall + ?Sized,
{
    for command in READ_INFO_COMMANDS {
        sccb.prepare_request(length);
        debug!("sclp: issuing {command}");

        if let Err(e) = sclp.service_call(command, sccb) {
            warn!("sclp: {command} not accepted: {e}");
            continue;
        }

        match sccb.response_code() {
            code if code.is_success() => {
                debug!("sclp: {command} completed: {code}");
                return Ok(command);
            }
            ResponseCode::InvalidCommand => {
                warn!("sclp: {command} not recognized, falling back");
            }
            code => return Err(ReadInfoError::Rejected { command, code }),
        }
    }

    Err(ReadInfoError::Exhausted)
}

/// Obtain the configuration or stop the machine.
///
/// On success the payload of `sccb` holds the response; it is also returned
/// decoded. Without sizing information boot cannot continue, so any
/// negotiation failure ends in exactly one call of `abort`.
pub fn read_configuration<S, A>(
    sclp: &mut S,
    sccb: &mut Sccb,
    length: u16,
    abort: &A,
) -> ReadInfo
where
    S: ServiceCall + ?Sized,
    A: FatalAbort + ?Sized,
{
    match try_read_configuration(sclp, sccb, length) {
        Ok(_) => ReadInfo::from_sccb(sccb),
        Err(e) => {
            error!("sclp: READ_SCP_INFO failed: {e}");
            abort.abort(format_args!("READ_SCP_INFO failed: {e}"))
        }
    }
}
