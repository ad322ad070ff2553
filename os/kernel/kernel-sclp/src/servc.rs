use crate::command::SclpCommand;
use crate::sccb::Sccb;
use kernel_registers::ConditionCode;

/// The privileged service-call primitive.
///
/// Blocks until the service processor has accepted (or refused) the request.
/// On `Ok`, the response code in the SCCB header is valid.
pub trait ServiceCall {
    /// Issue `command` against `sccb`.
    ///
    /// # Errors
    /// Returns [`ServiceCallError`] if the instruction did not accept the request;
    /// the SCCB contents are then unspecified.
    fn service_call(
        &mut self,
        command: SclpCommand,
        sccb: &mut Sccb,
    ) -> Result<(), ServiceCallError>;
}

impl<S> ServiceCall for &mut S
where
    S: ServiceCall + ?Sized,
{
    fn service_call(
        &mut self,
        command: SclpCommand,
        sccb: &mut Sccb,
    ) -> Result<(), ServiceCallError> {
        (**self).service_call(command, sccb)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceCallError {
    #[error("service processor busy (cc 2)")]
    Busy,
    #[error("service-call facility not operational (cc 3)")]
    NotOperational,
}

impl ServiceCallError {
    /// Map the condition code left by `servc`.
    ///
    /// # Errors
    /// cc 2 and cc 3 are refusals; cc 0 and cc 1 mean the request was accepted.
    pub const fn check(cc: ConditionCode) -> Result<(), Self> {
        match cc {
            ConditionCode::Zero | ConditionCode::One => Ok(()),
            ConditionCode::Two => Err(Self::Busy),
            ConditionCode::Three => Err(Self::NotOperational),
        }
    }
}

/// `servc` on real hardware or under a hypervisor.
#[cfg(target_arch = "s390x")]
#[derive(Debug, Default, Copy, Clone)]
pub struct Servc;

#[cfg(target_arch = "s390x")]
impl ServiceCall for Servc {
    fn service_call(
        &mut self,
        command: SclpCommand,
        sccb: &mut Sccb,
    ) -> Result<(), ServiceCallError> {
        let cc: u32;
        // SAFETY: Supervisor state with DAT off; the SCCB is page-aligned, lives
        // below 2 GiB and is exclusively borrowed for the duration of the call.
        unsafe {
            core::arch::asm!(
                ".insn rre,0xb2200000,{cmd},{sccb}",
                "ipm {cc}",
                "srl {cc},28",
                cmd = in(reg) u64::from(command.word()),
                sccb = in(reg) sccb.as_mut_ptr(),
                cc = out(reg) cc,
                options(nostack),
            );
        }
        ServiceCallError::check(ConditionCode::from_ipm(cc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_codes() {
        assert_eq!(ServiceCallError::check(ConditionCode::Zero), Ok(()));
        assert_eq!(
            ServiceCallError::check(ConditionCode::Two),
            Err(ServiceCallError::Busy)
        );
        assert_eq!(
            ServiceCallError::check(ConditionCode::Three),
            Err(ServiceCallError::NotOperational)
        );
    }
}
