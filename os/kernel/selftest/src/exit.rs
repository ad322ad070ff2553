use kernel_report::ExitStatus;

/// The value printed as `EXIT: STATUS=<n>`.
///
/// The low bit is always set so that a harness can tell a reported status
/// from a hypervisor that died without printing anything.
#[must_use]
pub const fn exit_status_word(status: ExitStatus) -> u32 {
    (status.code() << 1) | 1
}
