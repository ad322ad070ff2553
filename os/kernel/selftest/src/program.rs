//! Program interrupt checks.

use core::fmt;
use kernel_interrupts::{ProgramInterruptCode, TrapInterception, with_expected_trap};
use kernel_report::Report;
use log::info;

/// Run `trigger` with a trap expected and report whether exactly `expected`
/// was taken.
pub fn check_program_interrupt<T, F>(
    report: &mut Report,
    traps: &mut T,
    name: impl fmt::Display,
    expected: ProgramInterruptCode,
    trigger: F,
) -> bool
where
    T: TrapInterception + ?Sized,
    F: FnOnce(),
{
    let ((), trap) = with_expected_trap(traps, trigger);
    match trap {
        Some(code) if code == expected => {}
        Some(code) => info!("expected {expected}, got {code}"),
        None => info!("expected {expected}, got no program interrupt"),
    }
    report.report(name, trap == Some(expected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel_interrupts::SimulatedTraps;

    #[test]
    fn matching_code_passes() {
        let traps = SimulatedTraps::new();
        let mut report = Report::new();
        let pass = check_program_interrupt(
            &mut report,
            &mut &traps,
            "operation",
            ProgramInterruptCode::OPERATION,
            || traps.deliver(ProgramInterruptCode::OPERATION),
        );
        assert!(pass);
        assert_eq!(report.failures(), 0);
        assert!(!traps.is_armed());
    }

    #[test]
    fn other_code_fails() {
        let traps = SimulatedTraps::new();
        let mut report = Report::new();
        let pass = check_program_interrupt(
            &mut report,
            &mut &traps,
            "addressing",
            ProgramInterruptCode::ADDRESSING,
            || traps.deliver(ProgramInterruptCode::PROTECTION),
        );
        assert!(!pass);
        assert_eq!(report.failures(), 1);
    }

    #[test]
    fn missing_interrupt_fails() {
        let mut traps = SimulatedTraps::new();
        let mut report = Report::new();
        let pass = check_program_interrupt(
            &mut report,
            &mut traps,
            "addressing",
            ProgramInterruptCode::ADDRESSING,
            || {},
        );
        assert!(!pass);
        assert!(!traps.is_armed());
    }
}
