use crate::code::ProgramInterruptCode;

/// Arm/disarm access to the program-interrupt expectation.
///
/// There is a single expectation slot. It must be armed right before the
/// instruction that may trap and disarmed right after it.
pub trait TrapInterception {
    /// Expect a program interrupt and clear any previously recorded code.
    fn expect_trap(&mut self);

    /// Disarm and return the code of the interrupt taken since arming.
    fn take_trap(&mut self) -> Option<ProgramInterruptCode>;

    /// Disarm and report whether an interrupt was taken.
    fn trap_occurred(&mut self) -> bool {
        self.take_trap().is_some()
    }
}

impl<T> TrapInterception for &mut T
where
    T: TrapInterception + ?Sized,
{
    fn expect_trap(&mut self) {
        (**self).expect_trap();
    }

    fn take_trap(&mut self) -> Option<ProgramInterruptCode> {
        (**self).take_trap()
    }
}

/// An armed expectation; disarmed by [`ExpectedTrap::finish`] or on drop.
#[must_use = "dropping the guard disarms the expectation immediately"]
pub struct ExpectedTrap<'a, T>
where
    T: TrapInterception + ?Sized,
{
    traps: &'a mut T,
    done: bool,
}

impl<'a, T> ExpectedTrap<'a, T>
where
    T: TrapInterception + ?Sized,
{
    pub fn arm(traps: &'a mut T) -> Self {
        traps.expect_trap();
        Self { traps, done: false }
    }

    /// Disarm and return the recorded interruption code, if any.
    pub fn finish(mut self) -> Option<ProgramInterruptCode> {
        self.done = true;
        self.traps.take_trap()
    }
}

impl<T> Drop for ExpectedTrap<'_, T>
where
    T: TrapInterception + ?Sized,
{
    fn drop(&mut self) {
        if !self.done {
            if let Some(code) = self.traps.take_trap() {
                log::debug!("discarding expected {code}");
            }
        }
    }
}

/// Run `f` with a trap expected and return its result plus the trap taken, if any.
///
/// ```
/// # use kernel_interrupts::{ProgramInterruptCode, TrapInterception, with_expected_trap};
/// #[derive(Default)]
/// struct Lowcore {
///     armed: bool,
///     code: u16,
/// }
///
/// impl TrapInterception for Lowcore {
///     fn expect_trap(&mut self) {
///         self.armed = true;
///         self.code = 0;
///     }
///
///     fn take_trap(&mut self) -> Option<ProgramInterruptCode> {
///         self.armed = false;
///         (self.code != 0).then(|| ProgramInterruptCode::new(core::mem::take(&mut self.code)))
///     }
/// }
///
/// let mut lowcore = Lowcore::default();
/// let (_, trap) = with_expected_trap(&mut lowcore, || ());
/// assert_eq!(trap, None);
/// assert!(!lowcore.armed);
/// ```
pub fn with_expected_trap<T, R>(
    traps: &mut T,
    f: impl FnOnce() -> R,
) -> (R, Option<ProgramInterruptCode>)
where
    T: TrapInterception + ?Sized,
{
    let guard = ExpectedTrap::arm(traps);
    let result = f();
    (result, guard.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SimulatedTraps;

    #[test]
    fn guard_disarms_on_drop() {
        let mut traps = SimulatedTraps::new();
        {
            let _armed = ExpectedTrap::arm(&mut traps);
        }
        assert!(!traps.is_armed());
    }

    #[test]
    fn finish_reports_recorded_code() {
        let mut traps = SimulatedTraps::new();
        let guard = ExpectedTrap::arm(&mut traps);
        assert_eq!(guard.finish(), None);

        let (value, trap) = with_expected_trap(&mut traps, || 7);
        assert_eq!(value, 7);
        assert_eq!(trap, None);
        assert!(!traps.is_armed());
    }

    #[test]
    fn trap_occurred_clears_the_slot() {
        let mut traps = SimulatedTraps::new();
        traps.expect_trap();
        traps.deliver(ProgramInterruptCode::ADDRESSING);
        assert!(traps.trap_occurred());
        assert!(!traps.trap_occurred());
    }
}
