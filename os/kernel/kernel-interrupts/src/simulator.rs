use crate::code::ProgramInterruptCode;
use crate::expect::TrapInterception;
use core::cell::Cell;

/// Hosted stand-in for the lowcore trap slot.
///
/// Simulated instructions call [`SimulatedTraps::deliver`] where the real one
/// would raise a program interrupt. Delivery while disarmed panics, which is
/// how the hosted build models the abort on an unexpected interrupt.
///
/// All state sits in `Cell`s so a simulated machine can hold a shared
/// reference while the prober arms and disarms through another one.
#[derive(Debug, Default)]
pub struct SimulatedTraps {
    armed: Cell<bool>,
    code: Cell<Option<ProgramInterruptCode>>,
    delivered: Cell<usize>,
}

impl SimulatedTraps {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            armed: Cell::new(false),
            code: Cell::new(None),
            delivered: Cell::new(0),
        }
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed.get()
    }

    /// Number of interrupts delivered so far.
    #[must_use]
    pub fn delivered(&self) -> usize {
        self.delivered.get()
    }

    /// Raise a program interrupt.
    ///
    /// # Panics
    /// If no trap is expected.
    pub fn deliver(&self, code: ProgramInterruptCode) {
        assert!(self.armed.get(), "unexpected program interrupt: {code}");
        self.armed.set(false);
        self.code.set(Some(code));
        self.delivered.set(self.delivered.get() + 1);
    }

    fn arm(&self) {
        self.code.set(None);
        self.armed.set(true);
    }

    fn take(&self) -> Option<ProgramInterruptCode> {
        self.armed.set(false);
        self.code.take()
    }
}

impl TrapInterception for SimulatedTraps {
    fn expect_trap(&mut self) {
        self.arm();
    }

    fn take_trap(&mut self) -> Option<ProgramInterruptCode> {
        self.take()
    }
}

impl TrapInterception for &SimulatedTraps {
    fn expect_trap(&mut self) {
        self.arm();
    }

    fn take_trap(&mut self) -> Option<ProgramInterruptCode> {
        self.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_armed_delivery() {
        let traps = SimulatedTraps::new();
        let mut handle = &traps;
        handle.expect_trap();
        traps.deliver(ProgramInterruptCode::PROTECTION);
        assert_eq!(handle.take_trap(), Some(ProgramInterruptCode::PROTECTION));
        assert_eq!(traps.delivered(), 1);
    }

    #[test]
    #[should_panic(expected = "unexpected program interrupt")]
    fn unarmed_delivery_panics() {
        SimulatedTraps::new().deliver(ProgramInterruptCode::OPERATION);
    }
}
