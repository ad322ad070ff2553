use kernel_interrupts::{ProgramInterruptCode, TrapInterception, with_expected_trap};
use kernel_memory_addresses::PhysicalAddress;
use kernel_registers::ConditionCode;

/// What probing one address found.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Fetch and store are permitted.
    Accessible,
    /// Storage ends here or is protected; stop probing.
    Boundary,
    /// A program interrupt that has nothing to do with storage limits.
    Fault(ProgramInterruptCode),
}

/// Checks whether an address is usable storage.
pub trait StorageProbe {
    fn probe(&mut self, addr: PhysicalAddress) -> ProbeOutcome;
}

impl<F> StorageProbe for F
where
    F: FnMut(PhysicalAddress) -> ProbeOutcome,
{
    fn probe(&mut self, addr: PhysicalAddress) -> ProbeOutcome {
        self(addr)
    }
}

/// The bare TEST PROTECTION instruction.
///
/// May raise an addressing exception for storage that does not exist; only
/// call it with a trap expected.
pub trait TestProtection {
    fn test_protection(&mut self, addr: PhysicalAddress) -> ConditionCode;
}

impl<P> TestProtection for &mut P
where
    P: TestProtection + ?Sized,
{
    fn test_protection(&mut self, addr: PhysicalAddress) -> ConditionCode {
        (**self).test_protection(addr)
    }
}

/// `tprot` with access key 0.
#[cfg(target_arch = "s390x")]
#[derive(Debug, Default, Copy, Clone)]
pub struct Tprot;

#[cfg(target_arch = "s390x")]
impl TestProtection for Tprot {
    fn test_protection(&mut self, addr: PhysicalAddress) -> ConditionCode {
        let cc: u32;
        // SAFETY: tprot inspects storage keys and does not access the operand;
        // an addressing exception is absorbed by the armed trap handler.
        unsafe {
            core::arch::asm!(
                "tprot 0({addr}),0",
                "ipm {cc}",
                "srl {cc},28",
                addr = in(reg_addr) addr.as_u64(),
                cc = out(reg) cc,
                options(nostack),
            );
        }
        ConditionCode::from_ipm(cc)
    }
}

/// [`TestProtection`] bracketed by a trap expectation.
///
/// An addressing or protection exception, or any nonzero condition code,
/// is a [`ProbeOutcome::Boundary`]; other exceptions are a [`ProbeOutcome::Fault`].
#[derive(Debug)]
pub struct TrapGuardedProbe<T, P> {
    traps: T,
    tester: P,
}

impl<T, P> TrapGuardedProbe<T, P>
where
    T: TrapInterception,
    P: TestProtection,
{
    pub const fn new(traps: T, tester: P) -> Self {
        Self { traps, tester }
    }

    pub fn into_parts(self) -> (T, P) {
        (self.traps, self.tester)
    }
}

impl<T, P> StorageProbe for TrapGuardedProbe<T, P>
where
    T: TrapInterception,
    P: TestProtection,
{
    fn probe(&mut self, addr: PhysicalAddress) -> ProbeOutcome {
        let tester = &mut self.tester;
        let (cc, trap) = with_expected_trap(&mut self.traps, || tester.test_protection(addr));
        match trap {
            Some(code) if code.is_storage_boundary() => ProbeOutcome::Boundary,
            Some(code) => ProbeOutcome::Fault(code),
            None if cc.is_zero() => ProbeOutcome::Accessible,
            None => ProbeOutcome::Boundary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel_interrupts::SimulatedTraps;

    struct Fixed<'t> {
        traps: &'t SimulatedTraps,
        trap: Option<ProgramInterruptCode>,
        cc: ConditionCode,
    }

    impl TestProtection for Fixed<'_> {
        fn test_protection(&mut self, _addr: PhysicalAddress) -> ConditionCode {
            if let Some(code) = self.trap {
                self.traps.deliver(code);
            }
            self.cc
        }
    }

    fn probe_with(trap: Option<ProgramInterruptCode>, cc: ConditionCode) -> ProbeOutcome {
        let traps = SimulatedTraps::new();
        let tester = Fixed {
            traps: &traps,
            trap,
            cc,
        };
        let outcome = TrapGuardedProbe::new(&traps, tester).probe(PhysicalAddress::new(0x1f_ffff));
        assert!(!traps.is_armed());
        outcome
    }

    #[test]
    fn classification() {
        use ConditionCode::{One, Three, Zero};
        assert_eq!(probe_with(None, Zero), ProbeOutcome::Accessible);
        assert_eq!(probe_with(None, One), ProbeOutcome::Boundary);
        assert_eq!(probe_with(None, Three), ProbeOutcome::Boundary);
        assert_eq!(
            probe_with(Some(ProgramInterruptCode::ADDRESSING), Zero),
            ProbeOutcome::Boundary
        );
        assert_eq!(
            probe_with(Some(ProgramInterruptCode::PROTECTION), Zero),
            ProbeOutcome::Boundary
        );
        assert_eq!(
            probe_with(Some(ProgramInterruptCode::SPECIFICATION), Zero),
            ProbeOutcome::Fault(ProgramInterruptCode::SPECIFICATION)
        );
    }
}
