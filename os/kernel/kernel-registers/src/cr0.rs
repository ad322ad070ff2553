use bitfield_struct::bitfield;

/// Partial model of control register 0 (bits numbered 0-63, left to right).
///
/// Only the controls the selftest image changes are exposed; everything else
/// is carried through untouched.
#[bitfield(u64, order = Msb)]
pub struct Cr0 {
    /// Bits 0–44.
    #[bits(45)]
    _bits_0_44: u64,

    /// Bit 45 — AFP-register control.
    ///
    /// Makes floating-point registers 1, 3, 5, 7 and 8-15 available and
    /// enables the BFP instructions. Required for `fidbra` and friends.
    pub afp_register_control: bool,

    /// Bit 46 — Vector enablement control.
    pub vector_enablement: bool,

    /// Bits 47–63.
    #[bits(17)]
    _bits_47_63: u32,
}

impl Cr0 {
    /// The control register 0 value the selftest image runs with.
    ///
    /// Vector registers are enabled because code built for z13 may use them
    /// anywhere, including the program-interrupt entry stub.
    pub const INITIAL: Self = Self::new()
        .with_afp_register_control(true)
        .with_vector_enablement(true);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn afp_control_is_bit_45() {
        assert_eq!(Cr0::new().with_afp_register_control(true).into_bits(), 0x4_0000);
    }

    #[test]
    fn vector_enablement_is_bit_46() {
        assert_eq!(Cr0::new().with_vector_enablement(true).into_bits(), 0x2_0000);
    }

    #[test]
    fn initial_enables_afp_and_vector_registers() {
        assert_eq!(Cr0::INITIAL.into_bits(), 0x0000_0000_0006_0000);
    }

    #[test]
    fn foreign_bits_survive_round_trip() {
        let raw = 0xdead_0000_0000_0001_u64 | 0x4_0000;
        let cr0 = Cr0::from_bits(raw);
        assert!(cr0.afp_register_control());
        assert_eq!(cr0.with_afp_register_control(false).into_bits(), raw & !0x4_0000);
    }
}
