use bitfield_struct::bitfield;

/// Mask half of the z/Architecture program status word (bits numbered 0-63).
#[bitfield(u64, order = Msb)]
pub struct PswMask {
    /// Bit 0 — Reserved.
    #[bits(default = false)]
    _reserved_0: bool,

    /// Bit 1 — PER mask.
    pub per: bool,

    /// Bits 2–4 — Reserved.
    #[bits(3, default = 0)]
    _reserved_2_4: u8,

    /// Bit 5 — DAT mode.
    ///
    /// The selftest image runs with translation off; all addresses are real.
    pub dat: bool,

    /// Bit 6 — I/O interrupt mask.
    pub io: bool,

    /// Bit 7 — External interrupt mask.
    pub external: bool,

    /// Bits 8–11 — PSW key.
    #[bits(4)]
    pub key: u8,

    /// Bit 12 — Must be zero in z/Architecture mode.
    #[bits(default = false)]
    _reserved_12: bool,

    /// Bit 13 — Machine-check mask.
    pub machine_check: bool,

    /// Bit 14 — Wait state.
    ///
    /// Together with all interrupt masks off this is a *disabled wait*, the
    /// conventional way for a bare-metal program to stop the CPU.
    pub wait: bool,

    /// Bit 15 — Problem state.
    pub problem_state: bool,

    /// Bits 16–17 — Address-space control.
    #[bits(2)]
    pub address_space_control: u8,

    /// Bits 18–19 — Condition code.
    #[bits(2)]
    pub condition_code: u8,

    /// Bits 20–23 — Program mask.
    #[bits(4)]
    pub program_mask: u8,

    /// Bits 24–30 — Reserved.
    #[bits(7, default = 0)]
    _reserved_24_30: u8,

    /// Bit 31 — Extended addressing mode.
    pub extended_addressing: bool,

    /// Bit 32 — Basic addressing mode.
    ///
    /// With bit 31 set as well this selects 64-bit addressing.
    pub basic_addressing: bool,

    /// Bits 33–63 — Reserved.
    #[bits(31, default = 0)]
    _reserved_33_63: u32,
}

impl PswMask {
    /// 64-bit addressing, all interrupts disabled, supervisor state, key 0.
    pub const SIXTY_FOUR_BIT: Self = Self::new()
        .with_extended_addressing(true)
        .with_basic_addressing(true);

    /// A 64-bit disabled wait.
    pub const DISABLED_WAIT: Self = Self::SIXTY_FOUR_BIT.with_wait(true);
}

/// A full 16-byte program status word as stored in the lowcore.
#[repr(C, align(16))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Psw {
    mask: u64,
    addr: u64,
}

impl Psw {
    #[inline]
    #[must_use]
    pub const fn new(mask: PswMask, addr: u64) -> Self {
        Self {
            mask: mask.into_bits(),
            addr,
        }
    }

    /// A disabled-wait PSW carrying `code` in its address field.
    ///
    /// Hypervisors report the address of a disabled-wait PSW, which makes it
    /// a cheap way to hand an exit status to the host.
    #[inline]
    #[must_use]
    pub const fn disabled_wait(code: u64) -> Self {
        Self::new(PswMask::DISABLED_WAIT, code)
    }

    #[inline]
    #[must_use]
    pub const fn mask(&self) -> PswMask {
        PswMask::from_bits(self.mask)
    }

    #[inline]
    #[must_use]
    pub const fn addr(&self) -> u64 {
        self.addr
    }

    /// Move the instruction address forward by `bytes`.
    #[inline]
    pub const fn advance(&mut self, bytes: u64) {
        self.addr = self.addr.wrapping_add(bytes);
    }

    /// Load this PSW, transferring control to its address.
    ///
    /// # Safety
    /// Privileged. The PSW must describe a valid continuation; for a disabled
    /// wait the CPU stops for good.
    #[cfg(all(feature = "asm", target_arch = "s390x"))]
    pub unsafe fn load(&self) -> ! {
        unsafe {
            core::arch::asm!(
                "lpswe 0({psw})",
                psw = in(reg_addr) core::ptr::from_ref(self),
                options(noreturn, nostack)
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sixty_four_bit_mode_sets_ea_and_ba() {
        assert_eq!(PswMask::SIXTY_FOUR_BIT.into_bits(), 0x0000_0001_8000_0000);
    }

    #[test]
    fn disabled_wait_sets_wait_bit_only() {
        let psw = Psw::disabled_wait(0x4);
        assert_eq!(psw.mask().into_bits(), 0x0002_0001_8000_0000);
        assert!(psw.mask().wait());
        assert!(!psw.mask().io());
        assert!(!psw.mask().external());
        assert_eq!(psw.addr(), 0x4);
    }

    #[test]
    fn condition_code_and_key_fields() {
        let mask = PswMask::from_bits(0x0705_2000_0000_0000);
        assert!(mask.dat());
        assert!(mask.io());
        assert!(mask.external());
        assert_eq!(mask.key(), 0);
        assert!(mask.machine_check());
        assert_eq!(mask.condition_code(), 2);
    }

    #[test]
    fn advance_moves_instruction_address() {
        let mut psw = Psw::new(PswMask::SIXTY_FOUR_BIT, 0x1_0000);
        psw.advance(4);
        assert_eq!(psw.addr(), 0x1_0004);
    }

    #[test]
    fn layout_matches_lowcore_slot() {
        assert_eq!(size_of::<Psw>(), 16);
        assert_eq!(align_of::<Psw>(), 16);
    }
}
