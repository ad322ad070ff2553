//! Vector facility checks.
//!
//! A representative subset of the vector instructions: element gathers,
//! mask generation, load-and-replicate, element extraction and addition.
//! Immediates are encoded into the instructions, so the unit takes them as
//! const parameters. Element sizes use the M-field codes [`BYTE`] through
//! [`QUADWORD`].

use crate::facility::{FacilityList, VECTOR_FACILITY};
use crate::program::check_program_interrupt;
use core::ptr;
use kernel_interrupts::{ProgramInterruptCode, TrapInterception};
use kernel_report::Report;
use log::info;

pub const BYTE: u8 = ElementSize::Byte.m();
pub const HALFWORD: u8 = ElementSize::Halfword.m();
pub const WORD: u8 = ElementSize::Word.m();
pub const DOUBLEWORD: u8 = ElementSize::Doubleword.m();
pub const QUADWORD: u8 = ElementSize::Quadword.m();

/// Element sizes as encoded in the M fields.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum ElementSize {
    Byte = 0,
    Halfword = 1,
    Word = 2,
    Doubleword = 3,
    Quadword = 4,
}

impl ElementSize {
    #[inline]
    #[must_use]
    pub const fn m(self) -> u8 {
        self as u8
    }

    /// Codes above 4 are reserved.
    #[must_use]
    pub const fn from_m(m: u8) -> Option<Self> {
        match m {
            0 => Some(Self::Byte),
            1 => Some(Self::Halfword),
            2 => Some(Self::Word),
            3 => Some(Self::Doubleword),
            4 => Some(Self::Quadword),
            _ => None,
        }
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        8 << self as u32
    }

    /// Elements per register.
    #[must_use]
    pub const fn count(self) -> u32 {
        128 / self.bits()
    }

    const fn mask(self) -> u128 {
        u128::MAX >> (128 - self.bits())
    }
}

/// A vector register image. Element 0 is the leftmost.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[repr(C, align(16))]
pub struct Vector([u64; 2]);

impl Vector {
    pub const ZERO: Self = Self([0; 2]);
    pub const ONES: Self = Self([u64::MAX; 2]);

    #[must_use]
    pub const fn from_doublewords(high: u64, low: u64) -> Self {
        Self([high, low])
    }

    #[must_use]
    pub fn from_words(words: [u32; 4]) -> Self {
        Self([
            u64::from(words[0]) << 32 | u64::from(words[1]),
            u64::from(words[2]) << 32 | u64::from(words[3]),
        ])
    }

    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub const fn from_u128(value: u128) -> Self {
        Self([(value >> 64) as u64, value as u64])
    }

    #[must_use]
    pub const fn doublewords(self) -> [u64; 2] {
        self.0
    }

    #[must_use]
    pub fn to_u128(self) -> u128 {
        u128::from(self.0[0]) << 64 | u128::from(self.0[1])
    }

    /// Element `index` of `size`, which must be at most a doubleword.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn element(self, size: ElementSize, index: u32) -> u64 {
        let shift = 128 - size.bits() * (index + 1);
        ((self.to_u128() >> shift) & size.mask()) as u64
    }

    #[must_use]
    pub fn with_element(self, size: ElementSize, index: u32, value: u64) -> Self {
        let shift = 128 - size.bits() * (index + 1);
        let mask = size.mask() << shift;
        Self::from_u128((self.to_u128() & !mask) | ((u128::from(value) << shift) & mask))
    }
}

/// Encodings with a reserved element index or size.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReservedEncoding {
    /// `vgef` selecting element 4.
    GatherWordIndex,
    /// `vgeg` selecting element 2.
    GatherDoublewordIndex,
    /// `vgm` with quadword elements.
    MaskQuadword,
    /// `vlrep` with quadword elements.
    ReplicateQuadword,
    /// `va` with element size code 5.
    AddReservedSize,
}

/// The vector instructions under test.
pub trait VectorUnit {
    /// `vgef`: replace word `INDEX` of `target` with the word at `base`
    /// plus word `INDEX` of `offsets`, which must be readable.
    fn gather_word<const INDEX: u8>(
        &mut self,
        target: Vector,
        offsets: Vector,
        base: *const u8,
    ) -> Vector;

    /// `vgeg`, the doubleword form of [`gather_word`](Self::gather_word).
    fn gather_doubleword<const INDEX: u8>(
        &mut self,
        target: Vector,
        offsets: Vector,
        base: *const u8,
    ) -> Vector;

    /// `vgbm`: each mask bit selects a byte of ones, leftmost first.
    fn generate_byte_mask<const MASK: u16>(&mut self) -> Vector;

    /// `vgm`: bits `START` through `END` of every element, wrapping when
    /// `START` lies past `END`.
    fn generate_mask<const START: u8, const END: u8, const SIZE: u8>(&mut self) -> Vector;

    /// `vlrep`: the leftmost element of `data` in every element.
    fn load_and_replicate<const SIZE: u8>(&mut self, data: &u64) -> Vector;

    /// `vlgv`: the element selected by the rightmost bits of `index`.
    fn extract_element<const SIZE: u8>(&mut self, source: Vector, index: u64) -> u64;

    /// `va`, element-wise and modulo the element width.
    fn add<const SIZE: u8>(&mut self, augend: Vector, addend: Vector) -> Vector;

    /// Execute `encoding`, which raises a specification exception.
    fn execute_reserved(&mut self, encoding: ReservedEncoding);
}

/// Compares whole registers.
fn report_vector(report: &mut Report, name: &'static str, got: Vector, expected: [u64; 2]) -> bool {
    if got.doublewords() != expected {
        info!(
            "{name}: got {:#018x}_{:016x}",
            got.doublewords()[0],
            got.doublewords()[1]
        );
    }
    report.report(name, got.doublewords() == expected)
}

fn check_specification<U, T>(
    report: &mut Report,
    unit: &mut U,
    traps: &mut T,
    name: &'static str,
    encoding: ReservedEncoding,
) -> bool
where
    U: VectorUnit,
    T: TrapInterception + ?Sized,
{
    check_program_interrupt(
        report,
        traps,
        name,
        ProgramInterruptCode::SPECIFICATION,
        || unit.execute_reserved(encoding),
    )
}

const GATHER_OFFSET: usize = 56789;

fn check_gather_word<U, T>(report: &mut Report, unit: &mut U, traps: &mut T) -> bool
where
    U: VectorUnit,
    T: TrapInterception + ?Sized,
{
    report.prefix_push("vgef");
    let data: u32 = 0x1234_5678;
    let base = ptr::from_ref(&data).cast::<u8>().wrapping_sub(GATHER_OFFSET);
    #[allow(clippy::cast_possible_truncation)]
    let offsets = Vector::from_words([u32::MAX, u32::MAX, GATHER_OFFSET as u32, u32::MAX]);
    let got = unit.gather_word::<2>(Vector::ONES, offsets, base);

    let mut all = report.report(
        "element loaded",
        got.element(ElementSize::Word, 2) == u64::from(data),
    );
    let untouched = [0, 1, 3]
        .into_iter()
        .all(|i| got.element(ElementSize::Word, i) == u64::from(u32::MAX));
    all &= report.report("elements unmodified", untouched);
    all &= check_specification(
        report,
        unit,
        traps,
        "invalid element index",
        ReservedEncoding::GatherWordIndex,
    );
    report.prefix_pop();
    all
}

fn check_gather_doubleword<U, T>(report: &mut Report, unit: &mut U, traps: &mut T) -> bool
where
    U: VectorUnit,
    T: TrapInterception + ?Sized,
{
    report.prefix_push("vgeg");
    let data: u64 = 0x0123_4567_89ab_cdef;
    let base = ptr::from_ref(&data).cast::<u8>().wrapping_sub(GATHER_OFFSET);
    let offsets = Vector::from_doublewords(u64::MAX, GATHER_OFFSET as u64);
    let got = unit.gather_doubleword::<1>(Vector::ONES, offsets, base);

    let mut all = report.report("element loaded", got.doublewords()[1] == data);
    all &= report.report("elements unmodified", got.doublewords()[0] == u64::MAX);
    all &= check_specification(
        report,
        unit,
        traps,
        "invalid element index",
        ReservedEncoding::GatherDoublewordIndex,
    );
    report.prefix_pop();
    all
}

fn check_generate_byte_mask<U: VectorUnit>(report: &mut Report, unit: &mut U) -> bool {
    report.prefix_push("vgbm");
    let mut all = true;
    let got = unit.generate_byte_mask::<0x00ff>();
    all &= report_vector(report, "i2 == 0x00ff", got, [0, u64::MAX]);
    let got = unit.generate_byte_mask::<0x0f00>();
    all &= report_vector(report, "i2 == 0x0f00", got, [0x0000_0000_ffff_ffff, 0]);
    let got = unit.generate_byte_mask::<0x4218>();
    let expected = [0x00ff_0000_0000_ff00, 0x0000_00ff_ff00_0000];
    all &= report_vector(report, "i2 == 0x4218", got, expected);
    let got = unit.generate_byte_mask::<0>();
    all &= report_vector(report, "i2 == 0", got, [0, 0]);
    report.prefix_pop();
    all
}

fn check_generate_mask<U, T>(report: &mut Report, unit: &mut U, traps: &mut T) -> bool
where
    U: VectorUnit,
    T: TrapInterception + ?Sized,
{
    report.prefix_push("vgm");
    let mut all = true;
    let cases = [
        ("single bit 64", unit.generate_mask::<62, 62, DOUBLEWORD>(), 0x2),
        ("single bit 32", unit.generate_mask::<30, 30, WORD>(), 0x0000_0002_0000_0002),
        ("single bit 16", unit.generate_mask::<14, 14, HALFWORD>(), 0x0002_0002_0002_0002),
        ("single bit 8", unit.generate_mask::<6, 6, BYTE>(), 0x0202_0202_0202_0202),
        ("wrapping", unit.generate_mask::<7, 0, BYTE>(), 0x8181_8181_8181_8181),
        ("unused bits", unit.generate_mask::<60, 63, BYTE>(), 0x0f0f_0f0f_0f0f_0f0f),
    ];
    for (name, got, doubleword) in cases {
        all &= report_vector(report, name, got, [doubleword; 2]);
    }
    all &= check_specification(
        report,
        unit,
        traps,
        "invalid element size",
        ReservedEncoding::MaskQuadword,
    );
    report.prefix_pop();
    all
}

fn check_load_and_replicate<U, T>(report: &mut Report, unit: &mut U, traps: &mut T) -> bool
where
    U: VectorUnit,
    T: TrapInterception + ?Sized,
{
    report.prefix_push("vlrep");
    let data: u64 = 0x0123_4567_89ab_cdef;
    let mut all = true;
    let cases = [
        ("8", unit.load_and_replicate::<BYTE>(&data), 0x0101_0101_0101_0101),
        ("16", unit.load_and_replicate::<HALFWORD>(&data), 0x0123_0123_0123_0123),
        ("32", unit.load_and_replicate::<WORD>(&data), 0x0123_4567_0123_4567),
        ("64", unit.load_and_replicate::<DOUBLEWORD>(&data), data),
    ];
    for (name, got, doubleword) in cases {
        all &= report_vector(report, name, got, [doubleword; 2]);
    }
    all &= check_specification(
        report,
        unit,
        traps,
        "invalid element size",
        ReservedEncoding::ReplicateQuadword,
    );
    report.prefix_pop();
    all
}

fn check_extract_element<U: VectorUnit>(report: &mut Report, unit: &mut U) -> bool {
    report.prefix_push("vlgv");
    let source = Vector::from_doublewords(0x0011_2233_4455_6677, 0x8899_aabb_ccdd_eeff);
    // Bits left of the element index are ignored.
    let cases = [
        ("8", unit.extract_element::<BYTE>(source, 7 | !0xf), 0x77),
        ("16", unit.extract_element::<HALFWORD>(source, 4 | !7), 0x8899),
        ("32", unit.extract_element::<WORD>(source, 3 | !3), 0xccdd_eeff),
        ("64", unit.extract_element::<DOUBLEWORD>(source, 1 | !1), 0x8899_aabb_ccdd_eeff),
    ];
    let mut all = true;
    for (name, got, expected) in cases {
        all &= report.report(name, got == expected);
    }
    report.prefix_pop();
    all
}

fn check_add<U, T>(report: &mut Report, unit: &mut U, traps: &mut T) -> bool
where
    U: VectorUnit,
    T: TrapInterception + ?Sized,
{
    report.prefix_push("va");
    let augend = Vector::from_doublewords(0x0011_2233_4455_6677, 0x8899_aabb_ccdd_eeff);
    let addend = Vector::from_doublewords(0x7766_5544_3322_1100, 0xffee_ddcc_bbaa_9988);
    let low = 0x7777_7777_7777_7777;
    let cases = [
        ("8", unit.add::<BYTE>(augend, addend), [low, 0x8787_8787_8787_8787]),
        ("16", unit.add::<HALFWORD>(augend, addend), [low, 0x8887_8887_8887_8887]),
        ("32", unit.add::<WORD>(augend, addend), [low, 0x8888_8887_8888_8887]),
        ("64", unit.add::<DOUBLEWORD>(augend, addend), [low, 0x8888_8888_8888_8887]),
        // The carry out of the right doubleword reaches the left one.
        ("128", unit.add::<QUADWORD>(augend, addend), [low + 1, 0x8888_8888_8888_8887]),
    ];
    let mut all = true;
    for (name, got, expected) in cases {
        all &= report_vector(report, name, got, expected);
    }
    all &= check_specification(
        report,
        unit,
        traps,
        "invalid element size",
        ReservedEncoding::AddReservedSize,
    );
    report.prefix_pop();
    all
}

/// Run the vector subset, or record a skip when the vector facility is not
/// installed.
///
/// Returns whether every case passed.
pub fn check_vector<U, T>(
    report: &mut Report,
    facilities: &FacilityList,
    unit: &mut U,
    traps: &mut T,
) -> bool
where
    U: VectorUnit,
    T: TrapInterception + ?Sized,
{
    report.prefix_push("vector");
    let all = if facilities.is_installed(VECTOR_FACILITY) {
        let mut all = check_gather_word(report, unit, traps);
        all &= check_gather_doubleword(report, unit, traps);
        all &= check_generate_byte_mask(report, unit);
        all &= check_generate_mask(report, unit, traps);
        all &= check_load_and_replicate(report, unit, traps);
        all &= check_extract_element(report, unit);
        all &= check_add(report, unit, traps);
        all
    } else {
        report.report_skip("basic vector facility is not available");
        true
    };
    report.prefix_pop();
    all
}
