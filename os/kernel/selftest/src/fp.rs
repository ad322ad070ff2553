//! Binary floating point checks.
//!
//! The load-FP-integer instructions take their rounding method from the M3
//! field. Two methods are exercised: *round toward zero* and *round to
//! prepare for shorter precision*, which turns every inexact result into the
//! odd neighbour so that a later narrowing rounds correctly.

use core::fmt;
use kernel_report::Report;

/// Rounding methods selectable in the M3 field.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum RoundingMode {
    PrepareForShorterPrecision = 3,
    TowardZero = 5,
}

impl RoundingMode {
    #[inline]
    #[must_use]
    pub const fn m3(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn abbreviation(self) -> &'static str {
        match self {
            Self::PrepareForShorterPrecision => "RSP",
            Self::TowardZero => "RTZ",
        }
    }
}

/// The BFP operations under test.
pub trait FloatingPoint {
    /// `ddbr`
    fn divide(&mut self, dividend: f64, divisor: f64) -> f64;

    /// `fidbra`
    fn round_long(&mut self, mode: RoundingMode, value: f64) -> f64;

    /// `fiebra`
    fn round_short(&mut self, mode: RoundingMode, value: f32) -> f32;

    /// `fixbra` applied to `value` widened to extended precision, then
    /// narrowed back to long.
    fn round_extended(&mut self, mode: RoundingMode, value: f64) -> f64;
}

#[derive(Debug, Copy, Clone)]
struct RoundingCase {
    mode: RoundingMode,
    value: f64,
    expected: f64,
}

const fn case(mode: RoundingMode, value: f64, expected: f64) -> RoundingCase {
    RoundingCase {
        mode,
        value,
        expected,
    }
}

// Every value is exactly representable in short precision.
const ROUNDING_CASES: [RoundingCase; 7] = [
    case(RoundingMode::TowardZero, 0.5, 0.0),
    case(RoundingMode::PrepareForShorterPrecision, 0.5, 1.0),
    case(RoundingMode::PrepareForShorterPrecision, -0.5, -1.0),
    case(RoundingMode::PrepareForShorterPrecision, 9.5, 9.0),
    case(RoundingMode::PrepareForShorterPrecision, -9.5, -9.0),
    case(RoundingMode::PrepareForShorterPrecision, 2.5, 3.0),
    case(RoundingMode::PrepareForShorterPrecision, -2.5, -3.0),
];

struct RoundingName {
    insn: &'static str,
    case: RoundingCase,
}

impl fmt::Display for RoundingName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}) == {} with {}",
            self.insn,
            self.case.value,
            self.case.expected,
            self.case.mode.abbreviation()
        )
    }
}

/// `3.0 / 2.0 == 1.5`
#[allow(clippy::float_cmp)]
pub fn check_fp_divide<F>(report: &mut Report, fpu: &mut F) -> bool
where
    F: FloatingPoint + ?Sized,
{
    let quotient = fpu.divide(3.0, 2.0);
    report.report("3.0/2.0 == 1.5", quotient == 1.5)
}

/// Run the rounding table against `fidbra`, `fiebra` and `fixbra`.
///
/// Returns whether every case passed.
#[allow(clippy::float_cmp, clippy::cast_possible_truncation)]
pub fn check_rounding<F>(report: &mut Report, fpu: &mut F) -> bool
where
    F: FloatingPoint + ?Sized,
{
    let mut all = true;
    for case in ROUNDING_CASES {
        let got = fpu.round_long(case.mode, case.value);
        all &= report.report(RoundingName { insn: "fidbra", case }, got == case.expected);
    }
    for case in ROUNDING_CASES {
        let got = fpu.round_short(case.mode, case.value as f32);
        let pass = got == case.expected as f32;
        all &= report.report(RoundingName { insn: "fiebra", case }, pass);
    }
    for case in ROUNDING_CASES {
        let got = fpu.round_extended(case.mode, case.value);
        all &= report.report(RoundingName { insn: "fixbra", case }, got == case.expected);
    }
    all
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Software model of the instructions.
    struct Model;

    #[allow(clippy::float_cmp)]
    fn round(mode: RoundingMode, value: f64) -> f64 {
        let truncated = value.trunc();
        match mode {
            RoundingMode::TowardZero => truncated,
            RoundingMode::PrepareForShorterPrecision if truncated == value => value,
            RoundingMode::PrepareForShorterPrecision => {
                if truncated % 2.0 == 0.0 {
                    truncated + value.signum()
                } else {
                    truncated
                }
            }
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    impl FloatingPoint for Model {
        fn divide(&mut self, dividend: f64, divisor: f64) -> f64 {
            dividend / divisor
        }

        fn round_long(&mut self, mode: RoundingMode, value: f64) -> f64 {
            round(mode, value)
        }

        fn round_short(&mut self, mode: RoundingMode, value: f32) -> f32 {
            round(mode, f64::from(value)) as f32
        }

        fn round_extended(&mut self, mode: RoundingMode, value: f64) -> f64 {
            round(mode, value)
        }
    }

    /// Rounds half away from zero, which disagrees with RSP on 9.5.
    struct NearestAway;

    impl FloatingPoint for NearestAway {
        fn divide(&mut self, dividend: f64, divisor: f64) -> f64 {
            dividend / divisor
        }

        fn round_long(&mut self, _mode: RoundingMode, value: f64) -> f64 {
            value.round()
        }

        fn round_short(&mut self, _mode: RoundingMode, value: f32) -> f32 {
            value.round()
        }

        fn round_extended(&mut self, _mode: RoundingMode, value: f64) -> f64 {
            value.round()
        }
    }

    #[test]
    fn modifier_values() {
        assert_eq!(RoundingMode::TowardZero.m3(), 5);
        assert_eq!(RoundingMode::PrepareForShorterPrecision.m3(), 3);
    }

    #[test]
    fn model_passes_every_case() {
        let mut report = Report::new();
        assert!(check_fp_divide(&mut report, &mut Model));
        assert!(check_rounding(&mut report, &mut Model));
        assert_eq!(report.tests(), 1 + 3 * 7);
        assert_eq!(report.failures(), 0);
    }

    #[test]
    fn round_half_away_fails_rsp_cases() {
        let mut report = Report::new();
        assert!(!check_rounding(&mut report, &mut NearestAway));
        // RTZ 0.5 and RSP ±9.5 disagree for each instruction.
        assert_eq!(report.failures(), 3 * 3);
    }

    #[test]
    fn case_names() {
        let name = RoundingName {
            insn: "fidbra",
            case: ROUNDING_CASES[4],
        };
        assert_eq!(name.to_string(), "fidbra(-9.5) == -9 with RSP");
        let name = RoundingName {
            insn: "fiebra",
            case: ROUNDING_CASES[0],
        };
        assert_eq!(name.to_string(), "fiebra(0.5) == 0 with RTZ");
    }
}
