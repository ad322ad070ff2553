//! # Program Interrupts
//!
//! Tests and the memory prober deliberately execute instructions that may
//! trap. Instead of unwinding anything, the program-interrupt handler records
//! the interruption code in the lowcore and resumes after the faulting
//! instruction; the caller then asks whether a trap happened.
//!
//! ```text
//!   expect_trap()            arm: the next program interrupt is anticipated
//!   <instruction>            may trap → handler records the code and returns
//!   take_trap() -> Option    disarm and fetch the recorded code
//! ```
//!
//! A program interrupt that arrives while nothing is armed is a genuine fault
//! and ends the run through the installed [`FatalAbort`](kernel_report::FatalAbort).
//!
//! [`ExpectedTrap`] scopes the arm/disarm pair so the expectation can never
//! leak into unrelated code.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod code;
mod expect;
#[cfg(target_arch = "s390x")]
mod lowcore;
#[cfg(any(test, feature = "simulator"))]
mod simulator;

pub use code::ProgramInterruptCode;
pub use expect::{ExpectedTrap, TrapInterception, with_expected_trap};
#[cfg(target_arch = "s390x")]
pub use lowcore::LowcoreTraps;
#[cfg(any(test, feature = "simulator"))]
pub use simulator::SimulatedTraps;
