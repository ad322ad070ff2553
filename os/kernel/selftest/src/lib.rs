//! # Bare-Metal Selftest
//!
//! The checks the selftest image runs once memory discovery is done. Each
//! check reports through a [`Report`](kernel_report::Report) and takes the
//! hardware it exercises as a parameter, so the expectations themselves run
//! on the host against software models.
//!
//! | Module        | Checks                                                      |
//! |---------------|-------------------------------------------------------------|
//! | [`fp`]        | BFP divide; `fidbra`/`fiebra`/`fixbra` rounding modes       |
//! | [`program`]   | operation and addressing exceptions reach the trap facility |
//! | [`arena`]     | allocations stay inside discovered storage                  |
//! | [`vector`]    | gathers, mask generation, replicate, extract, add           |
//! | [`facility`]  | the `stfle` facility list that gates the vector checks      |
//! | [`exit`]      | the `EXIT: STATUS=` encoding read by the host harness       |
//!
//! The instructions behind these checks live in `hw`, compiled for s390x only.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

pub mod arena;
pub mod exit;
pub mod facility;
pub mod fp;
#[cfg(target_arch = "s390x")]
pub mod hw;
pub mod program;
pub mod vector;

pub use arena::check_arena;
pub use exit::exit_status_word;
pub use fp::{FloatingPoint, RoundingMode, check_fp_divide, check_rounding};
pub use facility::FacilityList;
pub use program::check_program_interrupt;
pub use vector::{Vector, VectorUnit, check_vector};
