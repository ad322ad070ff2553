//! # Typed `s390x` Registers
//!
//! Bit-level models of the z/Architecture state the selftest image touches:
//! the program status word ([`psw`]), control register 0 ([`cr0`]) and the
//! condition code ([`condition_code`]) as extracted by `ipm`.
//!
//! All layouts use `bitfield-struct` with most-significant-bit-first ordering
//! so that field order matches the architecture's bit numbering (bit 0 is the
//! leftmost bit).

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

pub mod condition_code;
pub mod cr0;
pub mod psw;

pub use condition_code::ConditionCode;
pub use cr0::Cr0;
pub use psw::{Psw, PswMask};
