//! # Physical Memory Address Types
//!
//! Strongly typed wrapper for absolute storage addresses used while sizing
//! and carving up real storage during early boot.
//!
//! ## Overview
//!
//! The selftest image runs with dynamic address translation disabled, so every
//! address it handles is a real (and, with a zero prefix, absolute) address.
//! [`PhysicalAddress`] keeps those values apart from plain sizes and counts:
//! storage sizes stay `u64`, addresses become `PhysicalAddress`, and the only
//! ways to mix them are the explicit, overflow-checked helpers.
//!
//! ## Typical Usage
//!
//! ```rust
//! # use kernel_memory_addresses::*;
//! let image_end = PhysicalAddress::new(0x0002_3456);
//! let arena = image_end.align_up(4096).unwrap();
//! assert_eq!(arena.as_u64(), 0x0002_4000);
//!
//! let ram_end = PhysicalAddress::new(2 << 20);
//! assert_eq!(arena.bytes_until(ram_end), Some((2 << 20) - 0x0002_4000));
//! ```
//!
//! ## Design Notes
//!
//! - The type is `#[repr(transparent)]` and implements `Copy`, `Eq`, `Ord`
//!   and `Hash`.
//! - Alignment and offset helpers are `const fn` and return `None` instead of
//!   wrapping.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(clippy::inline_always)]

mod physical_address;

pub use physical_address::PhysicalAddress;
