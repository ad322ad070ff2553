//! # Selftest Image Configuration
//!
//! This crate defines the constants that every other crate of the s390x
//! selftest image agrees on: where the image is loaded, how large the
//! service-call buffer is, how storage increments are encoded, and where the
//! architecture places the fields of the lowcore that the image reads and
//! writes.
//!
//! ## Overview
//!
//! The image boots without an operating system. Before anything else can run
//! it has to discover how much storage the hypervisor exposes, which in turn
//! depends on the service-call buffer (SCCB) format and the program-interrupt
//! lowcore fields. Keeping these numbers in one `no_std`, dependency-free crate
//! lets the build script, the boot stub and the library crates share them.
//!
//! ## Real Storage Layout
//!
//! ```text
//! 0x0000_0000 ┌─────────────────────────────────┐
//!             │  Lowcore (prefix area, 8 KiB)   │
//!             │  interrupt PSWs, codes, scratch │
//! 0x0000_2000 ├─────────────────────────────────┤
//!             │           (unused)              │
//! LOAD_ADDRESS├─────────────────────────────────┤ 0x0001_0000
//!             │  Image: text, data, bss, stack  │
//! image end   ├─────────────────────────────────┤
//!             │  Free storage handed to the     │
//!             │  physical arena                 │
//! ram size    └─────────────────────────────────┘
//! ```
//!
//! The first storage increment always contains the lowcore and the image, so
//! it is accessible without probing.
//!
//! ## Modules
//!
//! * [`memory`]: image placement, SCCB size and storage-increment encoding.
//! * [`lowcore`]: absolute offsets of the lowcore fields used by the
//!   program-interrupt facility.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

pub mod lowcore;
pub mod memory;
