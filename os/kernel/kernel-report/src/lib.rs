//! # Selftest Reporting
//!
//! Pass/fail bookkeeping for the bare-metal selftests and the fatal-abort
//! contract used by boot code that cannot continue.
//!
//! ## Output
//!
//! Every result is emitted as one `log` record at `info` level with target
//! `report`, which the console logger prints without decoration:
//!
//! ```text
//! PASS: selftest: 3.0/2.0 == 1.5
//! FAIL: selftest: fidbra(0.5) == 0 with RTZ
//! XFAIL: selftest: known broken
//! SKIP: selftest: vector facility not installed
//! SUMMARY: 27 tests, 1 unexpected failures
//! ```
//!
//! The host side only looks at the `SUMMARY:` and `EXIT:` lines; everything
//! else is for humans.
//!
//! ## Aborts
//!
//! [`FatalAbort`] is the single way out of boot code when no caller could
//! recover: memory sizing failed, an unexpected program interrupt arrived,
//! and so on. Implementations print an `ABORT:` line and stop the machine
//! with [`ABORT_EXIT_CODE`].

#![cfg_attr(not(any(test, doctest)), no_std)]

mod abort;
mod report;

pub use abort::{ABORT_EXIT_CODE, FatalAbort};
#[cfg(feature = "simulator")]
pub use abort::RecordingAbort;
pub use report::{ExitStatus, MAX_PREFIX_DEPTH, Prefixes, Report};
