//! # Console Output under QEMU/KVM
//!
//! Text output for the selftest image. There is no serial port to poke on
//! s390x; the hypervisor's ASCII console is reached through SCLP
//! *write event data* requests, one request per line.
//!
//! ```text
//! log::info!(..) ──► QemuLogger ──┐
//!                                 ├──► qemu_trace! ──► LineBuffer ──'\n'──► SCLP write event
//! qemu_trace!(..) ────────────────┘
//! ```
//!
//! Output is best-effort: a busy console, a refused service call or a
//! re-entered sink (a program interrupt while a line is being written) drops
//! the text instead of blocking.
//!
//! ## Features
//!
//! `enabled` (default) compiles the SCLP sink on s390x targets. Without it, or
//! on any other target, [`qemu_trace!`] formats nothing and costs nothing.
//!
//! ## Usage
//! ```rust,no_run
//! use kernel_qemu::QemuLogger;
//! use log::{LevelFilter, info};
//!
//! QemuLogger::new(LevelFilter::Debug).init().expect("logger initialization");
//! info!("memory discovery done");
//! ```
//!
//! On the host, QEMU routes the console with `-nographic` or
//! `-serial stdio`; the harness scans it for `SUMMARY:` and `EXIT:` lines.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod line_buffer;
mod logger;

pub use line_buffer::LineBuffer;
pub use logger::QemuLogger;

#[cfg(all(feature = "enabled", target_arch = "s390x"))]
#[doc(hidden)]
pub mod qemu_fmt {
    use crate::LineBuffer;
    use core::fmt;
    use kernel_sclp::{Sccb, Servc, write_console};
    use kernel_sync::SpinLock;

    /// Longest line sent in one write event; longer lines are split.
    const LINE_CAPACITY: usize = 256;

    struct Console {
        sccb: Sccb,
        line: LineBuffer<LINE_CAPACITY>,
    }

    static CONSOLE: SpinLock<Console> = SpinLock::new(Console {
        sccb: Sccb::new(),
        line: LineBuffer::new(),
    });

    fn emit(sccb: &mut Sccb, bytes: &[u8]) {
        // Nowhere to report a console failure to.
        let _ = write_console(&mut Servc, sccb, bytes);
    }

    #[doc(hidden)]
    pub fn qemu_write(args: fmt::Arguments) {
        if let Some(mut console) = CONSOLE.try_lock() {
            let Console { sccb, line } = &mut *console;
            let _ = line.write_fmt_with(args, |bytes| emit(sccb, bytes));
        }
    }

    #[doc(hidden)]
    pub fn qemu_flush() {
        if let Some(mut console) = CONSOLE.try_lock() {
            let Console { sccb, line } = &mut *console;
            line.flush(|bytes| emit(sccb, bytes));
        }
    }
}

#[cfg(not(all(feature = "enabled", target_arch = "s390x")))]
#[doc(hidden)]
pub mod qemu_fmt {
    use core::fmt;

    #[doc(hidden)]
    #[inline(always)]
    #[allow(clippy::inline_always)]
    pub fn qemu_write(_: fmt::Arguments) {
        // no console
    }

    #[doc(hidden)]
    #[inline(always)]
    #[allow(clippy::inline_always)]
    pub fn qemu_flush() {}
}

/// Write formatted text to the hypervisor console.
///
/// Text is sent once a line is complete.
#[macro_export]
macro_rules! qemu_trace {
    ($($arg:tt)*) => {{
        $crate::qemu_fmt::qemu_write(core::format_args!($($arg)*));
    }};
}
