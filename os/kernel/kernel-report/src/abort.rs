use core::fmt;

/// Exit code used when a run is aborted rather than finished.
pub const ABORT_EXIT_CODE: u32 = 64;

/// Unrecoverable termination of the boot sequence.
///
/// Called at most once per run; never returns.
pub trait FatalAbort {
    fn abort(&self, args: fmt::Arguments<'_>) -> !;
}

impl<F> FatalAbort for &F
where
    F: FatalAbort + ?Sized,
{
    fn abort(&self, args: fmt::Arguments<'_>) -> ! {
        (**self).abort(args)
    }
}

/// Test double that counts invocations and then panics.
///
/// Hosted tests wrap the call in `catch_unwind` to observe that the abort
/// path was taken exactly once and that control never came back.
#[cfg(feature = "simulator")]
#[derive(Debug, Default)]
pub struct RecordingAbort {
    calls: core::cell::Cell<usize>,
}

#[cfg(feature = "simulator")]
impl RecordingAbort {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            calls: core::cell::Cell::new(0),
        }
    }

    #[must_use]
    pub const fn calls(&self) -> usize {
        self.calls.get()
    }
}

#[cfg(feature = "simulator")]
impl FatalAbort for RecordingAbort {
    fn abort(&self, args: fmt::Arguments<'_>) -> ! {
        self.calls.set(self.calls.get() + 1);
        log::error!(target: "report", "ABORT: {args}");
        panic!("fatal abort: {args}");
    }
}
