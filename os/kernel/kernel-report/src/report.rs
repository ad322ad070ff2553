use crate::abort::ABORT_EXIT_CODE;
use core::fmt;
use log::info;

/// How many prefixes can be stacked at once.
pub const MAX_PREFIX_DEPTH: usize = 8;

/// Exit status of a finished run: 0 if nothing failed unexpectedly, 1 otherwise.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ExitStatus(u32);

impl ExitStatus {
    pub const SUCCESS: Self = Self(0);
    pub const FAILURE: Self = Self(1);
    /// The run was cut short by a [`FatalAbort`](crate::FatalAbort).
    pub const ABORT: Self = Self(ABORT_EXIT_CODE);

    #[inline]
    #[must_use]
    pub const fn code(self) -> u32 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 == 0
    }
}

/// Running tally of selftest results plus the current name prefix.
#[derive(Debug)]
pub struct Report {
    tests: u32,
    failures: u32,
    xfailures: u32,
    skipped: u32,
    prefixes: [&'static str; MAX_PREFIX_DEPTH],
    depth: usize,
}

impl Default for Report {
    fn default() -> Self {
        Self::new()
    }
}

impl Report {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tests: 0,
            failures: 0,
            xfailures: 0,
            skipped: 0,
            prefixes: [""; MAX_PREFIX_DEPTH],
            depth: 0,
        }
    }

    /// Push a prefix that is prepended to every following result.
    ///
    /// Pushing beyond [`MAX_PREFIX_DEPTH`] is ignored with a warning.
    pub fn prefix_push(&mut self, prefix: &'static str) {
        if self.depth == MAX_PREFIX_DEPTH {
            log::warn!("report prefix stack full, dropping {prefix:?}");
            return;
        }
        self.prefixes[self.depth] = prefix;
        self.depth += 1;
    }

    /// Pop the innermost prefix; popping an empty stack is a no-op.
    pub const fn prefix_pop(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    #[must_use]
    pub fn prefixes(&self) -> Prefixes<'_> {
        Prefixes(&self.prefixes[..self.depth])
    }

    /// Record one result. Returns `pass` for convenient chaining.
    pub fn report(&mut self, name: impl fmt::Display, pass: bool) -> bool {
        self.tests += 1;
        if pass {
            info!(target: "report", "PASS: {}{name}", self.prefixes());
        } else {
            self.failures += 1;
            info!(target: "report", "FAIL: {}{name}", self.prefixes());
        }
        pass
    }

    /// Record a result that is expected to fail when `xfail` is set.
    ///
    /// An unexpected pass counts as a failure.
    pub fn report_xfail(&mut self, name: impl fmt::Display, xfail: bool, pass: bool) -> bool {
        if !xfail {
            return self.report(name, pass);
        }
        self.tests += 1;
        if pass {
            self.failures += 1;
            info!(target: "report", "XPASS: {}{name}", self.prefixes());
        } else {
            self.xfailures += 1;
            info!(target: "report", "XFAIL: {}{name}", self.prefixes());
        }
        pass
    }

    pub fn report_skip(&mut self, name: impl fmt::Display) {
        self.skipped += 1;
        info!(target: "report", "SKIP: {}{name}", self.prefixes());
    }

    #[must_use]
    pub const fn tests(&self) -> u32 {
        self.tests
    }

    #[must_use]
    pub const fn failures(&self) -> u32 {
        self.failures
    }

    #[must_use]
    pub const fn expected_failures(&self) -> u32 {
        self.xfailures
    }

    #[must_use]
    pub const fn skipped(&self) -> u32 {
        self.skipped
    }

    /// Print the `SUMMARY:` line and compute the exit status.
    pub fn summary(&self) -> ExitStatus {
        info!(target: "report", "SUMMARY: {}", Summary(self));
        if self.failures > 0 {
            ExitStatus::FAILURE
        } else {
            ExitStatus::SUCCESS
        }
    }
}

/// The active prefix stack, rendered as `"outer: inner: "`.
#[derive(Debug, Copy, Clone)]
pub struct Prefixes<'a>(&'a [&'static str]);

impl fmt::Display for Prefixes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for prefix in self.0 {
            write!(f, "{prefix}: ")?;
        }
        Ok(())
    }
}

struct Summary<'a>(&'a Report);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.0;
        write!(f, "{} tests", r.tests)?;
        if r.failures > 0 {
            write!(f, ", {} unexpected failures", r.failures)?;
        }
        if r.xfailures > 0 {
            write!(f, ", {} expected failures", r.xfailures)?;
        }
        if r.skipped > 0 {
            write!(f, ", {} skipped", r.skipped)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_lists_only_nonzero_counters() {
        let mut r = Report::new();
        r.report("a", true);
        assert_eq!(format!("{}", Summary(&r)), "1 tests");
        r.report("b", false);
        r.report_skip("c");
        assert_eq!(
            format!("{}", Summary(&r)),
            "2 tests, 1 unexpected failures, 1 skipped"
        );
    }
}
