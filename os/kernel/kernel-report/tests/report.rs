use kernel_report::{ExitStatus, MAX_PREFIX_DEPTH, Report};

#[test]
fn counts_passes_and_failures() {
    let mut r = Report::new();
    assert!(r.report("true", true));
    assert!(!r.report("false", false));
    assert!(r.report("again", true));

    assert_eq!(r.tests(), 3);
    assert_eq!(r.failures(), 1);
    assert_eq!(r.summary(), ExitStatus::FAILURE);
}

#[test]
fn clean_run_exits_zero() {
    let mut r = Report::new();
    r.report("one", true);
    r.report_skip("not applicable");

    let status = r.summary();
    assert!(status.is_success());
    assert_eq!(status.code(), 0);
    assert_eq!(r.skipped(), 1);
    assert_eq!(r.tests(), 1);
}

#[test]
fn xfail_and_xpass() {
    let mut r = Report::new();

    // expected failure that does fail
    r.report_xfail("known broken", true, false);
    assert_eq!(r.failures(), 0);
    assert_eq!(r.expected_failures(), 1);

    // expected failure that passes is unexpected
    r.report_xfail("fixed meanwhile", true, true);
    assert_eq!(r.failures(), 1);

    // xfail = false behaves like report()
    r.report_xfail("plain", false, false);
    assert_eq!(r.failures(), 2);
    assert_eq!(r.tests(), 3);
}

#[test]
fn prefixes_nest_and_unwind() {
    let mut r = Report::new();
    assert_eq!(r.prefixes().to_string(), "");

    r.prefix_push("selftest");
    r.prefix_push("fp");
    assert_eq!(r.prefixes().to_string(), "selftest: fp: ");

    r.prefix_pop();
    assert_eq!(r.prefixes().to_string(), "selftest: ");

    r.prefix_pop();
    r.prefix_pop();
    assert_eq!(r.prefixes().to_string(), "");
}

#[test]
fn prefix_overflow_is_ignored() {
    let mut r = Report::new();
    for _ in 0..MAX_PREFIX_DEPTH {
        r.prefix_push("x");
    }
    r.prefix_push("dropped");
    assert!(!r.prefixes().to_string().contains("dropped"));
    assert_eq!(r.prefixes().to_string(), "x: ".repeat(MAX_PREFIX_DEPTH));
}
