//! Outcome classification for the subprocess protocol
#![cfg(unix)]

use regex::Regex;
use strata_core::Error;
use strata_hdfs::invoke::{invoke, InvokeOpts};
use strata_testing::MockScript;

fn failing_tool() -> MockScript {
    MockScript::new(
        "#!/bin/sh\n\
         echo 'output line'\n\
         echo 'scary diagnostic: nothing actually wrong' >&2\n\
         exit 3\n",
    )
    .unwrap()
}

#[test]
fn test_default_policy_accepts_only_zero() {
    let ok = MockScript::new("#!/bin/sh\nexit 0\n").unwrap();
    invoke(&ok.bin(), &["anything"], &InvokeOpts::new()).unwrap();

    let tool = failing_tool();
    let err = invoke(&tool.bin(), &["x"], &InvokeOpts::new()).unwrap_err();
    match err {
        Error::Command { status, argv } => {
            assert_eq!(status, 3);
            assert_eq!(argv.last().map(String::as_str), Some("x"));
        }
        other => panic!("expected command error, got {}", other),
    }
}

#[test]
fn test_acceptable_return_codes() {
    let tool = failing_tool();
    let out = invoke(&tool.bin(), &["x"], &InvokeOpts::new().ok_statuses(&[0, 3])).unwrap();
    assert_eq!(out.status, 3);
}

#[test]
fn test_tolerated_stderr_overrides_bad_status() {
    let tool = failing_tool();
    let pattern = Regex::new(r"^scary diagnostic: .*").unwrap();
    let out = invoke(&tool.bin(), &["x"], &InvokeOpts::new().tolerate(&pattern)).unwrap();
    assert_eq!(out.status, 3);
}

#[test]
fn test_unrelated_stderr_pattern_does_not_help() {
    let tool = failing_tool();
    let pattern = Regex::new(r"^some other complaint").unwrap();
    let result = invoke(&tool.bin(), &["x"], &InvokeOpts::new().tolerate(&pattern));
    assert!(matches!(result, Err(Error::Command { status: 3, .. })));
}

#[test]
fn test_captured_stdout_comes_back_verbatim() {
    let tool = MockScript::new("#!/bin/sh\necho 'first'\necho 'second'\n").unwrap();
    let out = invoke(&tool.bin(), &[], &InvokeOpts::capture_stdout()).unwrap();
    assert_eq!(out.stdout, "first\nsecond\n");
}

#[test]
fn test_uncaptured_stdout_is_not_returned() {
    let tool = MockScript::new("#!/bin/sh\necho 'logged, not returned'\n").unwrap();
    let out = invoke(&tool.bin(), &[], &InvokeOpts::new()).unwrap();
    assert_eq!(out.stdout, "");
    assert_eq!(out.status, 0);
}

#[test]
fn test_arguments_are_appended_to_the_configured_argv() {
    // the configured binary may itself carry arguments
    let tool = MockScript::new("#!/bin/sh\nprintf '%s|' \"$@\"\n").unwrap();
    let mut bin = tool.bin();
    bin.push("--config".to_string());
    bin.push("/etc/dfs".to_string());

    let out = invoke(&bin, &["fs", "-lsr", "hdfs:///x"], &InvokeOpts::capture_stdout()).unwrap();
    assert_eq!(out.stdout, "--config|/etc/dfs|fs|-lsr|hdfs:///x|");
}

#[test]
fn test_missing_binary_surfaces_as_io_error() {
    let result = invoke(
        &["/no/such/binary-at-all".to_string()],
        &["version"],
        &InvokeOpts::new(),
    );
    assert!(matches!(result, Err(Error::Io(_))));
}
