//! Subprocess protocol for the external DFS client
//!
//! The tool's return codes and stderr chatter vary across its versions and
//! across the storage flavors it fronts (a real cluster filesystem vs. an
//! object store behind the same CLI surface). Every call site therefore
//! declares its own tolerance: a set of acceptable return codes and a set of
//! stderr patterns that neutralize an otherwise-bad exit.

use std::process::{Command, Stdio};

use regex::Regex;
use strata_core::{Error, Result};
use tracing::{debug, error};

/// Tolerance policy for one tool invocation
pub struct InvokeOpts {
    ok_statuses: Vec<i32>,
    ok_stderr: Vec<Regex>,
    capture: bool,
}

impl Default for InvokeOpts {
    fn default() -> Self {
        InvokeOpts {
            ok_statuses: vec![0],
            ok_stderr: Vec::new(),
            capture: false,
        }
    }
}

impl InvokeOpts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep stdout for the caller instead of logging it
    pub fn capture_stdout() -> Self {
        InvokeOpts {
            capture: true,
            ..Self::default()
        }
    }

    /// Replace the set of acceptable return codes (default `{0}`)
    pub fn ok_statuses(mut self, statuses: &[i32]) -> Self {
        self.ok_statuses = statuses.to_vec();
        self
    }

    /// Add a stderr pattern that neutralizes a bad return code
    pub fn tolerate(mut self, pattern: &Regex) -> Self {
        self.ok_stderr.push(pattern.clone());
        self
    }
}

/// Outcome of an accepted invocation
#[derive(Debug)]
pub struct Invoked {
    /// Exit status (-1 if the child died to a signal)
    pub status: i32,
    /// Captured stdout; empty unless the opts asked for capture
    pub stdout: String,
}

/// Run `bin` + `args` to completion and classify the outcome.
///
/// The call is accepted if the return code is in `ok_statuses` or the whole
/// stderr text matches one of `ok_stderr` (the pattern overrides the code).
/// Anything else is [`Error::Command`]. Both streams are logged at debug
/// level on a zero exit and error level otherwise; stdout logging is skipped
/// when the caller captures it.
pub fn invoke(bin: &[String], args: &[&str], opts: &InvokeOpts) -> Result<Invoked> {
    let mut argv: Vec<String> = bin.to_vec();
    argv.extend(args.iter().map(|a| a.to_string()));

    debug!("> {}", argv.join(" "));

    let output = Command::new(&argv[0])
        .args(&argv[1..])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()?;

    let status = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    let stderr_ok = opts.ok_stderr.iter().any(|re| re.is_match(&stderr));
    let noisy = status != 0;

    if !opts.capture {
        for line in stdout.lines() {
            if noisy {
                error!("STDOUT: {}", line);
            } else {
                debug!("STDOUT: {}", line);
            }
        }
    }
    if !stderr_ok {
        for line in stderr.lines() {
            if noisy {
                error!("STDERR: {}", line);
            } else {
                debug!("STDERR: {}", line);
            }
        }
    }

    if !stderr_ok && !opts.ok_statuses.contains(&status) {
        return Err(Error::Command { status, argv });
    }

    Ok(Invoked { status, stdout })
}
