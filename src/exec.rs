//! External tool execution seam.
//!
//! The runner talks to the outside world exclusively through `make`,
//! `openocd`, `lsusb` and `udevadm`. `CommandRunner` abstracts those
//! subprocess calls so the whole lifecycle can be exercised against a
//! scripted mock.

use std::collections::HashSet;
use std::process::Command;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::debug;

/// Failure to launch an external tool.
///
/// Exit statuses are deliberately not part of this error: the tools report
/// their own failures on the inherited stdio, and a non-zero status from
/// `lsusb` only means the filter matched nothing.
#[derive(Debug, Error)]
#[error("failed to run '{program}': {source}")]
pub struct ToolError {
    program: String,
    #[source]
    source: std::io::Error,
}

impl ToolError {
    /// Create a spawn failure for `program`.
    pub fn spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        Self {
            program: program.into(),
            source,
        }
    }
}

/// Trait for running external tools.
pub trait CommandRunner: std::fmt::Debug {
    /// Run a tool with inherited stdio, waiting for it to exit.
    ///
    /// The exit status is logged and otherwise ignored; build and probe
    /// failures surface through the tool's own output.
    fn run(&self, program: &str, args: &[String]) -> Result<(), ToolError>;

    /// Run a tool and capture its stdout.
    ///
    /// Like `run`, the exit status is only logged. Callers see an empty
    /// string when the tool produced no output.
    fn capture(&self, program: &str, args: &[String]) -> Result<String, ToolError>;
}

/// Runner over real host processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<(), ToolError> {
        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(|e| ToolError::spawn(program, e))?;
        debug!(program, %status, "external tool exited");
        Ok(())
    }

    fn capture(&self, program: &str, args: &[String]) -> Result<String, ToolError> {
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| ToolError::spawn(program, e))?;
        debug!(program, status = %output.status, "external tool exited");
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// One recorded tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

#[derive(Debug, Default)]
struct MockRunnerState {
    /// Stubbed stdout for `capture` calls; later stubs win over earlier ones.
    capture_rules: Vec<CaptureRule>,
    /// Programs whose launch should fail.
    failing: HashSet<String>,
    /// Log of every invocation, `run` and `capture` alike.
    invocations: Vec<Invocation>,
}

#[derive(Debug)]
struct CaptureRule {
    program: String,
    arg_contains: String,
    stdout: String,
}

/// Mock runner for testing.
///
/// Records every invocation and replays stubbed stdout for `capture` calls.
/// Stubs are matched by program name plus an argument substring, so one mock
/// can answer `udevadm` differently per tty device.
///
/// # Example
/// ```
/// use cts_runner::exec::{CommandRunner, MockRunner};
///
/// let runner = MockRunner::new();
/// runner.stub_capture("lsusb", "", "  iSerial                 3 ABC123\n");
///
/// let out = runner.capture("lsusb", &["-v".to_string()]).unwrap();
/// assert!(out.contains("ABC123"));
/// assert_eq!(runner.invocations().len(), 1);
/// ```
#[derive(Debug, Default, Clone)]
pub struct MockRunner {
    state: Arc<Mutex<MockRunnerState>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stub the stdout returned by `capture` for `program` when any argument
    /// contains `arg_contains`. An empty `arg_contains` matches every
    /// invocation of the program.
    pub fn stub_capture(&self, program: &str, arg_contains: &str, stdout: &str) {
        let mut state = self.state.lock().unwrap();
        state.capture_rules.push(CaptureRule {
            program: program.to_string(),
            arg_contains: arg_contains.to_string(),
            stdout: stdout.to_string(),
        });
    }

    /// Make every launch of `program` fail as if the binary were missing.
    pub fn fail_spawn(&self, program: &str) {
        let mut state = self.state.lock().unwrap();
        state.failing.insert(program.to_string());
    }

    /// All invocations recorded so far.
    pub fn invocations(&self) -> Vec<Invocation> {
        let state = self.state.lock().unwrap();
        state.invocations.clone()
    }

    /// Argument lists of every invocation of `program`, in call order.
    pub fn calls_to(&self, program: &str) -> Vec<Vec<String>> {
        let state = self.state.lock().unwrap();
        state
            .invocations
            .iter()
            .filter(|inv| inv.program == program)
            .map(|inv| inv.args.clone())
            .collect()
    }

    fn record(&self, program: &str, args: &[String]) -> Result<(), ToolError> {
        let mut state = self.state.lock().unwrap();
        state.invocations.push(Invocation {
            program: program.to_string(),
            args: args.to_vec(),
        });
        if state.failing.contains(program) {
            return Err(ToolError::spawn(
                program,
                std::io::Error::new(std::io::ErrorKind::NotFound, "mocked missing binary"),
            ));
        }
        Ok(())
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<(), ToolError> {
        self.record(program, args)
    }

    fn capture(&self, program: &str, args: &[String]) -> Result<String, ToolError> {
        self.record(program, args)?;
        let state = self.state.lock().unwrap();
        let stdout = state
            .capture_rules
            .iter()
            .rev()
            .find(|rule| {
                rule.program == program
                    && (rule.arg_contains.is_empty()
                        || args.iter().any(|a| a.contains(&rule.arg_contains)))
            })
            .map(|rule| rule.stdout.clone())
            .unwrap_or_default();
        Ok(stdout)
    }
}
