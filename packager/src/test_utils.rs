//! Shared test utilities for the release packager crate.

use crate::executor::CommandExecutor;
use camino::{Utf8Path, Utf8PathBuf};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::process::ExitStatus;

/// Creates an `ExitStatus` from an exit code (Unix implementation).
#[cfg(unix)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    ExitStatus::from_raw(code << 8)
}

/// Creates an `ExitStatus` from an exit code (Windows implementation).
#[cfg(windows)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;

    ExitStatus::from_raw(code as u32)
}

/// Represents an expected command invocation for testing.
#[derive(Debug)]
pub struct ExpectedCall {
    /// The program to execute (e.g., "7z").
    pub program: String,
    /// The arguments to pass to the program.
    pub args: Vec<String>,
    /// The exit code to report when this command is invoked.
    pub code: i32,
    /// A file the command "produces" before exiting, such as a build artifact.
    pub creates: Option<Utf8PathBuf>,
}

impl ExpectedCall {
    /// Expect `program` to run with `args` and exit with `code`.
    pub fn new(program: &str, args: &[&str], code: i32) -> Self {
        Self {
            program: program.to_owned(),
            args: args.iter().map(|arg| (*arg).to_owned()).collect(),
            code,
            creates: None,
        }
    }

    /// Write a placeholder file at `path` when the call is replayed.
    #[must_use]
    pub fn creating(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.creates = Some(path.into());
        self
    }
}

/// A stub implementation of `CommandExecutor` for testing.
///
/// Records expected command invocations and returns predefined statuses,
/// allowing tests to verify command execution without spawning processes.
#[derive(Debug)]
pub struct StubExecutor {
    expected: RefCell<VecDeque<ExpectedCall>>,
}

impl StubExecutor {
    /// Creates a new `StubExecutor` with the given expected calls.
    pub fn new(expected: Vec<ExpectedCall>) -> Self {
        Self {
            expected: RefCell::new(expected.into()),
        }
    }

    /// Asserts that all expected command invocations have been consumed.
    ///
    /// # Panics
    ///
    /// Panics if there are remaining expected calls that were not invoked.
    pub fn assert_finished(&self) {
        assert!(
            self.expected.borrow().is_empty(),
            "expected no further command invocations"
        );
    }
}

impl CommandExecutor for StubExecutor {
    fn run(
        &self,
        program: &str,
        args: &[String],
        _working_dir: &Utf8Path,
    ) -> std::io::Result<ExitStatus> {
        let mut expected = self.expected.borrow_mut();
        let call = expected.pop_front().expect("unexpected command invocation");

        assert_eq!(call.program, program);
        assert_eq!(call.args.as_slice(), args);

        if let Some(path) = &call.creates {
            std::fs::write(path, b"stub output")?;
        }
        Ok(exit_status(call.code))
    }
}
