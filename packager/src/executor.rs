//! External command execution.
//!
//! The build command and the external archiver are opaque processes; the
//! pipeline only observes their exit status. [`CommandExecutor`] is the seam
//! that lets tests replace process spawning with canned statuses.

use camino::Utf8Path;
use log::debug;
use std::process::{Command, ExitStatus};

/// Abstraction for running external commands.
#[cfg_attr(test, mockall::automock)]
pub trait CommandExecutor {
    /// Runs `program` with `args` in `working_dir` and waits for it to exit.
    ///
    /// Standard streams are inherited so the operator sees the command's own
    /// output.
    ///
    /// # Errors
    ///
    /// Returns any I/O error encountered while spawning the command.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use camino::Utf8Path;
    /// use release_packager::executor::{CommandExecutor, SystemCommandExecutor};
    ///
    /// let executor = SystemCommandExecutor;
    /// let status = executor.run("make_binary.cmd", &[], Utf8Path::new("Tools"))?;
    /// assert!(status.success());
    /// # Ok::<(), std::io::Error>(())
    /// ```
    fn run(&self, program: &str, args: &[String], working_dir: &Utf8Path)
    -> std::io::Result<ExitStatus>;
}

/// Executes commands on the host system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor;

impl CommandExecutor for SystemCommandExecutor {
    fn run(
        &self,
        program: &str,
        args: &[String],
        working_dir: &Utf8Path,
    ) -> std::io::Result<ExitStatus> {
        debug!("running {program} {args:?} in {working_dir}");
        Command::new(program)
            .args(args)
            .current_dir(working_dir)
            .status()
    }
}

/// Return the numeric exit code of `status`.
///
/// Processes terminated by a signal have no code; they are reported as `-1`.
#[must_use]
pub fn status_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}
