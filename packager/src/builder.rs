//! Plugin build invocation.
//!
//! The build is an opaque external command run without arguments from the
//! configuration directory. Success is judged by its exit status and, when an
//! artifact is configured, by the artifact existing afterwards. Any stale
//! artifact is removed first so a failed build cannot leave an old binary
//! looking fresh.

use crate::config::BuildSpec;
use crate::error::{ReleaseError, Result};
use crate::executor::{CommandExecutor, status_code};
use crate::output::write_line;
use camino::Utf8Path;
use log::debug;
use std::io::{ErrorKind, Write};

/// Runs the configured build command.
pub struct Builder<'a> {
    spec: &'a BuildSpec,
    working_dir: &'a Utf8Path,
    executor: &'a dyn CommandExecutor,
}

impl<'a> Builder<'a> {
    /// Create a builder that runs `spec` in `working_dir`.
    #[must_use]
    pub fn new(
        spec: &'a BuildSpec,
        working_dir: &'a Utf8Path,
        executor: &'a dyn CommandExecutor,
    ) -> Self {
        Self {
            spec,
            working_dir,
            executor,
        }
    }

    /// Compile the sources and confirm the artifact was produced.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseError::BuildSpawn`] if the command cannot be started,
    /// [`ReleaseError::BuildFailed`] if it exits with a non-zero status, or
    /// [`ReleaseError::ArtifactMissing`] if the artifact is absent afterwards.
    pub fn build(&self, out: &mut dyn Write) -> Result<()> {
        if let Some(artifact) = &self.spec.artifact {
            remove_stale_artifact(artifact)?;
        }

        write_line(out, "Compiling the sources in PROD mode...");
        let command = &self.spec.command;
        let status = self
            .executor
            .run(command, &[], self.working_dir)
            .map_err(|source| ReleaseError::BuildSpawn {
                command: command.clone(),
                source,
            })?;

        if !status.success() {
            return Err(ReleaseError::BuildFailed {
                command: command.clone(),
                status: status_code(status),
            });
        }

        match &self.spec.artifact {
            Some(artifact) if !artifact.is_file() => Err(ReleaseError::ArtifactMissing {
                path: artifact.clone(),
            }),
            Some(artifact) => {
                debug!("build produced {artifact}");
                Ok(())
            }
            None => Ok(()),
        }
    }
}

fn remove_stale_artifact(artifact: &Utf8Path) -> Result<()> {
    match std::fs::remove_file(artifact) {
        Ok(()) => {
            debug!("removed stale artifact {artifact}");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ReleaseError::filesystem("remove", artifact)(e)),
    }
}
