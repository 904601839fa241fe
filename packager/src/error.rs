//! Error types for the release packager.
//!
//! Every failure in the release pipeline is fatal. This module defines the
//! semantic error variants reported to the operator and maps each of them to
//! the process exit code the `make-release` binary terminates with.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Exit code used for failures detected by the packager itself rather than
/// reported by an external process.
pub const VALIDATION_EXIT_CODE: i32 = -1;

/// Errors that can occur while producing a release.
#[derive(Debug, Error)]
pub enum ReleaseError {
    /// No line in the version source matched the version pattern.
    #[error("cannot extract version from {path}")]
    VersionNotFound {
        /// The file that was scanned.
        path: Utf8PathBuf,
    },

    /// A version line matched but one of its numbers is not representable.
    #[error("invalid version number in line {line:?}: {reason}")]
    InvalidVersionNumber {
        /// The matched line.
        line: String,
        /// Description of the parse failure.
        reason: String,
    },

    /// The build command exited with a non-zero status.
    #[error("compilation failed: {command} exited with status {status}")]
    BuildFailed {
        /// The build command that was run.
        command: String,
        /// The exit status reported by the build command.
        status: i32,
    },

    /// The build command could not be started.
    #[error("compilation failed: cannot run {command}: {source}")]
    BuildSpawn {
        /// The build command that was run.
        command: String,
        /// The underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// The build command succeeded but did not produce the expected artifact.
    #[error("compilation failed: artifact {path} was not produced")]
    ArtifactMissing {
        /// Where the artifact was expected.
        path: Utf8PathBuf,
    },

    /// The structured metadata file lacks the expected `VERSION` object.
    #[error("cannot find VERSION in {path}: {reason}")]
    MalformedMetadata {
        /// Path to the metadata file.
        path: Utf8PathBuf,
        /// Description of what is wrong with the file.
        reason: String,
    },

    /// A filesystem operation on a release input or output failed.
    #[error("failed to {operation} {path}: {source}")]
    Filesystem {
        /// The operation that failed (copy, create, remove, ...).
        operation: &'static str,
        /// The path the operation targeted.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A whole-tree copy targets a directory that already exists.
    #[error("cannot copy tree into {path}: destination already exists")]
    DestinationExists {
        /// The destination directory.
        path: Utf8PathBuf,
    },

    /// The archive for this version exists and overwriting was not permitted.
    #[error("package for this version already exists: {path}")]
    PackageExists {
        /// Path to the existing archive.
        path: Utf8PathBuf,
    },

    /// The archiver exited with a non-zero status.
    #[error("failed to make the package: archiver exited with status {status}")]
    PackagingFailed {
        /// The exit status reported by the archiver.
        status: i32,
    },

    /// The archiver could not be started.
    #[error("failed to make the package: cannot run {program}: {source}")]
    ArchiverSpawn {
        /// The archiver program.
        program: String,
        /// The underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// The built-in archiver failed to write the archive.
    #[error("failed to make the package {path}: {source}")]
    Archive {
        /// Path to the archive being written.
        path: Utf8PathBuf,
        /// The underlying zip error.
        #[source]
        source: zip::result::ZipError,
    },

    /// The release configuration could not be read or is invalid.
    #[error("invalid release configuration {path}: {reason}")]
    Config {
        /// Path to the configuration file.
        path: Utf8PathBuf,
        /// Description of the problem.
        reason: String,
    },

    /// The release structure cannot be assembled in the declared order.
    #[error("invalid release structure: {reason}")]
    InvalidStructure {
        /// Description of the problem.
        reason: String,
    },
}

impl ReleaseError {
    /// Return the process exit code for this error.
    ///
    /// Failures reported by the build command or the archiver propagate that
    /// process's own status; everything else uses [`VALIDATION_EXIT_CODE`].
    ///
    /// # Examples
    ///
    /// ```
    /// use release_packager::error::{ReleaseError, VALIDATION_EXIT_CODE};
    ///
    /// let err = ReleaseError::PackagingFailed { status: 2 };
    /// assert_eq!(err.exit_code(), 2);
    ///
    /// let err = ReleaseError::PackageExists { path: "out.zip".into() };
    /// assert_eq!(err.exit_code(), VALIDATION_EXIT_CODE);
    /// ```
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::BuildFailed { status, .. } | Self::PackagingFailed { status } if *status != 0 => {
                *status
            }
            _ => VALIDATION_EXIT_CODE,
        }
    }

    /// Build a [`ReleaseError::Filesystem`] for `operation` on `path`.
    ///
    /// Intended for use with `map_err`.
    pub fn filesystem(
        operation: &'static str,
        path: impl Into<Utf8PathBuf>,
    ) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Filesystem {
            operation,
            path,
            source,
        }
    }
}

/// Result type alias using [`ReleaseError`].
pub type Result<T> = std::result::Result<T, ReleaseError>;
