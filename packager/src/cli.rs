//! CLI argument definitions for the release packager.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use crate::config::DEFAULT_CONFIG_FILE;
use crate::pipeline::RunFlags;
use camino::Utf8PathBuf;
use clap::Parser;

/// Build, assemble and package a plugin release.
#[derive(Parser, Debug)]
#[command(name = "make-release")]
#[command(version, about)]
#[command(long_about = concat!(
    "Build, assemble and package a plugin release.\n\n",
    "The release version is read from the sources, the plugin is built with the ",
    "configured build command, and the release tree is rebuilt from scratch ",
    "according to the structure in the release configuration. The version is ",
    "stamped into the metadata file, which is then copied into the release tree.\n\n",
    "Packaging into an archive is optional and never replaces an existing archive ",
    "unless --overwrite is given.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Rebuild the release tree only:\n",
    "    $ make-release\n\n",
    "  Rebuild and package:\n",
    "    $ make-release -p\n\n",
    "  Re-package a version that was already released:\n",
    "    $ make-release -p -o\n\n",
    "  Preview the plan without touching anything:\n",
    "    $ make-release --dry-run -p\n\n",
    "EXIT STATUS:\n",
    "  0 on success, the build command's or archiver's own status when they fail,\n",
    "  -1 for any other failure, and 2 for invalid arguments.",
))]
pub struct Cli {
    /// Package the release tree into an archive.
    #[arg(short = 'p', long = "package")]
    pub package: bool,

    /// Replace an existing archive for the same version.
    #[arg(short = 'o', long = "overwrite")]
    pub overwrite: bool,

    /// Print the resolved plan and exit without side effects.
    #[arg(short = 'd', long = "dry-run")]
    pub dry_run: bool,

    /// Release configuration file.
    #[arg(short = 'c', long = "config", value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    pub config: Utf8PathBuf,
}

impl Cli {
    /// Return the run flags selected on the command line.
    #[must_use]
    pub const fn run_flags(&self) -> RunFlags {
        RunFlags {
            make_package: self.package,
            overwrite_package: self.overwrite,
            dry_run: self.dry_run,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
