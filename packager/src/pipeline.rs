//! Release pipeline orchestration.
//!
//! A release runs a fixed sequence of stages and stops at the first failure:
//!
//! 1. extract the version from the sources;
//! 2. build the plugin;
//! 3. remove the previous release tree;
//! 4. assemble the release tree;
//! 5. stamp the version into the metadata file and copy it into the tree;
//! 6. optionally package the tree into an archive.
//!
//! The extracted [`Version`] is passed explicitly to every stage that needs it.

use crate::assembler::{assemble, clean_release_root};
use crate::builder::Builder;
use crate::config::{ArchiverConfig, ReleaseConfig};
use crate::error::Result;
use crate::executor::CommandExecutor;
use crate::naming::ReleaseName;
use crate::output::{SUCCESS_LINE, write_line};
use crate::packaging::{Archiver, BuiltinArchiver, ExternalArchiver, PackageRequest, make_package};
use crate::stamper::{stamp_version, sync_metadata};
use crate::version::{Version, extract_version};
use camino::Utf8PathBuf;
use log::debug;
use std::io::Write;

/// Operator choices for a single run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunFlags {
    /// Produce the release archive.
    pub make_package: bool,
    /// Replace an existing archive for the same version.
    pub overwrite_package: bool,
    /// Print the resolved plan and stop without side effects.
    pub dry_run: bool,
}

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseOutcome {
    /// The released version.
    pub version: Version,
    /// The archive written, when packaging was requested.
    pub archive: Option<Utf8PathBuf>,
}

/// Run the release pipeline described by `config`.
///
/// In dry-run mode only the version is read and the plan printed; nothing is
/// built, removed, copied or written.
///
/// # Errors
///
/// Returns the first stage error. Stages after the failing one do not run.
pub fn run_release(
    config: &ReleaseConfig,
    flags: RunFlags,
    executor: &dyn CommandExecutor,
    out: &mut dyn Write,
) -> Result<ReleaseOutcome> {
    let version = extract_version(&config.version_file, &config.version_pattern, out)?;
    let name = ReleaseName::new(config.product.as_str(), version);

    if flags.dry_run {
        print_plan(config, flags, &name, out);
        return Ok(ReleaseOutcome {
            version,
            archive: None,
        });
    }

    Builder::new(&config.build, &config.base_dir, executor).build(out)?;

    clean_release_root(&config.release_root, out)?;
    let report = assemble(
        &config.structure,
        &config.source_root,
        &config.release_root,
        out,
    )?;
    debug!(
        "assembled {} directories and {} files",
        report.directories.len(),
        report.files.len()
    );

    stamp_version(&config.metadata.source, version, out)?;
    sync_metadata(&config.metadata, &config.release_root, out)?;

    let archiver = archiver_for(config, executor);
    let request = package_request(config, flags, &name);
    let archive = make_package(&request, archiver.as_ref(), out)?;

    write_line(out, SUCCESS_LINE);
    Ok(ReleaseOutcome { version, archive })
}

/// Select the archiver named by the configuration.
#[must_use]
pub fn archiver_for<'a>(
    config: &ReleaseConfig,
    executor: &'a dyn CommandExecutor,
) -> Box<dyn Archiver + 'a> {
    match &config.archiver {
        ArchiverConfig::External { program } => Box::new(ExternalArchiver::new(
            program.as_str(),
            config.base_dir.clone(),
            executor,
        )),
        ArchiverConfig::Builtin => Box::new(BuiltinArchiver),
    }
}

fn package_request<'a>(
    config: &'a ReleaseConfig,
    flags: RunFlags,
    name: &'a ReleaseName,
) -> PackageRequest<'a> {
    PackageRequest {
        name,
        archive_dir: &config.archive_dir,
        extension: &config.archive_extension,
        title: config.display_title(),
        release_root: &config.release_root,
        requested: flags.make_package,
        overwrite: flags.overwrite_package,
    }
}

/// Print what a real run would do.
fn print_plan(config: &ReleaseConfig, flags: RunFlags, name: &ReleaseName, out: &mut dyn Write) {
    write_line(out, "Dry run - no files will be modified");
    write_line(out, "");
    write_line(out, format_args!("Release name: {name}"));
    write_line(
        out,
        format_args!(
            "Build command: {} (in {})",
            config.build.command, config.base_dir
        ),
    );
    if let Some(artifact) = &config.build.artifact {
        write_line(out, format_args!("Build artifact: {artifact}"));
    }
    write_line(out, format_args!("Source root: {}", config.source_root));
    write_line(out, format_args!("Release root: {}", config.release_root));
    write_line(out, "Release structure:");
    for entry in &config.structure {
        write_line(out, format_args!("  {entry}"));
    }
    write_line(
        out,
        format_args!(
            "Metadata file: {} -> {}",
            config.metadata.source, config.metadata.destination
        ),
    );

    let request = package_request(config, flags, name);
    if flags.make_package {
        let archiver = match &config.archiver {
            ArchiverConfig::External { program } => program.as_str(),
            ArchiverConfig::Builtin => "builtin zip",
        };
        write_line(
            out,
            format_args!("Package: {} (archiver: {archiver})", request.archive_path()),
        );
        write_line(out, format_args!("Overwrite: {}", flags.overwrite_package));
    } else {
        write_line(out, "Package: not requested");
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
