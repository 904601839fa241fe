//! Release tree assembly.
//!
//! The release tree is rebuilt from scratch on every run: the previous tree is
//! removed, then each [`StructureEntry`] is materialised in declared order.
//! A failure part way through leaves the half-built tree in place; the next
//! run removes it.

use crate::error::{ReleaseError, Result};
use crate::output::write_line;
use crate::structure::{CopySpec, FileSource, StructureEntry};
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, trace};
use std::fs;
use std::io::{ErrorKind, Write};
use walkdir::WalkDir;

/// Directory entry name skipped when copying every file in a directory.
pub const VCS_SENTINEL: &str = "CVS";

/// What the assembler created.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AssemblyReport {
    /// Directories created, including copied tree roots.
    pub directories: Vec<Utf8PathBuf>,
    /// Files copied, at their destination paths.
    pub files: Vec<Utf8PathBuf>,
}

/// Remove the release tree left by a previous run.
///
/// A missing tree is not an error.
///
/// # Errors
///
/// Returns [`ReleaseError::Filesystem`] if the tree exists but cannot be
/// removed.
pub fn clean_release_root(release_root: &Utf8Path, out: &mut dyn Write) -> Result<()> {
    write_line(out, "Cleanup release folder...");
    match fs::remove_dir_all(release_root) {
        Ok(()) => {
            debug!("removed previous release tree {release_root}");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ReleaseError::filesystem("remove", release_root)(e)),
    }
}

/// Materialise `entries` under `release_root`, reading from `source_root`.
///
/// # Errors
///
/// Returns [`ReleaseError::DestinationExists`] if a tree copy targets an
/// existing directory, or [`ReleaseError::Filesystem`] naming the failing
/// operation and path for any other filesystem failure, including a missing
/// source.
pub fn assemble(
    entries: &[StructureEntry],
    source_root: &Utf8Path,
    release_root: &Utf8Path,
    out: &mut dyn Write,
) -> Result<AssemblyReport> {
    write_line(out, "Make release folders structure...");
    let mut report = AssemblyReport::default();

    for entry in entries {
        let dest = entry.destination(release_root);
        match entry.spec() {
            CopySpec::CopyTree(source) => {
                let source = source_root.join(source);
                write_line(
                    out,
                    format_args!("Copying folder \"{source}\" into \"{dest}\""),
                );
                copy_tree(&source, &dest, &mut report)?;
            }
            CopySpec::EnsureDir => make_dir(&dest, out, &mut report)?,
            CopySpec::CopyFiles(sources) => {
                make_dir(&dest, out, &mut report)?;
                for file_source in sources {
                    copy_source(file_source, source_root, &dest, out, &mut report)?;
                }
            }
        }
    }

    Ok(report)
}

fn make_dir(dest: &Utf8Path, out: &mut dyn Write, report: &mut AssemblyReport) -> Result<()> {
    write_line(out, format_args!("Making folder \"{dest}\""));
    fs::create_dir(dest).map_err(ReleaseError::filesystem("create directory", dest))?;
    report.directories.push(dest.to_owned());
    Ok(())
}

fn copy_source(
    file_source: &FileSource,
    source_root: &Utf8Path,
    dest_dir: &Utf8Path,
    out: &mut dyn Write,
    report: &mut AssemblyReport,
) -> Result<()> {
    let source = source_root.join(file_source.path());
    match file_source {
        FileSource::Exact(_) => {
            write_line(
                out,
                format_args!("Copying file \"{source}\" into folder \"{dest_dir}\""),
            );
            copy_file_into(&source, dest_dir, report)
        }
        FileSource::AllFilesIn(_) => {
            write_line(
                out,
                format_args!("Copying files \"{source}/*\" into folder \"{dest_dir}\""),
            );
            copy_all_files(&source, dest_dir, report)
        }
    }
}

/// Copy every regular file directly inside `source_dir` into `dest_dir`.
fn copy_all_files(
    source_dir: &Utf8Path,
    dest_dir: &Utf8Path,
    report: &mut AssemblyReport,
) -> Result<()> {
    let mut files = Vec::new();
    for entry in
        source_dir.read_dir_utf8().map_err(ReleaseError::filesystem("read directory", source_dir))?
    {
        let entry = entry.map_err(ReleaseError::filesystem("read directory", source_dir))?;
        if entry.file_name() == VCS_SENTINEL {
            trace!("skipping {}", entry.path());
            continue;
        }
        if entry.path().is_file() {
            files.push(entry.into_path());
        }
    }
    // Directory iteration order is platform-defined.
    files.sort();

    for file in files {
        copy_file_into(&file, dest_dir, report)?;
    }
    Ok(())
}

fn copy_file_into(
    source: &Utf8Path,
    dest_dir: &Utf8Path,
    report: &mut AssemblyReport,
) -> Result<()> {
    let Some(name) = source.file_name() else {
        return Err(ReleaseError::filesystem("copy", source)(std::io::Error::new(
            ErrorKind::InvalidInput,
            "source has no file name",
        )));
    };
    let dest = dest_dir.join(name);
    debug!("copying {source} to {dest}");
    fs::copy(source, &dest).map_err(ReleaseError::filesystem("copy", source))?;
    report.files.push(dest);
    Ok(())
}

/// Recursively copy `source` to `dest`, which must not exist yet.
///
/// Entries are visited parents first and in file-name order, so each
/// directory is created before anything is copied into it.
fn copy_tree(source: &Utf8Path, dest: &Utf8Path, report: &mut AssemblyReport) -> Result<()> {
    if dest.exists() {
        return Err(ReleaseError::DestinationExists {
            path: dest.to_owned(),
        });
    }
    if !source.is_dir() {
        return Err(ReleaseError::filesystem("copy directory", source)(
            std::io::Error::from(ErrorKind::NotFound),
        ));
    }

    for entry in WalkDir::new(source).follow_links(true).sort_by_file_name() {
        let entry =
            entry.map_err(|e| ReleaseError::filesystem("read directory", source)(e.into()))?;
        let path = Utf8Path::from_path(entry.path()).ok_or_else(|| {
            ReleaseError::filesystem("read directory", source)(std::io::Error::new(
                ErrorKind::InvalidData,
                format!("non UTF-8 path {}", entry.path().display()),
            ))
        })?;
        let relative = path.strip_prefix(source).unwrap_or(path);
        let target = if relative.as_str().is_empty() {
            dest.to_owned()
        } else {
            dest.join(relative)
        };

        if entry.file_type().is_dir() {
            fs::create_dir(&target)
                .map_err(ReleaseError::filesystem("create directory", &target))?;
            report.directories.push(target);
        } else {
            trace!("copying {path} to {target}");
            fs::copy(path, &target).map_err(ReleaseError::filesystem("copy", path))?;
            report.files.push(target);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "assembler_tests.rs"]
mod tests;
