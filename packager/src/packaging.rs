//! Release archive creation.
//!
//! Packaging is optional and runs last. The archive is named after the
//! release ([`ReleaseName`]) and written to the configured archive directory.
//! An existing archive for the same version is only replaced when the
//! operator explicitly allows it.
//!
//! Two [`Archiver`] implementations are provided. [`ExternalArchiver`] runs a
//! 7-Zip compatible program as `<program> a <archive> <release_root>/*`;
//! [`BuiltinArchiver`] writes a deflate-compressed zip in-process.

use crate::error::{ReleaseError, Result};
use crate::executor::{CommandExecutor, status_code};
use crate::naming::ReleaseName;
use crate::output::{write_line, write_warning_line};
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, trace};
use std::fs;
use std::io::{ErrorKind, Write};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Compresses a release tree into a single archive file.
pub trait Archiver {
    /// Archive the contents of `release_root` into `archive_path`.
    ///
    /// # Errors
    ///
    /// Returns a packaging error if the archive cannot be produced.
    fn archive(&self, release_root: &Utf8Path, archive_path: &Utf8Path) -> Result<()>;
}

/// Archiver that delegates to an external 7-Zip compatible program.
pub struct ExternalArchiver<'a> {
    program: String,
    working_dir: Utf8PathBuf,
    executor: &'a dyn CommandExecutor,
}

impl<'a> ExternalArchiver<'a> {
    /// Create an archiver running `program` from `working_dir`.
    #[must_use]
    pub fn new(
        program: impl Into<String>,
        working_dir: impl Into<Utf8PathBuf>,
        executor: &'a dyn CommandExecutor,
    ) -> Self {
        Self {
            program: program.into(),
            working_dir: working_dir.into(),
            executor,
        }
    }

    /// Return the argument list passed to the archiver program.
    #[must_use]
    pub fn arguments(release_root: &Utf8Path, archive_path: &Utf8Path) -> Vec<String> {
        vec![
            "a".to_owned(),
            archive_path.to_string(),
            format!("{release_root}/*"),
        ]
    }
}

impl Archiver for ExternalArchiver<'_> {
    fn archive(&self, release_root: &Utf8Path, archive_path: &Utf8Path) -> Result<()> {
        let args = Self::arguments(release_root, archive_path);
        let status = self
            .executor
            .run(&self.program, &args, &self.working_dir)
            .map_err(|source| ReleaseError::ArchiverSpawn {
                program: self.program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(ReleaseError::PackagingFailed {
                status: status_code(status),
            })
        }
    }
}

/// Archiver writing a zip file with the `zip` crate.
///
/// Entry names are relative to the release root and use `/` separators.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinArchiver;

impl Archiver for BuiltinArchiver {
    fn archive(&self, release_root: &Utf8Path, archive_path: &Utf8Path) -> Result<()> {
        let file = fs::File::create(archive_path)
            .map_err(ReleaseError::filesystem("create", archive_path))?;
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let zip_error = |source| ReleaseError::Archive {
            path: archive_path.to_owned(),
            source,
        };

        for (path, name) in walk(release_root)? {
            if path.is_dir() {
                trace!("adding directory {name}");
                zip.add_directory(name.as_str(), options).map_err(zip_error)?;
            } else {
                trace!("adding file {name}");
                zip.start_file(name.as_str(), options).map_err(zip_error)?;
                let contents = fs::read(&path).map_err(ReleaseError::filesystem("read", &path))?;
                zip.write_all(&contents)
                    .map_err(ReleaseError::filesystem("write", archive_path))?;
            }
        }

        zip.finish().map_err(zip_error)?;
        Ok(())
    }
}

/// List every entry under `root`, paired with its archive name. Entries come
/// in file-name order with parents before their children.
fn walk(root: &Utf8Path) -> Result<Vec<(Utf8PathBuf, String)>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry =
            entry.map_err(|e| ReleaseError::filesystem("read directory", root)(e.into()))?;
        let path = Utf8PathBuf::try_from(entry.into_path())
            .map_err(|e| ReleaseError::filesystem("read directory", root)(e.into_io_error()))?;
        let name = archive_name(root, &path);
        entries.push((path, name));
    }
    Ok(entries)
}

/// Return `path` relative to `root` with `/` separators.
fn archive_name(root: &Utf8Path, path: &Utf8Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|component| component.as_str())
        .collect::<Vec<_>>()
        .join("/")
}

/// Inputs to [`make_package`].
pub struct PackageRequest<'a> {
    /// Name of the release being packaged.
    pub name: &'a ReleaseName,
    /// Directory receiving the archive.
    pub archive_dir: &'a Utf8Path,
    /// Archive extension, without the leading dot.
    pub extension: &'a str,
    /// Title printed while packaging.
    pub title: &'a str,
    /// Root of the assembled release tree.
    pub release_root: &'a Utf8Path,
    /// Whether packaging was requested at all.
    pub requested: bool,
    /// Whether an existing archive may be replaced.
    pub overwrite: bool,
}

impl PackageRequest<'_> {
    /// Return the path the archive is written to.
    #[must_use]
    pub fn archive_path(&self) -> Utf8PathBuf {
        self.archive_dir
            .join(self.name.archive_filename(self.extension))
    }
}

/// Produce the release archive.
///
/// Returns the archive path, or `None` when packaging was not requested.
///
/// # Errors
///
/// Returns [`ReleaseError::PackageExists`] if the archive exists and
/// `overwrite` is false (the archive is left untouched),
/// [`ReleaseError::Filesystem`] if the old archive cannot be removed, or the
/// archiver's own error.
pub fn make_package(
    request: &PackageRequest<'_>,
    archiver: &dyn Archiver,
    out: &mut dyn Write,
) -> Result<Option<Utf8PathBuf>> {
    if !request.requested {
        write_line(out, "No package requested, skipping.");
        return Ok(None);
    }

    let archive_path = request.archive_path();

    if archive_path.exists() {
        if !request.overwrite {
            return Err(ReleaseError::PackageExists { path: archive_path });
        }
        write_warning_line(out, "Package already exists. Deleting.");
        match fs::remove_file(&archive_path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(ReleaseError::filesystem("remove", archive_path)(e)),
        }
    }

    write_line(out, format_args!("Making {} package...", request.title));
    debug!("archiving {} into {archive_path}", request.release_root);
    archiver.archive(request.release_root, &archive_path)?;
    Ok(Some(archive_path))
}

#[cfg(test)]
#[path = "packaging_tests.rs"]
mod tests;
