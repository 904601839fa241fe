//! Version stamping for the structured metadata file.
//!
//! The metadata file is a JSON document with a top-level `VERSION` object.
//! Stamping overwrites its `MAJOR`, `MINOR`, `PATCH` and `BUILD` members and
//! rewrites the file with sorted keys and four-space indentation, so stamping
//! the same version twice leaves the file byte-identical.

use crate::config::SyncTarget;
use crate::error::{ReleaseError, Result};
use crate::output::write_line;
use crate::version::Version;
use camino::Utf8Path;
use log::debug;
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::io::Write;

/// Key of the object holding the version components.
pub const VERSION_KEY: &str = "VERSION";

const INDENT: &[u8] = b"    ";

/// Stamp `version` into the metadata file at `path`, in place.
///
/// All keys other than the four version components are preserved.
///
/// # Errors
///
/// Returns [`ReleaseError::Filesystem`] if the file cannot be read or written,
/// or [`ReleaseError::MalformedMetadata`] if it is not JSON or lacks a
/// `VERSION` object.
pub fn stamp_version(path: &Utf8Path, version: Version, out: &mut dyn Write) -> Result<()> {
    write_line(out, format_args!("Update repository version file: {path}"));

    let contents = std::fs::read_to_string(path).map_err(ReleaseError::filesystem("read", path))?;
    let malformed = |reason: String| ReleaseError::MalformedMetadata {
        path: path.to_owned(),
        reason,
    };

    let mut document: Value = serde_json::from_str(&contents).map_err(|e| malformed(e.to_string()))?;
    let Some(fields) = document.get_mut(VERSION_KEY).and_then(Value::as_object_mut) else {
        return Err(malformed(format!("`{VERSION_KEY}` is missing or not an object")));
    };

    fields.insert("MAJOR".to_owned(), version.major.into());
    fields.insert("MINOR".to_owned(), version.minor.into());
    fields.insert("PATCH".to_owned(), version.patch.into());
    fields.insert("BUILD".to_owned(), version.build.into());

    let rendered = render(&document).map_err(|e| malformed(e.to_string()))?;
    std::fs::write(path, rendered).map_err(ReleaseError::filesystem("write", path))?;
    debug!("stamped {version} into {path}");
    Ok(())
}

/// Serialise `document` with sorted keys and four-space indentation.
fn render(document: &Value) -> serde_json::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(INDENT));
    document.serialize(&mut serializer)?;
    buffer.push(b'\n');
    Ok(buffer)
}

/// Copy the stamped metadata file into the release tree.
///
/// The destination's parent directory must already exist.
///
/// # Errors
///
/// Returns [`ReleaseError::Filesystem`] if the copy fails.
pub fn sync_metadata(
    target: &SyncTarget,
    release_root: &Utf8Path,
    out: &mut dyn Write,
) -> Result<()> {
    let dest = release_root.join(&target.destination);
    write_line(
        out,
        format_args!("Copy plugin version file \"{}\" into \"{dest}\"", target.source),
    );
    std::fs::copy(&target.source, &dest).map_err(ReleaseError::filesystem("copy", &target.source))?;
    Ok(())
}
