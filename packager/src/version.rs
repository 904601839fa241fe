//! Release version discovery.
//!
//! The release version is read from a line-oriented source file (by default a
//! C# `AssemblyInfo.cs`) by matching each non-comment line against a
//! [`VersionPattern`]. The resulting [`Version`] is an immutable record that is
//! handed to every later pipeline stage.

use crate::error::{ReleaseError, Result};
use crate::output::write_line;
use camino::Utf8Path;
use log::{debug, trace};
use regex::{Captures, Regex};
use std::fmt;
use std::io::Write;

/// Pattern matching `[assembly: AssemblyVersion("X.Y.Z")]` with an optional
/// fourth build number.
pub const DEFAULT_VERSION_PATTERN: &str = concat!(
    r#"^\s*\[assembly:\s*AssemblyVersion\w*\s*\(\s*""#,
    r"(?P<major>\d+)\.(?P<minor>\d+)\.(?P<patch>\d+)(?:\D(?P<build>\d+))?",
    r#""\s*\)\s*\]"#,
);

/// Named capture groups every version pattern must define.
const REQUIRED_GROUPS: [&str; 3] = ["major", "minor", "patch"];

/// A four-part release version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    /// Major version component.
    pub major: u32,
    /// Minor version component.
    pub minor: u32,
    /// Patch version component.
    pub patch: u32,
    /// Build number; zero when the source omits it.
    pub build: u32,
}

impl Version {
    /// Create a version from its four components.
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32, build: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            build,
        }
    }

    /// Return true when the build component is non-zero.
    #[must_use]
    pub const fn has_build(&self) -> bool {
        self.build != 0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "v{}.{}.{} build {}",
            self.major, self.minor, self.patch, self.build
        )
    }
}

/// A compiled version-declaration pattern.
///
/// The pattern must define the named groups `major`, `minor` and `patch`, and
/// may define `build`.
#[derive(Debug, Clone)]
pub struct VersionPattern {
    regex: Regex,
}

impl VersionPattern {
    /// Compile a version pattern.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if the expression does not compile
    /// or lacks one of the required named groups.
    ///
    /// # Examples
    ///
    /// ```
    /// use release_packager::version::{DEFAULT_VERSION_PATTERN, Version, VersionPattern};
    ///
    /// let pattern = VersionPattern::new(DEFAULT_VERSION_PATTERN).expect("valid pattern");
    /// let version = pattern
    ///     .parse_line(r#"[assembly: AssemblyVersion("2.3.1.7")]"#)
    ///     .expect("numbers fit");
    /// assert_eq!(version, Some(Version::new(2, 3, 1, 7)));
    /// ```
    pub fn new(pattern: &str) -> std::result::Result<Self, String> {
        let regex = Regex::new(pattern).map_err(|e| e.to_string())?;
        let names: Vec<&str> = regex.capture_names().flatten().collect();
        if let Some(missing) = REQUIRED_GROUPS.iter().find(|&&g| !names.contains(&g)) {
            return Err(format!("version pattern lacks named group `{missing}`"));
        }
        Ok(Self { regex })
    }

    /// Match a single line, returning the version it declares.
    ///
    /// Returns `Ok(None)` when the line does not match.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseError::InvalidVersionNumber`] if a captured number
    /// does not fit in a `u32`.
    pub fn parse_line(&self, line: &str) -> Result<Option<Version>> {
        let Some(caps) = self.regex.captures(line) else {
            return Ok(None);
        };

        let version = Version {
            major: component(&caps, "major", line)?,
            minor: component(&caps, "minor", line)?,
            patch: component(&caps, "patch", line)?,
            build: component(&caps, "build", line)?,
        };
        Ok(Some(version))
    }
}

/// Parse a named group, treating an absent group as zero.
fn component(caps: &Captures<'_>, name: &str, line: &str) -> Result<u32> {
    caps.name(name).map_or(Ok(0), |m| {
        m.as_str()
            .parse()
            .map_err(|e| ReleaseError::InvalidVersionNumber {
                line: line.to_owned(),
                reason: format!("{name}: {e}"),
            })
    })
}

/// Return true for lines that are `//` comments.
#[must_use]
pub fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with("//")
}

/// Extract the release version from `path`.
///
/// Lines are scanned top to bottom, skipping comments; the first match wins.
/// The matched line and the resolved version are written to `out`.
///
/// # Errors
///
/// Returns [`ReleaseError::Filesystem`] if the file cannot be read,
/// [`ReleaseError::VersionNotFound`] if no line matches, or
/// [`ReleaseError::InvalidVersionNumber`] if the match is out of range.
pub fn extract_version(
    path: &Utf8Path,
    pattern: &VersionPattern,
    out: &mut dyn Write,
) -> Result<Version> {
    let contents = std::fs::read_to_string(path).map_err(ReleaseError::filesystem("read", path))?;

    for line in contents.lines() {
        if is_comment(line) {
            trace!("skipping comment line: {line}");
            continue;
        }
        debug!("scanning version line: {line}");

        if let Some(version) = pattern.parse_line(line)? {
            write_line(out, line.trim());
            write_line(out, format_args!("Releasing version: {version}"));
            return Ok(version);
        }
    }

    Err(ReleaseError::VersionNotFound {
        path: path.to_owned(),
    })
}
