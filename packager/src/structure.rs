//! Release tree layout.
//!
//! A release structure is an explicit, ordered list of [`StructureEntry`]
//! values. Each entry names a directory relative to the release root and a
//! [`CopySpec`] describing how it is populated. Directories are created one
//! level at a time, so every entry's parent must be declared by an earlier
//! entry; [`validate_structure`] checks this before anything touches disk.

use crate::error::{ReleaseError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashSet;
use std::fmt;

/// Suffix marking a file source as "every file in this directory".
pub const ALL_FILES_SUFFIX: &str = "/*";

/// A single source in a [`CopySpec::CopyFiles`] list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// Copy one file, keeping its name.
    Exact(Utf8PathBuf),
    /// Copy every regular file directly inside the directory.
    AllFilesIn(Utf8PathBuf),
}

impl FileSource {
    /// Parse a configured source path.
    ///
    /// Paths ending in `/*` select every file in the directory; anything else
    /// names a single file. A leading `/` is ignored because sources are
    /// always relative to the source root.
    ///
    /// # Examples
    ///
    /// ```
    /// use release_packager::structure::FileSource;
    ///
    /// assert_eq!(
    ///     FileSource::parse("/Binaries/*"),
    ///     FileSource::AllFilesIn("Binaries".into())
    /// );
    /// assert_eq!(
    ///     FileSource::parse("LICENSE.md"),
    ///     FileSource::Exact("LICENSE.md".into())
    /// );
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let relative = relative_path(raw);
        match relative.as_str().strip_suffix(ALL_FILES_SUFFIX) {
            Some(dir) => Self::AllFilesIn(Utf8PathBuf::from(dir)),
            None if relative.as_str() == "*" => Self::AllFilesIn(Utf8PathBuf::new()),
            None => Self::Exact(relative),
        }
    }

    /// Return the configured path, relative to the source root.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        match self {
            Self::Exact(path) | Self::AllFilesIn(path) => path,
        }
    }
}

impl fmt::Display for FileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(path) => write!(f, "{path}"),
            Self::AllFilesIn(path) if path.as_str().is_empty() => f.write_str("*"),
            Self::AllFilesIn(path) => write!(f, "{path}{ALL_FILES_SUFFIX}"),
        }
    }
}

/// How a release directory is populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopySpec {
    /// Create the directory and leave it empty (unless later entries fill it).
    EnsureDir,
    /// Create the directory and copy the listed sources into it.
    CopyFiles(Vec<FileSource>),
    /// Copy a whole source directory tree to this location.
    CopyTree(Utf8PathBuf),
}

/// One directory of the release tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureEntry {
    path: Utf8PathBuf,
    spec: CopySpec,
}

impl StructureEntry {
    /// Create an entry for `path`, relative to the release root.
    ///
    /// An empty path (or `/`) denotes the release root itself.
    #[must_use]
    pub fn new(path: &str, spec: CopySpec) -> Self {
        Self {
            path: relative_path(path),
            spec,
        }
    }

    /// Return the entry path relative to the release root.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Return how the directory is populated.
    #[must_use]
    pub const fn spec(&self) -> &CopySpec {
        &self.spec
    }

    /// Return true when the entry denotes the release root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.path.as_str().is_empty()
    }

    /// Return the absolute destination under `release_root`.
    #[must_use]
    pub fn destination(&self, release_root: &Utf8Path) -> Utf8PathBuf {
        if self.is_root() {
            release_root.to_owned()
        } else {
            release_root.join(&self.path)
        }
    }
}

impl fmt::Display for StructureEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("/")?;
        f.write_str(self.path.as_str())?;
        match &self.spec {
            CopySpec::EnsureDir => Ok(()),
            CopySpec::CopyFiles(sources) => {
                let names: Vec<String> = sources.iter().map(ToString::to_string).collect();
                write!(f, " <- [{}]", names.join(", "))
            }
            CopySpec::CopyTree(source) => write!(f, " <- tree {source}"),
        }
    }
}

/// Check that entries can be created in their declared order.
///
/// # Errors
///
/// Returns [`ReleaseError::InvalidStructure`] if the list is empty, if an
/// entry is declared twice, or if an entry appears before its parent.
pub fn validate_structure(entries: &[StructureEntry]) -> Result<()> {
    if entries.is_empty() {
        return Err(ReleaseError::InvalidStructure {
            reason: "no structure entries declared".to_owned(),
        });
    }

    let mut declared: HashSet<&Utf8Path> = HashSet::with_capacity(entries.len());
    for entry in entries {
        if let Some(parent) = entry.path.parent().filter(|p| !declared.contains(p)) {
            return Err(ReleaseError::InvalidStructure {
                reason: format!("/{} is declared before its parent /{parent}", entry.path),
            });
        }

        if !declared.insert(&entry.path) {
            return Err(ReleaseError::InvalidStructure {
                reason: format!("/{} is declared more than once", entry.path),
            });
        }
    }

    Ok(())
}

/// Normalise a configured path to a relative one.
fn relative_path(raw: &str) -> Utf8PathBuf {
    Utf8PathBuf::from(raw.trim().trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ensure(path: &str) -> StructureEntry {
        StructureEntry::new(path, CopySpec::EnsureDir)
    }

    #[rstest]
    #[case::exact("/LICENSE.md", FileSource::Exact("LICENSE.md".into()))]
    #[case::nested("Source/bin/Release/Plugin.dll", FileSource::Exact("Source/bin/Release/Plugin.dll".into()))]
    #[case::all_files("/Binaries/*", FileSource::AllFilesIn("Binaries".into()))]
    #[case::root_files("/*", FileSource::AllFilesIn(Utf8PathBuf::new()))]
    fn file_sources_parse_wildcard_suffix(#[case] raw: &str, #[case] expected: FileSource) {
        assert_eq!(FileSource::parse(raw), expected);
    }

    #[test]
    fn root_entry_is_recognised() {
        assert!(ensure("/").is_root());
        assert!(ensure("").is_root());
        assert!(!ensure("/GameData").is_root());
    }

    #[test]
    fn destination_joins_release_root() {
        let root = Utf8Path::new("/work/Release");
        assert_eq!(ensure("/").destination(root), Utf8PathBuf::from("/work/Release"));
        assert_eq!(
            ensure("/GameData/Plugin").destination(root),
            Utf8PathBuf::from("/work/Release/GameData/Plugin")
        );
    }

    #[test]
    fn parents_before_children_is_valid() {
        let entries = vec![
            ensure("/"),
            ensure("/GameData"),
            StructureEntry::new(
                "/GameData/Plugin",
                CopySpec::CopyFiles(vec![FileSource::parse("/LICENSE.md")]),
            ),
            StructureEntry::new("/GameData/Plugin/Parts", CopySpec::CopyTree("Parts".into())),
        ];
        assert!(validate_structure(&entries).is_ok());
    }

    #[test]
    fn entries_inside_copied_trees_are_valid() {
        let entries = vec![
            ensure("/"),
            StructureEntry::new("/Parts", CopySpec::CopyTree("Parts".into())),
            ensure("/Parts/Extra"),
        ];
        assert!(validate_structure(&entries).is_ok());
    }

    #[rstest]
    #[case::child_first(vec![ensure("/"), ensure("/GameData/Plugin"), ensure("/GameData")], "before its parent")]
    #[case::missing_root(vec![ensure("/GameData")], "before its parent")]
    #[case::duplicate(vec![ensure("/"), ensure("/GameData"), ensure("/GameData/")], "more than once")]
    #[case::empty(Vec::new(), "no structure entries")]
    fn invalid_orders_are_rejected(#[case] entries: Vec<StructureEntry>, #[case] needle: &str) {
        let err = validate_structure(&entries).expect_err("structure should be rejected");
        assert!(
            err.to_string().contains(needle),
            "unexpected error message: {err}"
        );
    }

    #[test]
    fn display_describes_copy_spec() {
        let entry = StructureEntry::new(
            "/GameData/Plugin",
            CopySpec::CopyFiles(vec![
                FileSource::parse("/LICENSE.md"),
                FileSource::parse("/Binaries/*"),
            ]),
        );
        assert_eq!(
            entry.to_string(),
            "/GameData/Plugin <- [LICENSE.md, Binaries/*]"
        );
    }
}
