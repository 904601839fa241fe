//! Release configuration loader.
//!
//! A release is described by a TOML file (by default `release.toml`) kept
//! next to the release tooling. Relative paths in the file resolve against
//! the directory that contains it, and structure sources resolve against the
//! configured source root. Loading validates the structure ordering and the
//! version pattern so that a bad configuration fails before any stage runs.

use crate::error::{ReleaseError, Result};
use crate::naming::DEFAULT_ARCHIVE_EXTENSION;
use crate::structure::{CopySpec, FileSource, StructureEntry, validate_structure};
use crate::version::{DEFAULT_VERSION_PATTERN, VersionPattern};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use serde::Deserialize;

/// Configuration file read when none is given on the command line.
pub const DEFAULT_CONFIG_FILE: &str = "release.toml";

/// Archiver program used when the configuration does not name one.
pub const DEFAULT_ARCHIVER_PROGRAM: &str = "7z";

/// Which archiver produces the release package.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ArchiverConfig {
    /// Run an external program as `<program> a <archive> <release_root>/*`.
    External {
        /// Program name or path.
        #[serde(default = "default_archiver_program")]
        program: String,
    },
    /// Write a zip archive in-process.
    Builtin,
}

impl Default for ArchiverConfig {
    fn default() -> Self {
        Self::External {
            program: default_archiver_program(),
        }
    }
}

fn default_archiver_program() -> String {
    DEFAULT_ARCHIVER_PROGRAM.to_owned()
}

fn default_archive_extension() -> String {
    DEFAULT_ARCHIVE_EXTENSION.to_owned()
}

/// The build step that produces the plugin binary.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BuildSpec {
    /// Command run without arguments from the configuration directory.
    pub command: String,
    /// Artifact whose presence confirms the build, if any.
    pub artifact: Option<Utf8PathBuf>,
}

/// One-way copy of the stamped metadata file into the release tree.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SyncTarget {
    /// The metadata file in the source tree.
    pub source: Utf8PathBuf,
    /// Destination path relative to the release root.
    pub destination: Utf8PathBuf,
}

/// Fully resolved release configuration.
#[derive(Clone, Debug)]
pub struct ReleaseConfig {
    /// Product name used as the release name prefix.
    pub product: String,
    /// Human-readable package title, printed when packaging.
    pub title: Option<String>,
    /// Directory containing the configuration; commands run here.
    pub base_dir: Utf8PathBuf,
    /// Root of the source checkout.
    pub source_root: Utf8PathBuf,
    /// Release tree root, recreated on every run.
    pub release_root: Utf8PathBuf,
    /// Directory receiving release archives.
    pub archive_dir: Utf8PathBuf,
    /// Archive file extension, without the leading dot.
    pub archive_extension: String,
    /// File the release version is extracted from.
    pub version_file: Utf8PathBuf,
    /// Pattern matching the version declaration.
    pub version_pattern: VersionPattern,
    /// The build step.
    pub build: BuildSpec,
    /// The archiver used when packaging.
    pub archiver: ArchiverConfig,
    /// Ordered release tree layout; sources are relative to `source_root`.
    pub structure: Vec<StructureEntry>,
    /// Metadata file stamped with the version and copied into the release.
    pub metadata: SyncTarget,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    product: String,
    title: Option<String>,
    source_root: Utf8PathBuf,
    release_root: Utf8PathBuf,
    archive_dir: Utf8PathBuf,
    #[serde(default = "default_archive_extension")]
    archive_extension: String,
    version_file: Utf8PathBuf,
    version_pattern: Option<String>,
    metadata_file: Utf8PathBuf,
    metadata_copy: Utf8PathBuf,
    build: RawBuild,
    #[serde(default)]
    archiver: ArchiverConfig,
    structure: Vec<RawEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBuild {
    command: String,
    artifact: Option<Utf8PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEntry {
    path: String,
    files: Option<Vec<String>>,
    tree: Option<String>,
}

impl RawEntry {
    fn into_entry(self) -> std::result::Result<StructureEntry, String> {
        let spec = match (self.files, self.tree) {
            (Some(_), Some(_)) => {
                return Err(format!(
                    "structure entry {:?} declares both `files` and `tree`",
                    self.path
                ));
            }
            (None, Some(tree)) => CopySpec::CopyTree(FileSource::parse(&tree).path().to_owned()),
            (Some(files), None) if !files.is_empty() => {
                CopySpec::CopyFiles(files.iter().map(|f| FileSource::parse(f)).collect())
            }
            (Some(_) | None, None) => CopySpec::EnsureDir,
        };
        Ok(StructureEntry::new(&self.path, spec))
    }
}

impl ReleaseConfig {
    /// Load and resolve the configuration file at `path`.
    ///
    /// Paths are resolved against the absolute directory containing the
    /// file, so the external build and archiver see the same locations
    /// whatever directory they run in.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseError::Config`] if the file cannot be read or parsed,
    /// or [`ReleaseError::InvalidStructure`] if the structure cannot be
    /// assembled in its declared order.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ReleaseError::Config {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
        let base_dir = absolute_base_dir(path)?;
        debug!("loaded release configuration from {path} (base {base_dir})");
        Self::from_toml(&contents, &base_dir, path)
    }

    /// Parse configuration text, resolving relative paths against `base_dir`.
    ///
    /// `origin` names the configuration in error messages.
    ///
    /// # Errors
    ///
    /// See [`ReleaseConfig::load`].
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use release_packager::config::ReleaseConfig;
    ///
    /// let text = r#"
    ///     product = "SurfaceLights"
    ///     source_root = ".."
    ///     release_root = "../Release"
    ///     archive_dir = ".."
    ///     version_file = "../Source/Properties/AssemblyInfo.cs"
    ///     metadata_file = "../SurfaceLights.version"
    ///     metadata_copy = "GameData/SurfaceLights/SurfaceLights.version"
    ///
    ///     [build]
    ///     command = "make_binary.cmd"
    ///
    ///     [[structure]]
    ///     path = "/"
    ///     [[structure]]
    ///     path = "/GameData"
    ///     [[structure]]
    ///     path = "/GameData/SurfaceLights"
    ///     files = ["/LICENSE.md"]
    /// "#;
    /// let config = ReleaseConfig::from_toml(text, Utf8Path::new("Tools"), Utf8Path::new("release.toml"))
    ///     .expect("valid configuration");
    /// assert_eq!(config.release_root, Utf8Path::new("Tools/../Release"));
    /// assert_eq!(config.structure.len(), 3);
    /// ```
    pub fn from_toml(contents: &str, base_dir: &Utf8Path, origin: &Utf8Path) -> Result<Self> {
        let config_error = |reason: String| ReleaseError::Config {
            path: origin.to_owned(),
            reason,
        };

        let raw: RawConfig = toml::from_str(contents).map_err(|e| config_error(e.to_string()))?;

        let version_pattern = VersionPattern::new(
            raw.version_pattern
                .as_deref()
                .unwrap_or(DEFAULT_VERSION_PATTERN),
        )
        .map_err(config_error)?;

        let structure = raw
            .structure
            .into_iter()
            .map(RawEntry::into_entry)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(config_error)?;
        validate_structure(&structure)?;

        let source_root = base_dir.join(&raw.source_root);
        let build = BuildSpec {
            command: raw.build.command,
            artifact: raw.build.artifact.map(|a| source_root.join(a)),
        };

        Ok(Self {
            product: raw.product,
            title: raw.title,
            release_root: base_dir.join(&raw.release_root),
            archive_dir: base_dir.join(&raw.archive_dir),
            archive_extension: raw.archive_extension,
            version_file: base_dir.join(&raw.version_file),
            version_pattern,
            build,
            archiver: raw.archiver,
            structure,
            metadata: SyncTarget {
                source: base_dir.join(&raw.metadata_file),
                destination: Utf8PathBuf::from(raw.metadata_copy.as_str().trim_start_matches('/')),
            },
            source_root,
            base_dir: base_dir.to_owned(),
        })
    }

    /// Return the title shown when packaging, falling back to the product.
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.product)
    }
}

/// Return the directory containing `config_path`, made absolute against the
/// process working directory.
fn absolute_base_dir(config_path: &Utf8Path) -> Result<Utf8PathBuf> {
    let parent = config_path
        .parent()
        .filter(|parent| !parent.as_str().is_empty());
    if let Some(parent) = parent.filter(|parent| parent.is_absolute()) {
        return Ok(parent.to_owned());
    }

    let config_error = |reason: String| ReleaseError::Config {
        path: config_path.to_owned(),
        reason,
    };
    let cwd = std::env::current_dir()
        .map_err(|e| config_error(format!("cannot resolve the working directory: {e}")))?;
    let cwd = Utf8PathBuf::try_from(cwd)
        .map_err(|e| config_error(format!("working directory is not UTF-8: {e}")))?;
    Ok(match parent {
        Some(parent) => cwd.join(parent),
        None => cwd,
    })
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
