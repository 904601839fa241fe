//! Release naming policy.
//!
//! Constructs deterministic release names of the form
//! `<product>_v<major>.<minor>.<patch>` with a `_build<build>` suffix when the
//! build component is non-zero, and the archive filename derived from them.

use crate::version::Version;
use std::fmt;

/// The default archive file extension, without the leading dot.
pub const DEFAULT_ARCHIVE_EXTENSION: &str = "zip";

/// A release name for a product at a specific version.
///
/// # Examples
///
/// ```
/// use release_packager::naming::ReleaseName;
/// use release_packager::version::Version;
///
/// let name = ReleaseName::new("Product", Version::new(1, 4, 0, 0));
/// assert_eq!(name.to_string(), "Product_v1.4.0");
///
/// let name = ReleaseName::new("Product", Version::new(1, 4, 0, 3));
/// assert_eq!(name.to_string(), "Product_v1.4.0_build3");
/// assert_eq!(name.archive_filename("zip"), "Product_v1.4.0_build3.zip");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseName {
    product: String,
    version: Version,
}

impl ReleaseName {
    /// Create a release name from a product name and version.
    #[must_use]
    pub fn new(product: impl Into<String>, version: Version) -> Self {
        Self {
            product: product.into(),
            version,
        }
    }

    /// Return the archive filename using `extension` (without leading dot).
    #[must_use]
    pub fn archive_filename(&self, extension: &str) -> String {
        format!("{self}.{}", extension.trim_start_matches('.'))
    }
}

impl fmt::Display for ReleaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Version {
            major,
            minor,
            patch,
            build,
        } = self.version;
        write!(f, "{}_v{major}.{minor}.{patch}", self.product)?;
        if self.version.has_build() {
            write!(f, "_build{build}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::no_build(Version::new(1, 4, 0, 0), "Product_v1.4.0")]
    #[case::with_build(Version::new(1, 4, 0, 3), "Product_v1.4.0_build3")]
    #[case::multi_digit(Version::new(12, 0, 105, 42), "Product_v12.0.105_build42")]
    fn display_follows_release_naming(#[case] version: Version, #[case] expected: &str) {
        assert_eq!(ReleaseName::new("Product", version).to_string(), expected);
    }

    #[rstest]
    #[case::bare("zip")]
    #[case::dotted(".zip")]
    fn archive_filename_appends_single_extension(#[case] extension: &str) {
        let name = ReleaseName::new("SurfaceLights", Version::new(2, 3, 1, 0));
        assert_eq!(name.archive_filename(extension), "SurfaceLights_v2.3.1.zip");
    }
}
