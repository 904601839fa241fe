//! Test support utilities for release packager behavioural tests.
//!
//! Lays out a miniature plugin checkout in a temporary directory:
//!
//! ```text
//! <root>/
//!   Tools/release.toml
//!   Source/AssemblyInfo.cs
//!   Source/bin/            (build output)
//!   LICENSE.md
//!   Parts/Light/part.cfg
//!   Plugin.version
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;

const RELEASE_CONFIG: &str = r#"
product = "Plugin"
title = "Test Plugin"
source_root = ".."
release_root = "../Release"
archive_dir = ".."
version_file = "../Source/AssemblyInfo.cs"
metadata_file = "../Plugin.version"
metadata_copy = "GameData/Plugin/Plugin.version"

[build]
command = "make_binary.cmd"
artifact = "Source/bin/Plugin.dll"

[archiver]
kind = "builtin"

[[structure]]
path = "/"

[[structure]]
path = "/GameData"

[[structure]]
path = "/GameData/Plugin"
files = ["/LICENSE.md", "/Source/bin/Plugin.dll"]

[[structure]]
path = "/GameData/Plugin/Parts"
tree = "/Parts"
"#;

/// A plugin checkout in a temporary directory.
pub struct Checkout {
    _dir: TempDir,
    /// Root of the checkout.
    pub root: Utf8PathBuf,
}

impl Checkout {
    /// Create a checkout whose version file contains `version_line`.
    pub fn new(version_line: &str) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("UTF-8 temp dir");
        let checkout = Self { _dir: dir, root };

        fs::create_dir_all(checkout.root.join("Source/bin")).expect("create bin dir");
        checkout.write(
            "Source/AssemblyInfo.cs",
            &format!("using System.Reflection;\n{version_line}\n"),
        );
        checkout.write("LICENSE.md", "license");
        checkout.write("Parts/Light/part.cfg", "PART {}");
        checkout.write(
            "Plugin.version",
            r#"{"NAME": "Plugin", "VERSION": {"MAJOR": 0, "MINOR": 0, "PATCH": 0, "BUILD": 0}}"#,
        );
        checkout.write("Tools/release.toml", RELEASE_CONFIG);
        checkout
    }

    /// Path to the release configuration.
    pub fn config_path(&self) -> Utf8PathBuf {
        self.root.join("Tools/release.toml")
    }

    /// Path to the release tree.
    pub fn release_root(&self) -> Utf8PathBuf {
        self.root.join("Release")
    }

    /// Write `contents` to `relative`, creating parent directories.
    pub fn write(&self, relative: impl AsRef<Utf8Path>, contents: &str) {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(path, contents).expect("write checkout file");
    }
}
