//! Unit tests for release tree assembly.

use super::*;
use rstest::{fixture, rstest};
use tempfile::TempDir;

struct Sandbox {
    _dir: TempDir,
    source: Utf8PathBuf,
    release: Utf8PathBuf,
}

impl Sandbox {
    fn write(&self, relative: &str, contents: &str) {
        let path = self.source.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create source dir");
        }
        fs::write(path, contents).expect("write source file");
    }
}

#[fixture]
fn sandbox() -> Sandbox {
    let dir = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("UTF-8 temp dir");
    let source = root.join("src");
    fs::create_dir(&source).expect("create source root");
    Sandbox {
        _dir: dir,
        source,
        release: root.join("Release"),
    }
}

fn files(sources: &[&str]) -> CopySpec {
    CopySpec::CopyFiles(sources.iter().map(|s| FileSource::parse(s)).collect())
}

#[rstest]
fn assembles_declared_layout(sandbox: Sandbox) {
    sandbox.write("LICENSE.md", "license");
    sandbox.write("README.md", "readme");
    sandbox.write("Parts/Light/part.cfg", "PART {}");
    sandbox.write("Parts/Light/model.mu", "model");
    let entries = vec![
        StructureEntry::new("/", CopySpec::EnsureDir),
        StructureEntry::new("/GameData", CopySpec::EnsureDir),
        StructureEntry::new("/GameData/Plugin", files(&["/LICENSE.md", "/README.md"])),
        StructureEntry::new("/GameData/Plugin/Parts", CopySpec::CopyTree("Parts".into())),
    ];
    let mut out = Vec::new();

    let report =
        assemble(&entries, &sandbox.source, &sandbox.release, &mut out).expect("assembly succeeds");

    let plugin = sandbox.release.join("GameData/Plugin");
    assert!(plugin.join("LICENSE.md").is_file());
    assert!(plugin.join("README.md").is_file());
    assert_eq!(
        fs::read_to_string(plugin.join("Parts/Light/part.cfg")).expect("copied part"),
        "PART {}"
    );
    assert!(report.directories.contains(&plugin.join("Parts/Light")));
    assert_eq!(report.files.len(), 4);

    let text = String::from_utf8(out).expect("UTF-8 output");
    assert!(text.contains("Making folder"));
    assert!(text.contains("Copying folder"));
}

#[rstest]
fn all_files_skips_subdirectories_and_cvs(sandbox: Sandbox) {
    sandbox.write("Binaries/MiniAVC.dll", "avc");
    sandbox.write("Binaries/Plugin.xml", "<doc/>");
    sandbox.write("Binaries/CVS", "sentinel");
    sandbox.write("Binaries/nested/skip.txt", "nested");
    let entries = vec![
        StructureEntry::new("/", CopySpec::EnsureDir),
        StructureEntry::new("/Plugins", files(&["/Binaries/*"])),
    ];

    let report = assemble(&entries, &sandbox.source, &sandbox.release, &mut Vec::new())
        .expect("assembly succeeds");

    let plugins = sandbox.release.join("Plugins");
    assert_eq!(
        report.files,
        vec![plugins.join("MiniAVC.dll"), plugins.join("Plugin.xml")]
    );
    assert!(!plugins.join("CVS").exists());
    assert!(!plugins.join("nested").exists());
}

#[rstest]
fn tree_copy_creates_parents_before_children(sandbox: Sandbox) {
    sandbox.write("Parts/Light/part.cfg", "PART {}");
    sandbox.write("Parts/Light/Textures/glow.dds", "dds");
    sandbox.write("Parts/README.txt", "readme");
    let entries = vec![
        StructureEntry::new("/", CopySpec::EnsureDir),
        StructureEntry::new("/Parts", CopySpec::CopyTree("Parts".into())),
    ];

    let report = assemble(&entries, &sandbox.source, &sandbox.release, &mut Vec::new())
        .expect("assembly succeeds");

    let parts = sandbox.release.join("Parts");
    assert_eq!(
        report.directories,
        vec![
            sandbox.release.clone(),
            parts.clone(),
            parts.join("Light"),
            parts.join("Light/Textures"),
        ]
    );
    assert_eq!(
        report.files,
        vec![
            parts.join("Light/Textures/glow.dds"),
            parts.join("Light/part.cfg"),
            parts.join("README.txt"),
        ]
    );
}

#[rstest]
fn missing_exact_source_names_the_file(sandbox: Sandbox) {
    let entries = vec![
        StructureEntry::new("/", CopySpec::EnsureDir),
        StructureEntry::new("/Plugins", files(&["/Missing.dll"])),
    ];

    let err = assemble(&entries, &sandbox.source, &sandbox.release, &mut Vec::new())
        .expect_err("missing source");

    match err {
        ReleaseError::Filesystem { operation, path, .. } => {
            assert_eq!(operation, "copy");
            assert_eq!(path, sandbox.source.join("Missing.dll"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[rstest]
fn tree_copy_refuses_existing_destination(sandbox: Sandbox) {
    sandbox.write("Parts/part.cfg", "PART {}");
    let entries = vec![
        StructureEntry::new("/", CopySpec::EnsureDir),
        StructureEntry::new("/Parts", CopySpec::EnsureDir),
        StructureEntry::new("/Parts", CopySpec::CopyTree("Parts".into())),
    ];

    let err = assemble(&entries, &sandbox.source, &sandbox.release, &mut Vec::new())
        .expect_err("destination exists");

    assert!(matches!(err, ReleaseError::DestinationExists { .. }));
}

#[rstest]
fn missing_tree_source_is_a_filesystem_error(sandbox: Sandbox) {
    let entries = vec![
        StructureEntry::new("/", CopySpec::EnsureDir),
        StructureEntry::new("/Parts", CopySpec::CopyTree("Parts".into())),
    ];

    let err = assemble(&entries, &sandbox.source, &sandbox.release, &mut Vec::new())
        .expect_err("missing tree");

    assert!(matches!(
        err,
        ReleaseError::Filesystem { operation: "copy directory", .. }
    ));
}

#[rstest]
fn cleanup_removes_previous_tree(sandbox: Sandbox) {
    fs::create_dir_all(sandbox.release.join("GameData/Old")).expect("create stale tree");
    fs::write(sandbox.release.join("GameData/Old/stale.txt"), "stale").expect("write stale file");
    let mut out = Vec::new();

    clean_release_root(&sandbox.release, &mut out).expect("cleanup succeeds");

    assert!(!sandbox.release.exists());
    assert_eq!(
        String::from_utf8(out).expect("UTF-8 output"),
        "Cleanup release folder...\n"
    );
}

#[rstest]
fn cleanup_ignores_missing_tree(sandbox: Sandbox) {
    clean_release_root(&sandbox.release, &mut Vec::new()).expect("nothing to remove");
}
