//! On-disk project fixtures shared by unit tests.

use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Write `content` as the manifest of `relative_dir` under `root`
pub(crate) fn write_package(root: &Path, relative_dir: &str, content: &str) {
    let dir = root.join(relative_dir);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("package.json"), content).unwrap();
}

fn workspace_manifest(name: &str, group: &str) -> String {
    format!(
        r#"{{
  "name": "{name}",
  "scripts": {{
    "all-workspaces": "echo 'script for all workspaces'",
    "{group}-workspaces": "echo 'script for {group} workspaces'",
    "{name}": "echo 'script for {name}'"
  }}
}}"#
    )
}

/// Two applications and three libraries, one of them nested a level deeper.
pub(crate) fn create_full_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    write_package(
        root,
        "",
        r#"{
  "name": "test-root",
  "workspaces": ["applications/*", "libraries/**/*"]
}"#,
    );
    write_package(
        root,
        "applications/applicationA",
        &workspace_manifest("application-a", "a"),
    );
    write_package(
        root,
        "applications/applicationB",
        &workspace_manifest("application-b", "b"),
    );
    write_package(root, "libraries/libraryA", &workspace_manifest("library-a", "a"));
    write_package(root, "libraries/libraryB", &workspace_manifest("library-b", "b"));
    write_package(
        root,
        "libraries/nested/libraryC",
        &workspace_manifest("library-c", "c"),
    );

    temp
}
