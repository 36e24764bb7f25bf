//! Workspace and manifest entities.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File name of every manifest, root or workspace
pub const MANIFEST_FILE: &str = "package.json";

/// A resolved `package.json`.
///
/// Only `name`, `workspaces` and `scripts` are typed; any other top-level
/// field is carried in `extra` and written back out unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Manifest {
    pub name: String,
    pub workspaces: Vec<String>,
    pub scripts: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Manifest {
    /// Look up a script that is declared with a non-empty command
    pub fn script(&self, name: &str) -> Option<&str> {
        self.scripts
            .get(name)
            .map(String::as_str)
            .filter(|command| !command.is_empty())
    }

    /// Whether a non-empty script with this name is declared
    pub fn has_script(&self, name: &str) -> bool {
        self.script(name).is_some()
    }

    /// Script names in ascending order
    pub fn script_names(&self) -> Vec<&str> {
        self.scripts.keys().map(String::as_str).collect()
    }
}

/// A discovered sub-package of the project
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    /// Name from the workspace's manifest
    pub name: String,
    /// Location relative to the project root, `/`-separated
    pub path: String,
    /// The root `workspaces` glob that matched this workspace
    pub match_pattern: String,
    /// The workspace's resolved manifest
    pub manifest: Manifest,
}

impl Workspace {
    /// Absolute directory of this workspace under the given root
    pub fn directory(&self, root_dir: &Path) -> PathBuf {
        if self.path.is_empty() {
            root_dir.to_path_buf()
        } else {
            root_dir.join(&self.path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest() -> Manifest {
        let mut scripts = BTreeMap::new();
        scripts.insert("build".to_string(), "tsc".to_string());
        scripts.insert("empty".to_string(), String::new());
        Manifest {
            name: "library-a".to_string(),
            scripts,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_script_is_not_declared() {
        let manifest = manifest();
        assert_eq!(manifest.script("build"), Some("tsc"));
        assert!(!manifest.has_script("empty"));
        assert!(!manifest.has_script("missing"));
        assert_eq!(manifest.script_names(), vec!["build", "empty"]);
    }

    #[test]
    fn test_workspace_serializes_extra_fields() {
        let mut manifest = manifest();
        manifest
            .extra
            .insert("version".to_string(), Value::String("1.0.0".to_string()));
        let workspace = Workspace {
            name: "library-a".to_string(),
            path: "libraries/libraryA".to_string(),
            match_pattern: "libraries/*".to_string(),
            manifest,
        };

        let json = serde_json::to_value(&workspace).unwrap();
        assert_eq!(json["matchPattern"], "libraries/*");
        assert_eq!(json["manifest"]["version"], "1.0.0");
        assert_eq!(json["manifest"]["scripts"]["build"], "tsc");
    }

    #[test]
    fn test_directory() {
        let workspace = Workspace {
            name: "root".to_string(),
            path: String::new(),
            match_pattern: ".".to_string(),
            manifest: Manifest::default(),
        };
        assert_eq!(workspace.directory(Path::new("/repo")), PathBuf::from("/repo"));
    }
}
