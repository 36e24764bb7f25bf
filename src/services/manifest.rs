//! Manifest resolution and validation.
//!
//! A manifest is only validated for the fields the caller asks for. Fields
//! that were not requested fall back to empty defaults when they have an
//! unexpected type, and unknown fields are kept verbatim.

use crate::domain::{pattern, Manifest};
use crate::error::{WorkspaceError, WorkspaceResult};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// A manifest field that can be validated on request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestField {
    Name,
    Workspaces,
    Scripts,
}

const KNOWN_FIELDS: [&str; 3] = ["name", "workspaces", "scripts"];

/// Read the manifest at `path`, validating the `required` fields.
///
/// Workspace patterns are checked against `root_dir`.
pub fn resolve_manifest(
    path: &Path,
    root_dir: &Path,
    required: &[ManifestField],
) -> WorkspaceResult<Manifest> {
    let content = fs::read_to_string(path).map_err(|e| {
        WorkspaceError::InvalidPackageJson(format!(
            "Failed to read and parse package.json at {}: {}",
            path.display(),
            e
        ))
    })?;

    let json: Value = serde_json::from_str(&content).map_err(|e| {
        WorkspaceError::InvalidPackageJson(format!(
            "Failed to read and parse package.json at {}: {}",
            path.display(),
            e
        ))
    })?;

    let object = match json {
        Value::Object(object) => object,
        other => {
            return Err(WorkspaceError::InvalidPackageJson(format!(
                "Expected package.json to be an object, got {}",
                type_name(&other)
            )))
        }
    };

    resolve_object(object, root_dir, required)
}

fn resolve_object(
    mut object: Map<String, Value>,
    root_dir: &Path,
    required: &[ManifestField],
) -> WorkspaceResult<Manifest> {
    let name = if required.contains(&ManifestField::Name) {
        validate_name(object.get("name"))?
    } else {
        object
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let workspaces = if required.contains(&ManifestField::Workspaces) {
        validate_workspace_patterns(object.get("workspaces"), root_dir)?
    } else {
        object
            .get("workspaces")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    };

    let scripts = if required.contains(&ManifestField::Scripts) {
        validate_scripts(object.get("scripts"), &name)?
    } else {
        object
            .get("scripts")
            .and_then(Value::as_object)
            .map(|scripts| {
                scripts
                    .iter()
                    .filter_map(|(key, value)| Some((key.clone(), value.as_str()?.to_string())))
                    .collect()
            })
            .unwrap_or_default()
    };

    for field in KNOWN_FIELDS {
        object.remove(field);
    }

    Ok(Manifest {
        name,
        workspaces,
        scripts,
        extra: object,
    })
}

fn validate_name(value: Option<&Value>) -> WorkspaceResult<String> {
    let name = match value {
        Some(Value::String(name)) => name,
        Some(other) => {
            return Err(WorkspaceError::NoWorkspaceName(format!(
                "Expected package.json to have a string \"name\" field (Received {})",
                other
            )))
        }
        None => {
            return Err(WorkspaceError::NoWorkspaceName(
                "Expected package.json to have a string \"name\" field".to_string(),
            ))
        }
    };

    if name.trim().is_empty() {
        return Err(WorkspaceError::NoWorkspaceName(
            "Expected package.json to have a non-empty \"name\" field".to_string(),
        ));
    }

    if pattern::has_wildcard(name) {
        return Err(WorkspaceError::InvalidWorkspaceName(format!(
            "Package name cannot contain the character '{}' (workspace: \"{}\")",
            pattern::WILDCARD,
            name
        )));
    }

    Ok(name.clone())
}

fn validate_workspace_patterns(
    value: Option<&Value>,
    root_dir: &Path,
) -> WorkspaceResult<Vec<String>> {
    let entries = match value {
        Some(value) if is_truthy(value) => value.as_array().ok_or_else(|| {
            WorkspaceError::InvalidWorkspaces(
                "Expected package.json to have an array \"workspaces\" field".to_string(),
            )
        })?,
        _ => return Ok(Vec::new()),
    };

    let root = normalize_path(root_dir);
    let mut patterns = Vec::with_capacity(entries.len());

    for entry in entries {
        let pattern = entry.as_str().ok_or_else(|| {
            WorkspaceError::InvalidWorkspacePattern(format!(
                "Expected workspace pattern to be a string, got {}",
                type_name(entry)
            ))
        })?;

        if pattern.trim().is_empty() {
            continue;
        }

        let resolved = normalize_path(&root.join(pattern));
        if !resolved.starts_with(&root) {
            return Err(WorkspaceError::InvalidWorkspacePattern(format!(
                "Cannot resolve workspace pattern outside of root directory {}: {}",
                root.display(),
                resolved.display()
            )));
        }

        patterns.push(pattern.to_string());
    }

    Ok(patterns)
}

fn validate_scripts(
    value: Option<&Value>,
    workspace_name: &str,
) -> WorkspaceResult<BTreeMap<String, String>> {
    let scripts = match value {
        Some(value) if is_truthy(value) => value.as_object().ok_or_else(|| {
            WorkspaceError::InvalidScripts(
                "Expected package.json to have an object \"scripts\" field".to_string(),
            )
        })?,
        _ => return Ok(BTreeMap::new()),
    };

    scripts
        .iter()
        .map(|(key, value)| match value {
            Value::String(command) => Ok((key.clone(), command.clone())),
            other => Err(WorkspaceError::InvalidScripts(format!(
                "Expected workspace \"{}\" script \"{}\" to be a string, got {}",
                workspace_name,
                key,
                type_name(other)
            ))),
        })
        .collect()
}

/// Resolve `.` and `..` components without touching the filesystem
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(Component::ParentDir),
            },
            other => normalized.push(other),
        }
    }
    normalized
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ALL: &[ManifestField] = &[
        ManifestField::Name,
        ManifestField::Workspaces,
        ManifestField::Scripts,
    ];

    fn write_manifest(content: &str) -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("package.json");
        fs::write(&path, content).unwrap();
        (temp, path)
    }

    fn resolve(content: &str, required: &[ManifestField]) -> WorkspaceResult<Manifest> {
        let (temp, path) = write_manifest(content);
        resolve_manifest(&path, temp.path(), required)
    }

    #[test]
    fn test_valid_manifest() {
        let manifest = resolve(
            r#"{
                "name": "test-root",
                "version": "1.2.3",
                "workspaces": ["applications/*", "  ", "libraries/**/*"],
                "scripts": { "build": "tsc" }
            }"#,
            ALL,
        )
        .unwrap();

        assert_eq!(manifest.name, "test-root");
        assert_eq!(manifest.workspaces, vec!["applications/*", "libraries/**/*"]);
        assert_eq!(manifest.scripts.get("build").unwrap(), "tsc");
        assert_eq!(manifest.extra.get("version").unwrap(), "1.2.3");
        assert!(!manifest.extra.contains_key("name"));
    }

    #[test]
    fn test_invalid_json() {
        let err = resolve("{ not json", ALL).unwrap_err();
        assert!(matches!(err, WorkspaceError::InvalidPackageJson(_)));

        let err = resolve("[1, 2]", ALL).unwrap_err();
        assert!(matches!(err, WorkspaceError::InvalidPackageJson(_)));
        assert!(err.to_string().contains("package.json to be an object"));

        let err = resolve("42", &[]).unwrap_err();
        assert!(matches!(err, WorkspaceError::InvalidPackageJson(_)));
    }

    #[test]
    fn test_missing_file_is_invalid() {
        let temp = TempDir::new().unwrap();
        let err = resolve_manifest(&temp.path().join("package.json"), temp.path(), ALL)
            .unwrap_err();
        assert!(matches!(err, WorkspaceError::InvalidPackageJson(_)));
    }

    #[test]
    fn test_name_validation() {
        let err = resolve(r#"{}"#, &[ManifestField::Name]).unwrap_err();
        assert!(matches!(err, WorkspaceError::NoWorkspaceName(_)));

        let err = resolve(r#"{ "name": 5 }"#, &[ManifestField::Name]).unwrap_err();
        assert!(matches!(err, WorkspaceError::NoWorkspaceName(_)));

        let err = resolve(r#"{ "name": "   " }"#, &[ManifestField::Name]).unwrap_err();
        assert!(matches!(err, WorkspaceError::NoWorkspaceName(_)));

        let err = resolve(r#"{ "name": "lib-*" }"#, &[ManifestField::Name]).unwrap_err();
        assert!(matches!(err, WorkspaceError::InvalidWorkspaceName(_)));
    }

    #[test]
    fn test_unrequested_fields_default() {
        let manifest = resolve(
            r#"{ "name": 5, "workspaces": "nope", "scripts": { "a": 1, "b": "echo" } }"#,
            &[],
        )
        .unwrap();
        assert_eq!(manifest.name, "");
        assert!(manifest.workspaces.is_empty());
        assert_eq!(manifest.scripts.len(), 1);
        assert_eq!(manifest.scripts.get("b").unwrap(), "echo");
    }

    #[test]
    fn test_workspaces_validation() {
        let required = &[ManifestField::Workspaces];

        let err = resolve(r#"{ "workspaces": "packages/*" }"#, required).unwrap_err();
        assert!(matches!(err, WorkspaceError::InvalidWorkspaces(_)));

        let err = resolve(r#"{ "workspaces": ["packages/*", 3] }"#, required).unwrap_err();
        assert!(matches!(err, WorkspaceError::InvalidWorkspacePattern(_)));

        let err = resolve(r#"{ "workspaces": ["../outside/*"] }"#, required).unwrap_err();
        assert!(matches!(err, WorkspaceError::InvalidWorkspacePattern(_)));

        let err = resolve(r#"{ "workspaces": ["/etc/*"] }"#, required).unwrap_err();
        assert!(matches!(err, WorkspaceError::InvalidWorkspacePattern(_)));

        let manifest = resolve(r#"{ "workspaces": ["a/../b/*"] }"#, required).unwrap();
        assert_eq!(manifest.workspaces, vec!["a/../b/*"]);

        let manifest = resolve(r#"{ "workspaces": null }"#, required).unwrap();
        assert!(manifest.workspaces.is_empty());
    }

    #[test]
    fn test_scripts_validation() {
        let required = &[ManifestField::Scripts];

        let err = resolve(r#"{ "scripts": ["build"] }"#, required).unwrap_err();
        assert!(matches!(err, WorkspaceError::InvalidScripts(_)));

        let err = resolve(r#"{ "scripts": "build" }"#, required).unwrap_err();
        assert!(matches!(err, WorkspaceError::InvalidScripts(_)));

        let err = resolve(r#"{ "scripts": { "build": true } }"#, required).unwrap_err();
        assert!(matches!(err, WorkspaceError::InvalidScripts(_)));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("/repo/./a/../b/*")),
            PathBuf::from("/repo/b/*")
        );
        assert_eq!(normalize_path(Path::new("/repo/../..")), PathBuf::from("/"));
    }
}
