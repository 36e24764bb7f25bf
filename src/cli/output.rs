//! Text and JSON rendering for CLI output.

use crate::domain::{ScriptMetadata, Workspace};
use crate::error::Result;
use serde::Serialize;

/// Script name with the names of its workspaces, as printed in JSON
#[derive(Debug, Serialize)]
pub struct ScriptSummary<'a> {
    pub name: &'a str,
    pub workspaces: Vec<&'a str>,
}

impl<'a, 'p: 'a> From<&'a ScriptMetadata<'p>> for ScriptSummary<'a> {
    fn from(metadata: &'a ScriptMetadata<'p>) -> Self {
        Self {
            name: &metadata.name,
            workspaces: metadata.workspace_names(),
        }
    }
}

pub fn workspace_info_lines(workspace: &Workspace) -> Vec<String> {
    vec![
        format!("Workspace: {}", workspace.name),
        format!(" - Path: {}", workspace.path),
        format!(" - Glob Match: {}", workspace.match_pattern),
        format!(" - Scripts: {}", workspace.manifest.script_names().join(", ")),
    ]
}

pub fn script_info_lines(script: &str, workspaces: &[&Workspace]) -> Vec<String> {
    std::iter::once(format!("Script: {}", script))
        .chain(workspaces.iter().map(|ws| format!(" - {}", ws.name)))
        .collect()
}

/// Serialize `data` as JSON, one output line per JSON line
pub fn json_lines<T: Serialize + ?Sized>(data: &T, pretty: bool) -> Result<Vec<String>> {
    let json = if pretty {
        serde_json::to_string_pretty(data)?
    } else {
        serde_json::to_string(data)?
    };
    Ok(json.lines().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Manifest;
    use std::collections::BTreeMap;

    fn workspace() -> Workspace {
        let mut scripts = BTreeMap::new();
        scripts.insert("library-a".to_string(), "echo a".to_string());
        scripts.insert("all-workspaces".to_string(), "echo all".to_string());
        Workspace {
            name: "library-a".to_string(),
            path: "libraries/libraryA".to_string(),
            match_pattern: "libraries/**/*".to_string(),
            manifest: Manifest {
                name: "library-a".to_string(),
                scripts,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_workspace_info_lines() {
        insta::assert_snapshot!(workspace_info_lines(&workspace()).join("\n"), @r"
Workspace: library-a
 - Path: libraries/libraryA
 - Glob Match: libraries/**/*
 - Scripts: all-workspaces, library-a
");
    }

    #[test]
    fn test_script_info_lines() {
        let ws = workspace();
        assert_eq!(
            script_info_lines("all-workspaces", &[&ws]),
            vec!["Script: all-workspaces", " - library-a"]
        );
    }

    #[test]
    fn test_json_lines() {
        let names = ["a", "b"];
        assert_eq!(json_lines(&names, false).unwrap(), vec![r#"["a","b"]"#]);
        assert_eq!(
            json_lines(&names, true).unwrap(),
            vec!["[", "  \"a\",", "  \"b\"", "]"]
        );
    }
}
