//! Project entity: the discovered workspace set and its queries.

use super::pattern::WildcardPattern;
use super::script::{ProjectScriptCommand, ScriptCommand, ScriptCommandOptions, ScriptMetadata};
use super::{Workspace, MANIFEST_FILE};
use crate::error::{ProjectError, ProjectResult, WorkspaceError, WorkspaceResult};
use crate::services::discovery::discover_workspaces;
use crate::services::manifest::{normalize_path, resolve_manifest, ManifestField};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

const DEFAULT_PROGRAM: &str = "bun";

/// A monorepo root and every workspace it declares
#[derive(Debug, Clone)]
pub struct Project {
    /// Name from the root manifest (may be empty)
    pub name: String,
    /// Absolute project root
    pub root_dir: PathBuf,
    /// Executable used when building script commands
    program: String,
    workspaces: Vec<Workspace>,
}

impl Project {
    /// Create a project from an already discovered, sorted workspace set
    pub fn new(name: String, root_dir: PathBuf, workspaces: Vec<Workspace>) -> Self {
        Self {
            name,
            root_dir,
            program: DEFAULT_PROGRAM.to_string(),
            workspaces,
        }
    }

    /// Load the project rooted at `root_dir` from its `package.json`
    pub fn from_root_manifest(root_dir: &Path) -> WorkspaceResult<Self> {
        let root_dir = std::path::absolute(root_dir)
            .map(|path| normalize_path(&path))
            .map_err(|e| {
                WorkspaceError::PackageNotFound(format!(
                    "Cannot resolve project root {}: {}",
                    root_dir.display(),
                    e
                ))
            })?;

        let manifest_path = root_dir.join(MANIFEST_FILE);
        if !manifest_path.exists() {
            return Err(WorkspaceError::PackageNotFound(format!(
                "No package.json found at {}",
                manifest_path.display()
            )));
        }

        let manifest = resolve_manifest(&manifest_path, &root_dir, &[ManifestField::Workspaces])?;
        let discovered = discover_workspaces(&root_dir, &manifest.workspaces)?;

        tracing::debug!(
            "Project: {:?} ({} workspace{})",
            manifest.name,
            discovered.workspaces.len(),
            if discovered.workspaces.len() == 1 { "" } else { "s" }
        );
        tracing::debug!("Project root: {}", root_dir.display());

        Ok(Self::new(manifest.name, root_dir, discovered.workspaces))
    }

    /// Use a different executable for script commands
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// All workspaces, sorted by name then path
    pub fn workspaces(&self) -> &[Workspace] {
        &self.workspaces
    }

    /// Find a workspace by exact name
    pub fn find_workspace_by_name(&self, name: &str) -> Option<&Workspace> {
        self.workspaces.iter().find(|ws| ws.name == name)
    }

    /// Find workspaces whose name matches a `*` wildcard pattern
    pub fn find_workspaces_by_pattern(&self, pattern: &str) -> Vec<&Workspace> {
        if pattern.is_empty() {
            return Vec::new();
        }

        match WildcardPattern::new(pattern) {
            Ok(pattern) => self
                .workspaces
                .iter()
                .filter(|ws| pattern.is_match(&ws.name))
                .collect(),
            Err(e) => {
                tracing::warn!("Unusable workspace pattern {:?}: {}", pattern, e);
                Vec::new()
            }
        }
    }

    /// Workspaces declaring a non-empty script named `script_name`
    pub fn list_workspaces_with_script(&self, script_name: &str) -> Vec<&Workspace> {
        self.workspaces
            .iter()
            .filter(|ws| ws.manifest.has_script(script_name))
            .collect()
    }

    /// Every script name across all workspaces, with the workspaces declaring it
    pub fn list_scripts_with_workspaces(&self) -> BTreeMap<String, ScriptMetadata<'_>> {
        let names: BTreeSet<&str> = self
            .workspaces
            .iter()
            .flat_map(|ws| ws.manifest.scripts.keys().map(String::as_str))
            .collect();

        names
            .into_iter()
            .map(|name| {
                let metadata = ScriptMetadata {
                    name: name.to_string(),
                    workspaces: self.list_workspaces_with_script(name),
                };
                (name.to_string(), metadata)
            })
            .collect()
    }

    /// Build the command that runs a workspace's script
    pub fn create_script_command(
        &self,
        options: ScriptCommandOptions<'_>,
    ) -> ProjectResult<ProjectScriptCommand<'_>> {
        let workspace = self
            .find_workspace_by_name(options.workspace_name)
            .ok_or_else(|| {
                ProjectError::ProjectWorkspaceNotFound(format!(
                    "Workspace not found: {:?}",
                    options.workspace_name
                ))
            })?;

        if !workspace.manifest.has_script(options.script_name) {
            let available = workspace.manifest.script_names().join(", ");
            return Err(ProjectError::WorkspaceScriptDoesNotExist(format!(
                "Script not found in workspace {:?}: {:?} (available: {})",
                workspace.name,
                options.script_name,
                if available.is_empty() { "none" } else { available.as_str() }
            )));
        }

        let command = ScriptCommand::build(
            &self.program,
            options.method,
            workspace,
            options.script_name,
            options.args,
            &self.root_dir,
        );

        Ok(ProjectScriptCommand {
            command,
            script_name: options.script_name.to_string(),
            workspace,
        })
    }
}
