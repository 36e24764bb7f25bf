//! Domain entities for bun-workspaces.
//!
//! This module contains the core entities:
//! - Workspace: A discovered sub-package and its manifest
//! - Project: The root aggregate and its workspace queries
//! - ScriptCommand: An invocable script command
//! - pattern: Wildcard matching for workspace names

pub mod pattern;
mod project;
mod script;
mod workspace;

pub use project::Project;
pub use script::{
    ProjectScriptCommand, ScriptCommand, ScriptCommandMethod, ScriptCommandOptions, ScriptMetadata,
};
pub use workspace::{Manifest, Workspace, MANIFEST_FILE};
