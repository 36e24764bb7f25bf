//! Infrastructure services for bun-workspaces.
//!
//! This module contains:
//! - manifest: `package.json` resolution and validation
//! - discovery: Workspace discovery from root globs
//! - process: Script execution, sequential or parallel

pub mod discovery;
pub mod manifest;
pub mod process;

pub use discovery::{discover_workspaces, DiscoveredWorkspaces};
pub use manifest::{resolve_manifest, ManifestField};
pub use process::{
    run_commands, ExecutionStrategy, OutputMode, OutputStream, RunOptions, RunSummary,
    ScriptResult,
};
