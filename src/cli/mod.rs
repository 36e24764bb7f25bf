//! Command-line interface: argument definitions and command handlers.
//!
//! Handlers return the lines to print rather than writing them, so the
//! binary owns stdout and tests can inspect the output directly.

pub mod output;

use crate::config::ProjectConfig;
use crate::domain::{pattern, Project, ProjectScriptCommand, ScriptCommandOptions, Workspace};
use crate::error::{AppError, ProjectError, Result};
use crate::services::{run_commands, OutputMode, RunOptions, RunSummary};
use clap::{Parser, Subcommand, ValueEnum};
use output::{json_lines, script_info_lines, workspace_info_lines, ScriptSummary};
use std::path::PathBuf;

/// Placeholder in `--args` replaced by each workspace's name
pub const WORKSPACE_PLACEHOLDER: &str = "<workspace>";

/// bun-workspaces - run scripts across the workspaces of a monorepo
#[derive(Debug, Parser)]
#[command(name = "bun-workspaces", version)]
#[command(about = "CLI for utilities for Bun workspaces")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Working directory (project root)
    #[arg(short = 'd', long, global = true, value_name = "dir")]
    pub cwd: Option<PathBuf>,

    /// Log level
    #[arg(
        short = 'l',
        long,
        global = true,
        value_enum,
        default_value_t = LogLevel::Info,
        value_name = "level"
    )]
    pub log_level: LogLevel,
}

/// Log levels accepted by `--log-level`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Silent,
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    /// Equivalent `tracing` filter directive
    pub fn filter_directive(&self) -> &'static str {
        match self {
            Self::Silent => "off",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List all workspaces
    #[command(visible_aliases = ["ls", "list"])]
    ListWorkspaces {
        /// Wildcard pattern for workspace names
        pattern: Option<String>,
        /// Only show workspace names
        #[arg(long)]
        name_only: bool,
        #[command(flatten)]
        json: JsonArgs,
    },
    /// List all scripts available with their workspaces
    ListScripts {
        /// Only show script names
        #[arg(long)]
        name_only: bool,
        #[command(flatten)]
        json: JsonArgs,
    },
    /// Show information about a workspace
    #[command(visible_alias = "info")]
    WorkspaceInfo {
        workspace: String,
        #[command(flatten)]
        json: JsonArgs,
    },
    /// Show information about a script
    ScriptInfo {
        script: String,
        /// Only show script's workspace names
        #[arg(long)]
        workspaces_only: bool,
        #[command(flatten)]
        json: JsonArgs,
    },
    /// Run a script in all workspaces
    Run {
        script: String,
        /// Workspace names or wildcard patterns (default: every workspace with the script)
        workspaces: Vec<String>,
        /// Run the scripts in parallel
        #[arg(long)]
        parallel: bool,
        /// Args to append to the script command
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        args: String,
    },
}

/// Shared JSON output flags
#[derive(Debug, Clone, Copy, Default, clap::Args)]
pub struct JsonArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
    /// Pretty print JSON
    #[arg(long)]
    pub pretty: bool,
}

/// What a command produced
#[derive(Debug, Default)]
pub struct CommandOutcome {
    /// Lines for stdout
    pub lines: Vec<String>,
    /// False when the process should exit non-zero
    pub success: bool,
}

impl CommandOutcome {
    fn printed(lines: Vec<String>) -> Self {
        Self {
            lines,
            success: true,
        }
    }
}

/// Execute a parsed command against a loaded project
pub async fn execute(
    command: &Commands,
    project: &Project,
    config: &ProjectConfig,
    log_level: LogLevel,
) -> Result<CommandOutcome> {
    match command {
        Commands::ListWorkspaces {
            pattern,
            name_only,
            json,
        } => list_workspaces(project, pattern.as_deref(), *name_only, *json)
            .map(CommandOutcome::printed),
        Commands::ListScripts { name_only, json } => {
            list_scripts(project, *name_only, *json).map(CommandOutcome::printed)
        }
        Commands::WorkspaceInfo { workspace, json } => {
            workspace_info(project, workspace, *json).map(CommandOutcome::printed)
        }
        Commands::ScriptInfo {
            script,
            workspaces_only,
            json,
        } => script_info(project, script, *workspaces_only, *json).map(CommandOutcome::printed),
        Commands::Run {
            script,
            workspaces,
            parallel,
            args,
        } => {
            let options = run_options(config, *parallel, log_level);
            let summary = run_script(project, config, script, workspaces, args, options).await?;
            Ok(CommandOutcome {
                lines: Vec::new(),
                success: summary.success(),
            })
        }
    }
}

pub fn list_workspaces(
    project: &Project,
    pattern: Option<&str>,
    name_only: bool,
    json: JsonArgs,
) -> Result<Vec<String>> {
    tracing::debug!(
        "Command: List workspaces (pattern: {:?}, name_only: {}, json: {:?})",
        pattern,
        name_only,
        json
    );

    let workspaces: Vec<&Workspace> = match pattern {
        Some(pattern) if !pattern.is_empty() => project.find_workspaces_by_pattern(pattern),
        _ => project.workspaces().iter().collect(),
    };

    let mut lines = if json.json {
        if name_only {
            let names: Vec<&str> = workspaces.iter().map(|ws| ws.name.as_str()).collect();
            json_lines(&names, json.pretty)?
        } else {
            json_lines(&workspaces, json.pretty)?
        }
    } else if name_only {
        workspaces.iter().map(|ws| ws.name.clone()).collect()
    } else {
        workspaces
            .iter()
            .flat_map(|ws| workspace_info_lines(ws))
            .collect()
    };

    if lines.is_empty() {
        lines.push("No workspaces found".to_string());
    }
    Ok(lines)
}

pub fn list_scripts(project: &Project, name_only: bool, json: JsonArgs) -> Result<Vec<String>> {
    tracing::debug!(
        "Command: List scripts (name_only: {}, json: {:?})",
        name_only,
        json
    );

    let scripts = project.list_scripts_with_workspaces();

    if json.json {
        return if name_only {
            json_lines(&scripts.keys().collect::<Vec<_>>(), json.pretty)
        } else {
            let summaries: Vec<ScriptSummary<'_>> = scripts.values().map(Into::into).collect();
            json_lines(&summaries, json.pretty)
        };
    }

    let mut lines: Vec<String> = if name_only {
        scripts.keys().cloned().collect()
    } else {
        scripts
            .values()
            .flat_map(|metadata| script_info_lines(&metadata.name, &metadata.workspaces))
            .collect()
    };

    if lines.is_empty() {
        lines.push("No scripts found".to_string());
    }
    Ok(lines)
}

pub fn workspace_info(project: &Project, name: &str, json: JsonArgs) -> Result<Vec<String>> {
    tracing::debug!("Command: Workspace info for {} (json: {:?})", name, json);

    let workspace = project.find_workspace_by_name(name).ok_or_else(|| {
        ProjectError::ProjectWorkspaceNotFound(format!("Workspace not found: {:?}", name))
    })?;

    if json.json {
        json_lines(workspace, json.pretty)
    } else {
        Ok(workspace_info_lines(workspace))
    }
}

pub fn script_info(
    project: &Project,
    script: &str,
    workspaces_only: bool,
    json: JsonArgs,
) -> Result<Vec<String>> {
    tracing::debug!(
        "Command: Script info for {} (workspaces_only: {}, json: {:?})",
        script,
        workspaces_only,
        json
    );

    let scripts = project.list_scripts_with_workspaces();
    let Some(metadata) = scripts.get(script) else {
        let available = scripts.keys().cloned().collect::<Vec<_>>().join(", ");
        return Ok(vec![format!(
            "Script not found: {:?} (available: {})",
            script,
            if available.is_empty() { "none" } else { available.as_str() }
        )]);
    };

    if json.json {
        if workspaces_only {
            json_lines(&metadata.workspace_names(), json.pretty)
        } else {
            json_lines(&ScriptSummary::from(metadata), json.pretty)
        }
    } else if workspaces_only {
        Ok(metadata
            .workspace_names()
            .into_iter()
            .map(str::to_string)
            .collect())
    } else {
        Ok(script_info_lines(script, &metadata.workspaces))
    }
}

/// Pick the run options for a `run` invocation
pub fn run_options(config: &ProjectConfig, parallel: bool, log_level: LogLevel) -> RunOptions {
    let options = if parallel {
        RunOptions::parallel(config.runner.parallel_limit())
    } else {
        RunOptions::sequential()
    };

    let output = if log_level == LogLevel::Silent {
        OutputMode::Silent
    } else if parallel && config.output.prefix {
        OutputMode::Prefixed
    } else {
        OutputMode::Inherit
    };

    options.with_output(output)
}

/// Resolve `run` targets to workspace names.
///
/// No selectors means every workspace declaring the script. A selector with
/// `*` matches workspace names that declare the script; anything else is a
/// literal name and is checked when its command is built.
pub fn resolve_run_targets(
    project: &Project,
    script: &str,
    selectors: &[String],
) -> Result<Vec<String>> {
    let mut names: Vec<String> = Vec::new();

    if selectors.is_empty() {
        names.extend(
            project
                .list_workspaces_with_script(script)
                .into_iter()
                .map(|ws| ws.name.clone()),
        );
    } else {
        for selector in selectors {
            let matched: Vec<String> = if pattern::has_wildcard(selector) {
                project
                    .find_workspaces_by_pattern(selector)
                    .into_iter()
                    .filter(|ws| ws.manifest.has_script(script))
                    .map(|ws| ws.name.clone())
                    .collect()
            } else {
                vec![selector.clone()]
            };

            for name in matched {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
    }

    if names.is_empty() {
        return Err(AppError::usage(format!(
            "No {}workspaces found for script {:?}",
            if selectors.is_empty() { "" } else { "matching " },
            script
        )));
    }

    Ok(names)
}

/// Build every command up front so an unknown workspace fails before anything runs
pub fn create_run_commands<'p>(
    project: &'p Project,
    config: &ProjectConfig,
    script: &str,
    workspace_names: &[String],
    args: &str,
) -> Result<Vec<ProjectScriptCommand<'p>>> {
    workspace_names
        .iter()
        .map(|name| {
            let workspace_args = args.replace(WORKSPACE_PLACEHOLDER, name);
            project
                .create_script_command(ScriptCommandOptions {
                    script_name: script,
                    workspace_name: name,
                    method: config.runner.method,
                    args: &workspace_args,
                })
                .map_err(AppError::from)
        })
        .collect()
}

/// Run `script` in the selected workspaces and report each result
pub async fn run_script(
    project: &Project,
    config: &ProjectConfig,
    script: &str,
    selectors: &[String],
    args: &str,
    options: RunOptions,
) -> Result<RunSummary> {
    tracing::debug!(
        "Command: Run script {:?} for {} (parallel: {}, method: {}, args: {:?})",
        script,
        if selectors.is_empty() {
            "all workspaces".to_string()
        } else {
            format!("workspaces {}", selectors.join(", "))
        },
        options.is_parallel(),
        config.runner.method,
        args
    );

    let names = resolve_run_targets(project, script, selectors)?;
    let commands = create_run_commands(project, config, script, &names, args)?;

    let summary = run_commands(&commands, options).await;

    for result in &summary.results {
        let marker = if result.success { "✅" } else { "❌" };
        tracing::info!("{} {}: {}", marker, result.workspace_name, script);
        if let Some(error) = &result.error {
            tracing::debug!("{}: {}", result.workspace_name, error);
        }
    }

    let total = summary.results.len();
    let plural = if total == 1 { "" } else { "s" };
    let failures = summary.failure_count();
    if failures > 0 {
        tracing::info!("{} of {} script{} failed", failures, total, plural);
    } else {
        tracing::info!("{} script{} ran successfully", total, plural);
    }

    Ok(summary)
}
