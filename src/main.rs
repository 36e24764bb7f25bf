//! bun-workspaces: run scripts across the workspaces of a monorepo.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bun_workspaces::cli::{self, Cli, LogLevel};
use bun_workspaces::{AppError, Project, ProjectConfig};

/// Initialize logging with RUST_LOG environment variable support
fn init_logging(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.filter_directive()));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .without_time(),
        )
        .init();
}

/// Resolve the project root from `--cwd` or the current directory
fn resolve_root(cwd: Option<&Path>) -> Result<PathBuf> {
    let dir = match cwd {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().context("Failed to read current directory")?,
    };
    std::path::absolute(&dir)
        .with_context(|| format!("Invalid working directory {}", dir.display()))
}

/// Prefix errors with their failure kind so scripts can match on it
fn describe(err: AppError) -> anyhow::Error {
    match &err {
        AppError::Workspace(e) => anyhow!("{}: {}", e.kind(), e),
        AppError::Project(e) => anyhow!("{}: {}", e.kind(), e),
        _ => anyhow::Error::new(err),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.log_level);

    let root = resolve_root(cli.cwd.as_deref())?;
    tracing::debug!("Log level: {:?}", cli.log_level);

    let config = ProjectConfig::load(Some(&root)).map_err(|e| describe(e.into()))?;
    let project = Project::from_root_manifest(&root)
        .map_err(|e| describe(e.into()))?
        .with_program(config.runner.program.clone());

    let outcome = cli::execute(&cli.command, &project, &config, cli.log_level)
        .await
        .map_err(describe)?;

    if !outcome.lines.is_empty() {
        println!("{}", outcome.lines.join("\n"));
    }

    if !outcome.success {
        std::process::exit(1);
    }

    Ok(())
}
