//! Process execution service for running workspace scripts.
//!
//! Handles spawning script processes, streaming their output, and
//! collecting one result per command. A failing script never stops its
//! siblings; failures are reported through [`RunSummary`].

use crate::domain::ProjectScriptCommand;
use futures::stream::{self, StreamExt};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;

/// Where child process output goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Child shares this process's stdout/stderr
    #[default]
    Inherit,
    /// Lines are forwarded as they arrive, prefixed with `[workspace:script]`
    Prefixed,
    /// Output is discarded
    Silent,
}

/// Output stream type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// How a batch of commands is scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// One command at a time, in order
    Sequential,
    /// All commands at once, optionally capped
    Parallel { max_concurrency: Option<usize> },
}

/// Options for [`run_commands`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub strategy: ExecutionStrategy,
    pub output: OutputMode,
}

impl RunOptions {
    /// Run commands one after another
    pub fn sequential() -> Self {
        Self {
            strategy: ExecutionStrategy::Sequential,
            output: OutputMode::default(),
        }
    }

    /// Run commands concurrently, at most `max_concurrency` at a time when given
    pub fn parallel(max_concurrency: Option<usize>) -> Self {
        Self {
            strategy: ExecutionStrategy::Parallel { max_concurrency },
            output: OutputMode::default(),
        }
    }

    /// Set the output mode
    pub fn with_output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    pub fn is_parallel(&self) -> bool {
        matches!(self.strategy, ExecutionStrategy::Parallel { .. })
    }
}

/// Outcome of one script command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptResult {
    pub workspace_name: String,
    pub script_name: String,
    pub success: bool,
    /// Exit code, if the process exited normally
    pub exit_code: Option<i32>,
    pub error: Option<String>,
}

impl ScriptResult {
    fn failed(entry: &ProjectScriptCommand<'_>, exit_code: Option<i32>, error: String) -> Self {
        Self {
            workspace_name: entry.workspace.name.clone(),
            script_name: entry.script_name.clone(),
            success: false,
            exit_code,
            error: Some(error),
        }
    }

    fn succeeded(entry: &ProjectScriptCommand<'_>) -> Self {
        Self {
            workspace_name: entry.workspace.name.clone(),
            script_name: entry.script_name.clone(),
            success: true,
            exit_code: Some(0),
            error: None,
        }
    }
}

/// Results of a batch, in the order the commands were given
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub results: Vec<ScriptResult>,
}

impl RunSummary {
    /// True when every command succeeded
    pub fn success(&self) -> bool {
        self.results.iter().all(|result| result.success)
    }

    /// Number of failed commands
    pub fn failure_count(&self) -> usize {
        self.results.iter().filter(|result| !result.success).count()
    }
}

/// Run every command and wait for all of them to settle
pub async fn run_commands(
    commands: &[ProjectScriptCommand<'_>],
    options: RunOptions,
) -> RunSummary {
    let results = match options.strategy {
        ExecutionStrategy::Sequential => {
            let mut results = Vec::with_capacity(commands.len());
            for entry in commands {
                results.push(run_command(entry, options.output).await);
            }
            results
        }
        ExecutionStrategy::Parallel { max_concurrency } => {
            let limit = max_concurrency.unwrap_or(commands.len()).max(1);
            // `buffered` yields in input order whatever the completion order
            stream::iter(commands)
                .map(|entry| run_command(entry, options.output))
                .buffered(limit)
                .collect::<Vec<_>>()
                .await
        }
    };

    RunSummary { results }
}

async fn run_command(entry: &ProjectScriptCommand<'_>, output: OutputMode) -> ScriptResult {
    let label = format!("{}:{}", entry.workspace.name, entry.script_name);

    tracing::debug!(
        "[{}] Running script {} in workspace {} (cwd: {}): {}",
        label,
        entry.script_name,
        entry.workspace.name,
        entry.command.cwd.display(),
        entry.command
    );

    let mut command = Command::new(&entry.command.program);
    command
        .args(&entry.command.args)
        .current_dir(&entry.command.cwd);

    match output {
        OutputMode::Inherit => command.stdout(Stdio::inherit()).stderr(Stdio::inherit()),
        OutputMode::Prefixed => command.stdout(Stdio::piped()).stderr(Stdio::piped()),
        OutputMode::Silent => command.stdout(Stdio::null()).stderr(Stdio::null()),
    };

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            return ScriptResult::failed(entry, None, format!("Failed to spawn process: {}", e))
        }
    };

    let mut forwarders: Vec<JoinHandle<()>> = Vec::new();
    if let Some(stdout) = child.stdout.take() {
        forwarders.push(tokio::spawn(forward_lines(
            stdout,
            label.clone(),
            OutputStream::Stdout,
        )));
    }
    if let Some(stderr) = child.stderr.take() {
        forwarders.push(tokio::spawn(forward_lines(
            stderr,
            label.clone(),
            OutputStream::Stderr,
        )));
    }

    let status = child.wait().await;

    for forwarder in forwarders {
        if let Err(e) = forwarder.await {
            tracing::warn!("[{}] Output forwarding stopped: {}", label, e);
        }
    }

    match status {
        Ok(status) if status.success() => ScriptResult::succeeded(entry),
        Ok(status) => match status.code() {
            Some(code) => {
                ScriptResult::failed(entry, Some(code), format!("Script exited with code {}", code))
            }
            None => ScriptResult::failed(entry, None, "Script terminated by signal".to_string()),
        },
        Err(e) => ScriptResult::failed(entry, None, format!("Failed to wait for process: {}", e)),
    }
}

async fn forward_lines<R>(reader: R, label: String, stream: OutputStream)
where
    R: AsyncRead + Unpin,
{
    match stream {
        OutputStream::Stdout => write_prefixed(reader, tokio::io::stdout(), &label).await,
        OutputStream::Stderr => write_prefixed(reader, tokio::io::stderr(), &label).await,
    }
}

/// Copy `reader` to `writer` line by line, each line prefixed with `[label]`.
/// Stops at the first read or write error, e.g. a closed pipe.
async fn write_prefixed<R, W>(reader: R, mut writer: W, label: &str)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("[{}] Failed to read output: {}", label, e);
                break;
            }
        };

        let prefixed = format!("[{}] {}\n", label, line);
        if let Err(e) = writer.write_all(prefixed.as_bytes()).await {
            tracing::debug!("[{}] Output closed: {}", label, e);
            break;
        }
        if let Err(e) = writer.flush().await {
            tracing::debug!("[{}] Output closed: {}", label, e);
            break;
        }
    }
}
