//! Script command construction.

use super::Workspace;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// How a workspace script is invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptCommandMethod {
    /// Run from the workspace's own directory
    #[default]
    Cd,
    /// Run from the project root, selecting the workspace with `--filter`
    Filter,
}

impl fmt::Display for ScriptCommandMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cd => write!(f, "cd"),
            Self::Filter => write!(f, "filter"),
        }
    }
}

/// One concrete invocation: an executable, its arguments and a working directory.
///
/// Arguments are kept as a vector so they reach the process untouched; the
/// single-string form is only a rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl ScriptCommand {
    /// Build the command for `script_name` in `workspace`
    pub fn build(
        program: &str,
        method: ScriptCommandMethod,
        workspace: &Workspace,
        script_name: &str,
        args: &str,
        root_dir: &Path,
    ) -> Self {
        let mut argv = vec!["--silent".to_string(), "run".to_string()];

        let cwd = match method {
            ScriptCommandMethod::Cd => workspace.directory(root_dir),
            ScriptCommandMethod::Filter => {
                argv.push(format!("--filter={}", workspace.name));
                root_dir.to_path_buf()
            }
        };

        argv.push(script_name.to_string());
        argv.extend(split_args(args));

        Self {
            program: program.to_string(),
            args: argv,
            cwd,
        }
    }

    /// The full command line, each argument shell-quoted when needed
    pub fn command_line(&self) -> String {
        shell_words::join(std::iter::once(&self.program).chain(&self.args))
    }
}

impl fmt::Display for ScriptCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// Split a user-supplied argument string on whitespace
fn split_args(args: &str) -> impl Iterator<Item = String> + '_ {
    args.split_whitespace().map(str::to_string)
}

/// A script name together with every workspace declaring it
#[derive(Debug, Clone)]
pub struct ScriptMetadata<'a> {
    pub name: String,
    pub workspaces: Vec<&'a Workspace>,
}

impl ScriptMetadata<'_> {
    /// Names of the declaring workspaces, in project order
    pub fn workspace_names(&self) -> Vec<&str> {
        self.workspaces.iter().map(|ws| ws.name.as_str()).collect()
    }
}

/// Input to `Project::create_script_command`
#[derive(Debug, Clone)]
pub struct ScriptCommandOptions<'a> {
    pub script_name: &'a str,
    pub workspace_name: &'a str,
    pub method: ScriptCommandMethod,
    pub args: &'a str,
}

/// A script command bound to the workspace it runs in
#[derive(Debug, Clone)]
pub struct ProjectScriptCommand<'a> {
    pub command: ScriptCommand,
    pub script_name: String,
    pub workspace: &'a Workspace,
}
