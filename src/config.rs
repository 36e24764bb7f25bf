//! Configuration management for bun-workspaces.
//!
//! Supports layered configuration: defaults → project → user → env

use crate::domain::ScriptCommandMethod;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the optional per-project configuration file
pub const PROJECT_CONFIG_FILE: &str = ".bun-workspaces.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl ProjectConfig {
    /// Load configuration with hierarchy: defaults → project → user → env
    pub fn load(project_root: Option<&Path>) -> Result<Self, ConfigError> {
        use config::{Config, Environment, File};

        let mut builder = Config::builder();

        // 1. Start with defaults
        builder = builder.add_source(
            config::File::from_str(
                include_str!("../default_config.toml"),
                config::FileFormat::Toml,
            )
            .required(false),
        );

        // 2. Project-specific config (.bun-workspaces.toml in project root)
        if let Some(root) = project_root {
            let project_config = root.join(PROJECT_CONFIG_FILE);
            if project_config.exists() {
                builder = builder.add_source(File::from(project_config).required(false));
            }
        }

        // 3. User config (~/.config/bun-workspaces/config.toml)
        if let Some(config_dir) =
            directories::ProjectDirs::from("com", "bun-workspaces", "bun-workspaces")
        {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(File::from(user_config).required(false));
            }
        }

        // 4. Environment variables (BUN_WORKSPACES__*)
        builder = builder.add_source(
            Environment::with_prefix("BUN_WORKSPACES")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        loaded.validate()?;
        Ok(loaded)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.runner.program.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "runner.program must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// How script commands are built and scheduled
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Executable that runs package scripts
    #[serde(default = "default_program")]
    pub program: String,
    /// Invocation method used by `run`
    #[serde(default)]
    pub method: ScriptCommandMethod,
    /// Upper bound on concurrently running scripts (0 = unbounded)
    #[serde(default)]
    pub max_parallel: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            method: ScriptCommandMethod::default(),
            max_parallel: 0,
        }
    }
}

impl RunnerConfig {
    /// Concurrency limit, if any
    pub fn parallel_limit(&self) -> Option<usize> {
        (self.max_parallel > 0).then_some(self.max_parallel)
    }
}

fn default_program() -> String {
    "bun".to_string()
}

/// Script output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Prefix each child output line with `[workspace:script]` in parallel runs
    #[serde(default = "default_prefix")]
    pub prefix: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
        }
    }
}

fn default_prefix() -> bool {
    true
}
