//! bun-workspaces: run scripts across the workspaces of a monorepo
//!
//! This crate discovers the workspaces declared by a root `package.json`,
//! indexes their scripts, and runs a script across any subset of them,
//! sequentially or in parallel.

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::ProjectConfig;
pub use domain::{Project, Workspace};
pub use error::{AppError, Result};
