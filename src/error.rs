//! Unified error types for bun-workspaces.

use thiserror::Error;

/// Main application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Usage(String),
}

impl AppError {
    /// Create a usage error from a string
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Manifest and workspace discovery errors.
///
/// Every variant aborts discovery; no partial project is ever returned.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("{0}")]
    PackageNotFound(String),

    #[error("{0}")]
    InvalidPackageJson(String),

    #[error("{0}")]
    NoWorkspaceName(String),

    #[error("{0}")]
    InvalidWorkspaceName(String),

    #[error("{0}")]
    DuplicateWorkspaceName(String),

    #[error("{0}")]
    InvalidWorkspaces(String),

    #[error("{0}")]
    InvalidWorkspacePattern(String),

    #[error("{0}")]
    InvalidScripts(String),
}

impl WorkspaceError {
    /// Name of the failure kind, stable across releases
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PackageNotFound(_) => "PackageNotFound",
            Self::InvalidPackageJson(_) => "InvalidPackageJson",
            Self::NoWorkspaceName(_) => "NoWorkspaceName",
            Self::InvalidWorkspaceName(_) => "InvalidWorkspaceName",
            Self::DuplicateWorkspaceName(_) => "DuplicateWorkspaceName",
            Self::InvalidWorkspaces(_) => "InvalidWorkspaces",
            Self::InvalidWorkspacePattern(_) => "InvalidWorkspacePattern",
            Self::InvalidScripts(_) => "InvalidScripts",
        }
    }
}

/// Project query errors
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("{0}")]
    ProjectWorkspaceNotFound(String),

    #[error("{0}")]
    WorkspaceScriptDoesNotExist(String),
}

impl ProjectError {
    /// Name of the failure kind, stable across releases
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ProjectWorkspaceNotFound(_) => "ProjectWorkspaceNotFound",
            Self::WorkspaceScriptDoesNotExist(_) => "WorkspaceScriptDoesNotExist",
        }
    }
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias for manifest and discovery operations
pub type WorkspaceResult<T> = std::result::Result<T, WorkspaceError>;

/// Result type alias for project queries
pub type ProjectResult<T> = std::result::Result<T, ProjectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        let err = WorkspaceError::DuplicateWorkspaceName("dup".to_string());
        assert_eq!(err.kind(), "DuplicateWorkspaceName");
        assert_eq!(err.to_string(), "dup");

        let err = ProjectError::WorkspaceScriptDoesNotExist("missing".to_string());
        assert_eq!(err.kind(), "WorkspaceScriptDoesNotExist");
    }

    #[test]
    fn test_app_error_is_transparent() {
        let err: AppError = WorkspaceError::PackageNotFound("No package.json".to_string()).into();
        assert_eq!(err.to_string(), "No package.json");
    }
}
