//! Error types at the command line boundary.
//!
//! Bundler failures are wrapped together with argument, manifest and I/O
//! errors so `main` can report them uniformly.

use crate::bundler::Error as InnerError;
use thiserror::Error;

/// Result type alias for command line operations
pub type Result<T> = std::result::Result<T, BundlerError>;

/// Main error type for all command line operations
#[derive(Error, Debug)]
pub enum BundlerError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Bundler errors
    #[error("Bundler error: {0}")]
    Bundler(#[from] InnerError),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Conflicting arguments
    #[error("Conflicting arguments: {arguments:?}")]
    ConflictingArguments {
        /// Arguments that conflict
        arguments: Vec<String>,
    },

    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}

impl BundlerError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            Self::Bundler(InnerError::MissingTool(tool)) => vec![format!(
                "Install `{tool}` with the system package manager, or drop the matching --rpm/--deb flag"
            )],
            Self::Bundler(InnerError::ExternalToolFailed { .. }) => {
                vec!["The tool's own output above describes the failure".to_string()]
            }
            Self::Bundler(InnerError::Config(_)) | Self::Bundler(InnerError::EntryPoint(_)) => {
                vec!["Check [project.scripts] and [tool.pyinstaller-bundle] in pyproject.toml".to_string()]
            }
            Self::Cli(CliError::ConflictingArguments { .. }) => {
                vec!["Build RPM and DEB packages from a one-file bundle".to_string()]
            }
            Self::Toml(_) => vec!["Fix the syntax of pyproject.toml".to_string()],
            _ => Vec::new(),
        }
    }
}
