//! CLI error types.

use crate::config::ConfigError;
use dcf_core::DcfError;
use dcf_engine::StageError;
use thiserror::Error;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Analysis error: {0}")]
    Engine(#[from] DcfError),

    #[error("Scenario analysis failed: {0}")]
    Stage(#[from] StageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),
}

/// Result alias for CLI commands.
pub type Result<T> = std::result::Result<T, CliError>;
