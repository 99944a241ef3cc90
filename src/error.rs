//! Error types and exit codes for gobfuscate

use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

/// Main error type for obfuscation runs.
///
/// Every variant is fatal: the pipeline never retries or patches around a
/// failure, and the scratch workspace is discarded by the caller.
#[derive(Error, Debug)]
pub enum ObfuscateError {
    #[error("Failed to parse {}: {message}", path.display())]
    ParseFailure { path: PathBuf, message: String },

    #[error("Import closure resolution failed: {message}")]
    ClosureResolutionFailure { message: String },

    #[error("Rename of {from} -> {to} failed: {message}")]
    RenamePrimitiveFailure {
        from: String,
        to: String,
        message: String,
    },

    #[error("Package move {from} -> {to} failed: {message}")]
    PathRenameFailure {
        from: String,
        to: String,
        message: String,
    },

    #[error("Required tool not found: {tool}")]
    ToolNotFound { tool: String },

    #[error("Failed to provision workspace: {message}")]
    ProvisionFailure { message: String },

    #[error("Failed to compile: {message}")]
    BuildFailure { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ObfuscateError {
    /// Convert error to a process exit code:
    /// - 0: Success
    /// - 1: IO / provisioning error
    /// - 2: Configuration or missing tool
    /// - 3: Parse failure
    /// - 4: Closure resolution failure
    /// - 5: Symbol or package rename failure
    /// - 6: Downstream build failure
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Io(_) | Self::ProvisionFailure { .. } => ExitCode::from(1),
            Self::ConfigError { .. } | Self::ToolNotFound { .. } => ExitCode::from(2),
            Self::ParseFailure { .. } => ExitCode::from(3),
            Self::ClosureResolutionFailure { .. } => ExitCode::from(4),
            Self::RenamePrimitiveFailure { .. } | Self::PathRenameFailure { .. } => {
                ExitCode::from(5)
            }
            Self::BuildFailure { .. } => ExitCode::from(6),
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ParseFailure {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for gobfuscate operations
pub type Result<T> = std::result::Result<T, ObfuscateError>;
