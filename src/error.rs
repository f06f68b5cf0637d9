//! Error types for enki
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Filesystem staging errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Source path missing or unopenable
    #[error("Path not found: '{path}'")]
    NotFound { path: PathBuf },

    /// Destination could not be created or modified
    #[error("Cannot write '{path}': {error}")]
    WriteDenied { path: PathBuf, error: String },

    /// Reading an opened file or listing a directory failed
    #[error("Failed to read '{path}': {error}")]
    ReadError { path: PathBuf, error: String },
}

impl FilesystemError {
    /// Classify an I/O error raised while reading `path`
    pub(crate) fn read(path: &std::path::Path, error: &std::io::Error) -> Self {
        if error.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::ReadError {
                path: path.to_path_buf(),
                error: error.to_string(),
            }
        }
    }

    /// Wrap an I/O error raised while writing `path`
    pub(crate) fn write(path: &std::path::Path, error: &std::io::Error) -> Self {
        Self::WriteDenied {
            path: path.to_path_buf(),
            error: error.to_string(),
        }
    }
}

/// External tool errors
#[derive(Error, Debug)]
pub enum ToolError {
    /// The tool could not be launched or exited unsuccessfully
    #[error("Command '{command}' failed: {output}")]
    ExternalToolFailure { command: String, output: String },

    /// Required executable is not installed
    #[error("{tool}: executable file not found in $PATH")]
    NotFound { tool: String },
}

/// Settings errors
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Failed to read or write the settings file
    #[error("Failed to access settings file '{path}': {error}")]
    ReadError { path: String, error: String },

    /// Failed to parse or serialize the settings file
    #[error("Failed to parse settings file '{path}': {error}")]
    ParseError { path: String, error: String },
}

/// Logging setup errors
#[derive(Error, Debug)]
pub enum LoggingError {
    /// A global subscriber is already installed
    #[error("Failed to initialize logging: {0}")]
    Init(String),
}

/// Top-level enki error type
#[derive(Error, Debug)]
pub enum EnkiError {
    /// Filesystem error
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),

    /// Tool error
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Settings error
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// Logging error
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),
}
