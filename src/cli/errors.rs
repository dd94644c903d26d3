//! CLI-specific error types
//!
//! Every CLI error is fatal: the binary prints it to stderr and exits 1.
//! Query errors are not CLI errors; they are written as an error response.

use std::io;

use thiserror::Error;

use crate::dataset::DatasetError;

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

/// CLI error
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file missing, malformed or invalid
    #[error("CLI_CONFIG_ERROR: {0}")]
    Config(String),

    /// stdin/stdout failure
    #[error("CLI_IO_ERROR: {0}")]
    Io(String),

    /// A configured dataset could not be loaded
    #[error("{}: {}", .0.code(), .0)]
    Dataset(#[from] DatasetError),
}

impl CliError {
    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        CliError::Config(msg.into())
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        CliError::Io(msg.into())
    }

    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(_) => "CLI_CONFIG_ERROR",
            CliError::Io(_) => "CLI_IO_ERROR",
            CliError::Dataset(err) => err.code(),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}
