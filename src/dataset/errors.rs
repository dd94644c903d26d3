//! Dataset error types

use thiserror::Error;

/// Result type for dataset operations
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Dataset store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatasetError {
    /// No dataset with this id exists
    #[error("Dataset '{0}' does not exist")]
    NotFound(String),

    /// Id is blank or contains an underscore
    #[error("Invalid dataset id '{0}': must be non-blank and contain no underscore")]
    InvalidId(String),

    /// A dataset with this id has already been added
    #[error("Dataset '{0}' already exists")]
    AlreadyExists(String),

    /// Seed records could not be read
    #[error("Failed to load dataset from '{path}': {reason}")]
    Load { path: String, reason: String },
}

impl DatasetError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            DatasetError::NotFound(_) => "DATASET_NOT_FOUND",
            DatasetError::InvalidId(_) => "DATASET_INVALID_ID",
            DatasetError::AlreadyExists(_) => "DATASET_ALREADY_EXISTS",
            DatasetError::Load { .. } => "DATASET_LOAD_FAILED",
        }
    }

    /// Create a load error
    pub fn load(path: impl Into<String>, reason: impl Into<String>) -> Self {
        DatasetError::Load {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
