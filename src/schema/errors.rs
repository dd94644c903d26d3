//! Schema registry error types

use thiserror::Error;

/// Result type for schema lookups
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Schema registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// No schema is registered for this dataset id
    #[error("Dataset '{0}' not found")]
    DatasetNotFound(String),
}

impl SchemaError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::DatasetNotFound(_) => "SCHEMA_DATASET_NOT_FOUND",
        }
    }
}
