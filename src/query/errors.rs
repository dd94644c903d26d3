//! Query error types
//!
//! Error codes:
//! - QUERY_INVALID (REJECT)
//! - QUERY_DATASET_NOT_FOUND (REJECT, reported as an invalid query)
//! - QUERY_RESULT_TOO_LARGE (REJECT)

use thiserror::Error;

use crate::dataset::DatasetError;
use crate::schema::SchemaError;

/// Result type for query validation and evaluation
pub type QueryResult<T> = Result<T, QueryError>;

/// Everything a caller of `evaluate` can see besides rows
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Structural or semantic violation
    #[error("Invalid query: {reason}")]
    InvalidQuery { reason: String },

    /// A qualified key names a dataset with no registered schema
    #[error("Invalid query: dataset '{id}' not found")]
    DatasetNotFound { id: String },

    /// Projected rows exceed the result cap
    #[error("Result too large: {rows} rows exceeds maximum of {limit}")]
    ResultTooLarge { rows: usize, limit: usize },
}

impl QueryError {
    /// Create an invalid query error
    pub fn invalid(reason: impl Into<String>) -> Self {
        QueryError::InvalidQuery {
            reason: reason.into(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::InvalidQuery { .. } => "QUERY_INVALID",
            QueryError::DatasetNotFound { .. } => "QUERY_DATASET_NOT_FOUND",
            QueryError::ResultTooLarge { .. } => "QUERY_RESULT_TOO_LARGE",
        }
    }

    /// True for every rejection raised before evaluation.
    ///
    /// A missing dataset counts as an invalid query.
    pub fn is_invalid_query(&self) -> bool {
        matches!(
            self,
            QueryError::InvalidQuery { .. } | QueryError::DatasetNotFound { .. }
        )
    }

    /// True if the result guard rejected the query
    pub fn is_result_too_large(&self) -> bool {
        matches!(self, QueryError::ResultTooLarge { .. })
    }
}

impl From<SchemaError> for QueryError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::DatasetNotFound(id) => QueryError::DatasetNotFound { id },
        }
    }
}

impl From<DatasetError> for QueryError {
    fn from(err: DatasetError) -> Self {
        match err {
            DatasetError::NotFound(id) => QueryError::DatasetNotFound { id },
            other => QueryError::invalid(other.to_string()),
        }
    }
}
