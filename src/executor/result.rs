//! Result types for query execution

use std::collections::BTreeMap;

use tracing::warn;

use crate::dataset::FieldValue;
use crate::query::{QueryError, QueryResult};

/// Maximum rows a query may return
pub const MAX_RESULT_ROWS: usize = 5000;

/// One output row: column name to value
pub type Row = BTreeMap<String, FieldValue>;

/// Result of query execution
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    /// Rows in result order
    pub rows: Vec<Row>,
    /// Number of records read from the dataset
    pub scanned_count: usize,
    /// Number of records that passed the filter
    pub matched_count: usize,
}

impl ExecutionResult {
    /// Returns true if no rows were produced
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns an iterator over the rows
    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }
}

/// Rejects result sets above `MAX_RESULT_ROWS`. Never truncates.
pub struct ResultGuard;

impl ResultGuard {
    /// Checks a final row count against the cap
    pub fn check(rows: usize) -> QueryResult<()> {
        Self::check_with_limit(rows, MAX_RESULT_ROWS)
    }

    fn check_with_limit(rows: usize, limit: usize) -> QueryResult<()> {
        if rows > limit {
            warn!(rows, limit, "result too large");
            return Err(QueryError::ResultTooLarge { rows, limit });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_boundary() {
        assert!(ResultGuard::check(0).is_ok());
        assert!(ResultGuard::check(MAX_RESULT_ROWS).is_ok());
        assert_eq!(
            ResultGuard::check(MAX_RESULT_ROWS + 1),
            Err(QueryError::ResultTooLarge {
                rows: 5001,
                limit: 5000
            })
        );
    }

    #[test]
    fn test_execution_result_empty() {
        let result = ExecutionResult {
            rows: Vec::new(),
            scanned_count: 10,
            matched_count: 0,
        };
        assert!(result.is_empty());
        assert_eq!(result.len(), 0);
        assert_eq!(result.iter().count(), 0);
    }
}
