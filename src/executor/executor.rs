//! Query engine
//!
//! Runs a typed query against the record source, producing rows in a
//! deterministic order.
//!
//! Execution flow (strict order):
//! 1. Read the dataset's records
//! 2. Keep records matching the filter
//! 3. Group and aggregate (if TRANSFORMATIONS was given)
//! 4. Project to the declared COLUMNS
//! 5. Sort (if ORDER was given)
//! 6. Reject oversized results

use serde_json::Value;
use tracing::info;

use crate::dataset::{Record, RecordSource};
use crate::query::{Query, QueryBuilder, QueryResult, QueryValidator};
use crate::schema::SchemaRegistry;

use super::filters::FilterEvaluator;
use super::grouping::Grouper;
use super::projector::Projector;
use super::result::{ExecutionResult, ResultGuard, Row};
use super::sorter::ResultSorter;

/// Evaluates queries against a set of loaded datasets
pub struct QueryEngine<'a, D: SchemaRegistry + RecordSource + ?Sized> {
    datasets: &'a D,
}

impl<'a, D: SchemaRegistry + RecordSource + ?Sized> QueryEngine<'a, D> {
    /// Creates an engine reading from `datasets`
    pub fn new(datasets: &'a D) -> Self {
        Self { datasets }
    }

    /// Validates, builds and executes a raw query.
    ///
    /// Returns the result rows, or the first error encountered. No partial
    /// result is ever returned.
    pub fn evaluate(&self, raw: &Value) -> QueryResult<Vec<Row>> {
        let validated = QueryValidator::new(self.datasets).validate(raw)?;
        let query = QueryBuilder::build(&validated)?;
        self.execute(&query).map(|result| result.rows)
    }

    /// Executes a typed query.
    ///
    /// This method is deterministic: same query + same data = same rows.
    pub fn execute(&self, query: &Query) -> QueryResult<ExecutionResult> {
        // Step 1: Read the dataset
        let records = self.datasets.records_of(&query.dataset_id)?;
        let scanned_count = records.len();

        // Step 2: Filter
        let matched: Vec<&Record> = records
            .iter()
            .filter(|record| FilterEvaluator::matches(query.filter.as_ref(), record))
            .collect();
        let matched_count = matched.len();

        // Steps 3-4: Group, then project
        let mut rows: Vec<Row> = match &query.group_columns {
            Some(group_columns) => {
                let transformations = query.transformations.as_deref().unwrap_or_default();
                Grouper::group(group_columns, transformations, matched)
                    .into_iter()
                    .map(|row| Projector::project_row(row, &query.columns))
                    .collect()
            }
            None => matched
                .into_iter()
                .map(|record| Projector::project_record(record, &query.columns))
                .collect(),
        };

        // Step 5: Sort
        if let Some(order) = &query.order {
            ResultSorter::sort(&mut rows, order);
        }

        // Step 6: Size guard
        ResultGuard::check(rows.len())?;

        info!(
            dataset = %query.dataset_id,
            scanned = scanned_count,
            matched = matched_count,
            returned = rows.len(),
            "query evaluated"
        );

        Ok(ExecutionResult {
            rows,
            scanned_count,
            matched_count,
        })
    }
}
