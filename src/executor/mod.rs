//! Query execution subsystem
//!
//! The engine consumes typed queries and produces deterministic rows.
//!
//! # Execution Flow (strict order)
//!
//! 1. Read the dataset's records
//! 2. Filter records by the WHERE tree
//! 3. Group and aggregate (if TRANSFORMATIONS was given)
//! 4. Project to COLUMNS
//! 5. Apply sort (if specified)
//! 6. Reject results above `MAX_RESULT_ROWS`
//!
//! # Invariants
//!
//! - Same query + same data = same rows
//! - Every output row has exactly the declared COLUMNS
//! - Oversized results fail; they are never truncated

mod executor;
mod filters;
mod grouping;
mod projector;
mod result;
mod sorter;

pub use executor::QueryEngine;
pub use filters::FilterEvaluator;
pub use grouping::{Aggregator, Grouper, Partition};
pub use projector::Projector;
pub use result::{ExecutionResult, ResultGuard, Row, MAX_RESULT_ROWS};
pub use sorter::ResultSorter;
