//! insight-query - A strict, schema-aware query engine over course and room datasets
//!
//! A JSON query names one dataset through its qualified keys (`courses_avg`,
//! `rooms_seats`), filters records with a boolean tree, optionally groups and
//! aggregates them, then projects and sorts the result.
//!
//! ```ignore
//! use insight_query::dataset::DatasetStore;
//! use insight_query::executor::QueryEngine;
//!
//! let store = DatasetStore::new();
//! let rows = QueryEngine::new(&store).evaluate(&query)?;
//! ```

pub mod cli;
pub mod dataset;
pub mod executor;
pub mod observability;
pub mod query;
pub mod schema;
