//! Query subsystem
//!
//! Turns a raw JSON query into a typed `Query`, in two steps:
//!
//! 1. `QueryValidator` checks the raw query against the grammar and the
//!    schema of the single dataset it references
//! 2. `QueryBuilder` converts the validated query into `Query`
//!
//! # Wire shape
//!
//! ```text
//! { "WHERE": FILTER | {},
//!   "TRANSFORMATIONS"?: { "GROUP": [key], "APPLY": [{ name: { TOKEN: key } }] },
//!   "OPTIONS": { "COLUMNS": [column], "ORDER"?: column | { "dir": "UP"|"DOWN", "keys": [column] } } }
//!
//! FILTER := {LT|GT|EQ: {mkey: number}} | {IS: {skey: pattern}}
//!         | {AND|OR: [FILTER, ...]} | {NOT: FILTER}
//! ```
//!
//! # Invariants
//!
//! - All keys of a query reference one dataset id
//! - Grouped COLUMNS are GROUP keys or APPLY names; ungrouped COLUMNS are keys
//! - ORDER keys are a subset of COLUMNS
//! - APPLY names are unique per query

mod ast;
mod builder;
mod context;
mod errors;
mod pattern;
mod validator;

pub use ast::{
    ApplyToken, Column, CompareOp, FilterNode, Order, Query, SortDirection, Transformation,
};
pub use builder::QueryBuilder;
pub use context::{ResolvedDataset, ValidatedQuery, ValidationContext};
pub use errors::{QueryError, QueryResult};
pub use pattern::{is_valid_wildcard, WildcardPattern};
pub use validator::QueryValidator;
