//! Schema Registry subsystem
//!
//! Answers two questions for the query validator:
//!
//! 1. What kind is the dataset behind an id?
//! 2. Is a field valid for that kind, in a given role (numeric or string)?
//!
//! # Design Principles
//!
//! - Pure lookup: the registry never performs I/O
//! - Fixed field sets per kind, no dynamic schemas
//! - Dataset metadata is owned by the caller (see `dataset`)

mod errors;
mod keys;
mod registry;
mod types;

pub use errors::{SchemaError, SchemaResult};
pub use keys::QualifiedKey;
pub use registry::SchemaRegistry;
pub use types::{DatasetKind, FieldRole};
