//! Dataset boundary for the query engine
//!
//! Records arrive already flat and schema-conformant: one mapping from
//! unqualified field name to a number or string per row. Ingestion
//! (archives, HTML scraping, geocoding) and persistence live outside
//! this crate; this module only holds what they produce.
//!
//! # Invariants
//!
//! - Dataset ids are non-blank and never contain an underscore
//! - Ids are unique within a store
//! - Records are read-only once added

mod errors;
mod source;
mod store;
mod value;

pub use errors::{DatasetError, DatasetResult};
pub use source::RecordSource;
pub use store::{is_valid_dataset_id, DatasetInfo, DatasetStore};
pub use value::{FieldValue, Record};
