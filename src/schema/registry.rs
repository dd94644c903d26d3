//! Read-only schema lookup used during validation

use super::errors::SchemaResult;
use super::types::DatasetKind;

/// Schema registry trait for the validator (read-only)
pub trait SchemaRegistry {
    /// Returns the kind of the dataset with the given id
    fn kind_of(&self, dataset_id: &str) -> SchemaResult<DatasetKind>;

    /// Checks if a dataset with the given id is registered
    fn dataset_exists(&self, dataset_id: &str) -> bool {
        self.kind_of(dataset_id).is_ok()
    }
}
