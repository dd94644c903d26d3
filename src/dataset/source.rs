//! Record access used during evaluation

use super::errors::DatasetResult;
use super::value::Record;

/// Trait for reading a dataset's records (read-only)
pub trait RecordSource {
    /// Returns every record of the dataset, in storage order
    fn records_of(&self, dataset_id: &str) -> DatasetResult<&[Record]>;
}
