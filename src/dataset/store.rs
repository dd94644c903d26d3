//! In-memory dataset store
//!
//! Holds the flat records produced by ingestion, keyed by dataset id,
//! and answers the two boundary lookups the engine needs:
//! `kind_of` (via `SchemaRegistry`) and `records_of` (via `RecordSource`).

use serde::Serialize;
use tracing::debug;

use crate::schema::{DatasetKind, SchemaError, SchemaRegistry, SchemaResult};

use super::errors::{DatasetError, DatasetResult};
use super::source::RecordSource;
use super::value::Record;

/// Summary of one stored dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetInfo {
    pub id: String,
    pub kind: DatasetKind,
    #[serde(rename = "numRows")]
    pub num_rows: usize,
}

#[derive(Debug)]
struct Dataset {
    info: DatasetInfo,
    records: Vec<Record>,
}

/// Dataset store kept in insertion order
#[derive(Debug, Default)]
pub struct DatasetStore {
    datasets: Vec<Dataset>,
}

/// Checks that a dataset id is non-blank and has no underscore
pub fn is_valid_dataset_id(id: &str) -> bool {
    !id.trim().is_empty() && !id.contains('_')
}

impl DatasetStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a dataset and returns the ids of all stored datasets.
    ///
    /// # Errors
    ///
    /// - `InvalidId` if the id is blank or contains an underscore
    /// - `AlreadyExists` if the id is taken
    pub fn add(
        &mut self,
        id: &str,
        kind: DatasetKind,
        records: Vec<Record>,
    ) -> DatasetResult<Vec<String>> {
        if !is_valid_dataset_id(id) {
            return Err(DatasetError::InvalidId(id.to_string()));
        }
        if self.find(id).is_some() {
            return Err(DatasetError::AlreadyExists(id.to_string()));
        }

        debug!(dataset = id, kind = %kind, rows = records.len(), "dataset added");

        self.datasets.push(Dataset {
            info: DatasetInfo {
                id: id.to_string(),
                kind,
                num_rows: records.len(),
            },
            records,
        });

        Ok(self.ids())
    }

    /// Removes a dataset and returns its id.
    ///
    /// # Errors
    ///
    /// - `InvalidId` if the id is blank or contains an underscore
    /// - `NotFound` if no dataset has this id
    pub fn remove(&mut self, id: &str) -> DatasetResult<String> {
        if !is_valid_dataset_id(id) {
            return Err(DatasetError::InvalidId(id.to_string()));
        }

        let position = self
            .datasets
            .iter()
            .position(|d| d.info.id == id)
            .ok_or_else(|| DatasetError::NotFound(id.to_string()))?;

        self.datasets.remove(position);
        debug!(dataset = id, "dataset removed");

        Ok(id.to_string())
    }

    /// Lists all stored datasets
    pub fn list(&self) -> Vec<DatasetInfo> {
        self.datasets.iter().map(|d| d.info.clone()).collect()
    }

    /// Returns the ids of all stored datasets
    pub fn ids(&self) -> Vec<String> {
        self.datasets.iter().map(|d| d.info.id.clone()).collect()
    }

    /// Checks if a dataset with this id exists
    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Returns the number of stored datasets
    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    /// Returns true if no datasets are stored
    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    fn find(&self, id: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.info.id == id)
    }
}

impl SchemaRegistry for DatasetStore {
    fn kind_of(&self, dataset_id: &str) -> SchemaResult<DatasetKind> {
        self.find(dataset_id)
            .map(|d| d.info.kind)
            .ok_or_else(|| SchemaError::DatasetNotFound(dataset_id.to_string()))
    }
}

impl RecordSource for DatasetStore {
    fn records_of(&self, dataset_id: &str) -> DatasetResult<&[Record]> {
        self.find(dataset_id)
            .map(|d| d.records.as_slice())
            .ok_or_else(|| DatasetError::NotFound(dataset_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::FieldValue;

    fn section(dept: &str, avg: f64) -> Record {
        let mut record = Record::new();
        record.insert("dept".into(), FieldValue::from(dept));
        record.insert("avg".into(), FieldValue::from(avg));
        record
    }

    #[test]
    fn test_add_and_lookup() {
        let mut store = DatasetStore::new();
        let ids = store
            .add("courses", DatasetKind::Courses, vec![section("cpsc", 80.0)])
            .unwrap();

        assert_eq!(ids, vec!["courses".to_string()]);
        assert_eq!(store.kind_of("courses").unwrap(), DatasetKind::Courses);
        assert_eq!(store.records_of("courses").unwrap().len(), 1);
    }

    #[test]
    fn test_add_rejects_bad_ids() {
        let mut store = DatasetStore::new();
        assert_eq!(
            store.add("my_courses", DatasetKind::Courses, vec![]),
            Err(DatasetError::InvalidId("my_courses".into()))
        );
        assert_eq!(
            store.add("   ", DatasetKind::Courses, vec![]),
            Err(DatasetError::InvalidId("   ".into()))
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_rejects_duplicate() {
        let mut store = DatasetStore::new();
        store.add("rooms", DatasetKind::Rooms, vec![]).unwrap();
        assert_eq!(
            store.add("rooms", DatasetKind::Courses, vec![]),
            Err(DatasetError::AlreadyExists("rooms".into()))
        );
        assert_eq!(store.kind_of("rooms").unwrap(), DatasetKind::Rooms);
    }

    #[test]
    fn test_remove() {
        let mut store = DatasetStore::new();
        store.add("a", DatasetKind::Courses, vec![]).unwrap();
        store.add("b", DatasetKind::Rooms, vec![]).unwrap();

        assert_eq!(store.remove("a").unwrap(), "a");
        assert_eq!(store.ids(), vec!["b".to_string()]);
        assert_eq!(store.remove("a"), Err(DatasetError::NotFound("a".into())));
        assert_eq!(store.remove("a_b"), Err(DatasetError::InvalidId("a_b".into())));
    }

    #[test]
    fn test_list_reports_row_counts() {
        let mut store = DatasetStore::new();
        store
            .add(
                "courses",
                DatasetKind::Courses,
                vec![section("cpsc", 80.0), section("math", 70.0)],
            )
            .unwrap();

        let list = store.list();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].num_rows, 2);
        assert_eq!(list[0].kind, DatasetKind::Courses);
    }

    #[test]
    fn test_missing_dataset_lookups() {
        let store = DatasetStore::new();
        assert_eq!(
            store.kind_of("nope"),
            Err(SchemaError::DatasetNotFound("nope".into()))
        );
        assert!(store.records_of("nope").is_err());
        assert!(!store.dataset_exists("nope"));
    }
}
