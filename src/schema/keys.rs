//! Qualified field keys: `<datasetId>_<field>`

use std::fmt;

/// A key of the form `<datasetId>_<field>`.
///
/// Parsing only checks shape. Whether the field exists for the
/// dataset's kind is the validator's job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedKey {
    /// Dataset id part (before the underscore)
    pub dataset_id: String,
    /// Unqualified field name (after the underscore)
    pub field: String,
}

impl QualifiedKey {
    pub fn new(dataset_id: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            dataset_id: dataset_id.into(),
            field: field.into(),
        }
    }

    /// Splits `raw` on its single underscore.
    ///
    /// Returns None unless there is exactly one underscore.
    pub fn parse(raw: &str) -> Option<Self> {
        let (dataset_id, field) = raw.split_once('_')?;
        if field.contains('_') {
            return None;
        }
        Some(Self::new(dataset_id, field))
    }
}

impl fmt::Display for QualifiedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.dataset_id, self.field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key() {
        let key = QualifiedKey::parse("courses_avg").unwrap();
        assert_eq!(key.dataset_id, "courses");
        assert_eq!(key.field, "avg");
        assert_eq!(key.to_string(), "courses_avg");
    }

    #[test]
    fn test_parse_rejects_wrong_underscore_count() {
        assert!(QualifiedKey::parse("coursesavg").is_none());
        assert!(QualifiedKey::parse("my_courses_avg").is_none());
    }

    #[test]
    fn test_parse_keeps_empty_parts() {
        // Shape only; blank ids are rejected later
        let key = QualifiedKey::parse("_avg").unwrap();
        assert_eq!(key.dataset_id, "");
    }
}
