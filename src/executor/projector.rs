//! Column projection
//!
//! Keeps exactly the declared output columns of each row.

use crate::dataset::Record;
use crate::query::Column;

use super::result::Row;

/// Selects declared columns from records and aggregated rows
pub struct Projector;

impl Projector {
    /// Projects a filtered record. Field columns are renamed to their
    /// qualified key; aggregate columns cannot come from a record.
    pub fn project_record(record: &Record, columns: &[Column]) -> Row {
        columns
            .iter()
            .filter_map(|column| match column {
                Column::Field(key) => record
                    .get(&key.field)
                    .map(|value| (key.to_string(), value.clone())),
                Column::Aggregate(_) => None,
            })
            .collect()
    }

    /// Projects an aggregated group row
    pub fn project_row(mut row: Row, columns: &[Column]) -> Row {
        columns
            .iter()
            .filter_map(|column| {
                let name = column.name();
                row.remove(&name).map(|value| (name, value))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::FieldValue;
    use crate::schema::QualifiedKey;

    #[test]
    fn test_project_record_qualifies_and_drops() {
        let mut record = Record::new();
        record.insert("dept".into(), FieldValue::from("cpsc"));
        record.insert("avg".into(), FieldValue::from(80.0));
        record.insert("title".into(), FieldValue::from("intro"));

        let columns = vec![
            Column::Field(QualifiedKey::new("courses", "dept")),
            Column::Field(QualifiedKey::new("courses", "avg")),
        ];
        let row = Projector::project_record(&record, &columns);

        assert_eq!(row.len(), 2);
        assert_eq!(row["courses_dept"], FieldValue::from("cpsc"));
        assert_eq!(row["courses_avg"], FieldValue::from(80.0));
    }

    #[test]
    fn test_project_row_keeps_declared_only() {
        let mut row = Row::new();
        row.insert("courses_dept".into(), FieldValue::from("cpsc"));
        row.insert("courses_year".into(), FieldValue::from(2015.0));
        row.insert("total".into(), FieldValue::from(170.0));

        let columns = vec![
            Column::Aggregate("total".into()),
            Column::Field(QualifiedKey::new("courses", "dept")),
        ];
        let projected = Projector::project_row(row, &columns);

        assert_eq!(projected.len(), 2);
        assert!(projected.contains_key("total"));
        assert!(projected.contains_key("courses_dept"));
        assert!(!projected.contains_key("courses_year"));
    }
}
