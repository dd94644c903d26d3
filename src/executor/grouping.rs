//! Grouping and aggregation
//!
//! Partitions filtered records by the tuple of their GROUP values, then
//! computes every APPLY rule once per partition.
//!
//! Partition identity is a composite key built from the GROUP column
//! list in declared order, so distinct tuples never collide and the
//! result does not depend on record field order. Partitions are emitted
//! in first-seen order.
//!
//! AVG and SUM accumulate in `rust_decimal::Decimal` and round half away
//! from zero to 2 places.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::dataset::{FieldValue, Record};
use crate::query::{ApplyToken, Transformation};
use crate::schema::QualifiedKey;

use super::result::Row;

/// Decimal places kept by AVG and SUM
const ROUND_DP: u32 = 2;

/// Hashable identity of a field value.
///
/// Numbers hash by bit pattern with `-0.0` folded into `0.0`, so equal
/// numbers share a key. A number never equals a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ValueKey {
    Number(u64),
    Text(String),
}

impl From<&FieldValue> for ValueKey {
    fn from(value: &FieldValue) -> Self {
        match value {
            FieldValue::Number(n) => {
                let n = if *n == 0.0 { 0.0 } else { *n };
                ValueKey::Number(n.to_bits())
            }
            FieldValue::Text(s) => ValueKey::Text(s.clone()),
        }
    }
}

/// One entry per GROUP column, in declared order. A missing field is its own value.
type GroupKey = Vec<Option<ValueKey>>;

/// Records sharing one group key tuple
#[derive(Debug)]
pub struct Partition<'r> {
    /// GROUP values, aligned with the GROUP columns
    pub values: Vec<Option<FieldValue>>,
    /// Member records, in input order
    pub records: Vec<&'r Record>,
}

/// Partitions records and computes aggregates
pub struct Grouper;

impl Grouper {
    /// Groups records and aggregates each group into one row
    pub fn group<'r>(
        group_columns: &[QualifiedKey],
        transformations: &[Transformation],
        records: impl IntoIterator<Item = &'r Record>,
    ) -> Vec<Row> {
        Self::partition(group_columns, records)
            .iter()
            .map(|partition| Self::aggregate_partition(group_columns, transformations, partition))
            .collect()
    }

    /// Splits records into partitions by their GROUP value tuple
    pub fn partition<'r>(
        group_columns: &[QualifiedKey],
        records: impl IntoIterator<Item = &'r Record>,
    ) -> Vec<Partition<'r>> {
        let mut index: HashMap<GroupKey, usize> = HashMap::new();
        let mut partitions: Vec<Partition<'r>> = Vec::new();

        for record in records {
            let values: Vec<Option<&FieldValue>> = group_columns
                .iter()
                .map(|column| record.get(&column.field))
                .collect();
            let key: GroupKey = values.iter().map(|v| v.map(ValueKey::from)).collect();

            match index.get(&key) {
                Some(&position) => partitions[position].records.push(record),
                None => {
                    index.insert(key, partitions.len());
                    partitions.push(Partition {
                        values: values.into_iter().map(|v| v.cloned()).collect(),
                        records: vec![record],
                    });
                }
            }
        }

        partitions
    }

    fn aggregate_partition(
        group_columns: &[QualifiedKey],
        transformations: &[Transformation],
        partition: &Partition<'_>,
    ) -> Row {
        let mut row = Row::new();

        for (column, value) in group_columns.iter().zip(&partition.values) {
            if let Some(value) = value {
                row.insert(column.to_string(), value.clone());
            }
        }

        for transformation in transformations {
            let value = Aggregator::apply(transformation, &partition.records);
            row.insert(transformation.output.clone(), value);
        }

        row
    }
}

/// Computes one APPLY rule over a partition
pub struct Aggregator;

impl Aggregator {
    /// Applies a transformation to the records of one partition
    pub fn apply(transformation: &Transformation, records: &[&Record]) -> FieldValue {
        let field = transformation.source.field.as_str();

        let result = match transformation.token {
            ApplyToken::Max => Self::max(numbers(records, field)),
            ApplyToken::Min => Self::min(numbers(records, field)),
            ApplyToken::Sum => Self::sum(numbers(records, field)),
            ApplyToken::Avg => Self::avg(numbers(records, field), records.len()),
            ApplyToken::Count => Self::count_distinct(records, field) as f64,
        };

        FieldValue::Number(result)
    }

    fn max(values: impl Iterator<Item = f64>) -> f64 {
        values.fold(f64::NEG_INFINITY, f64::max)
    }

    fn min(values: impl Iterator<Item = f64>) -> f64 {
        values.fold(f64::INFINITY, f64::min)
    }

    fn sum(values: impl Iterator<Item = f64>) -> f64 {
        let values: Vec<f64> = values.collect();
        decimal_sum(&values)
            .and_then(round)
            .unwrap_or_else(|| round_f64(values.iter().sum()))
    }

    fn avg(values: impl Iterator<Item = f64>, count: usize) -> f64 {
        if count == 0 {
            return 0.0;
        }

        let values: Vec<f64> = values.collect();
        decimal_sum(&values)
            .and_then(|total| total.checked_div(Decimal::from(count)))
            .and_then(round)
            .unwrap_or_else(|| round_f64(values.iter().sum::<f64>() / count as f64))
    }

    /// Number of distinct values, not rows
    fn count_distinct(records: &[&Record], field: &str) -> usize {
        records
            .iter()
            .filter_map(|record| record.get(field))
            .map(ValueKey::from)
            .collect::<HashSet<_>>()
            .len()
    }
}

fn numbers<'a>(records: &'a [&'a Record], field: &'a str) -> impl Iterator<Item = f64> + 'a {
    records
        .iter()
        .filter_map(move |record| record.get(field).and_then(FieldValue::as_number))
}

/// Converts through the shortest decimal rendering, so `0.1` is exactly `0.1`
fn to_decimal(value: f64) -> Option<Decimal> {
    Decimal::from_str(&value.to_string())
        .ok()
        .or_else(|| Decimal::from_f64(value))
}

/// Exact decimal sum, or None if a value is not representable
fn decimal_sum(values: &[f64]) -> Option<Decimal> {
    values
        .iter()
        .try_fold(Decimal::ZERO, |total, &v| total.checked_add(to_decimal(v)?))
}

/// Parses the rounded decimal text, so `1.67` lands on the nearest f64
fn round(value: Decimal) -> Option<f64> {
    value
        .round_dp_with_strategy(ROUND_DP, RoundingStrategy::MidpointAwayFromZero)
        .to_string()
        .parse()
        .ok()
}

fn round_f64(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(dept: &str, instructor: &str, avg: f64) -> Record {
        let mut record = Record::new();
        record.insert("dept".into(), FieldValue::from(dept));
        record.insert("instructor".into(), FieldValue::from(instructor));
        record.insert("avg".into(), FieldValue::from(avg));
        record
    }

    fn key(field: &str) -> QualifiedKey {
        QualifiedKey::new("courses", field)
    }

    fn apply(token: ApplyToken, field: &str, records: &[Record]) -> FieldValue {
        let refs: Vec<&Record> = records.iter().collect();
        Aggregator::apply(&Transformation::new(token, key(field), "out"), &refs)
    }

    fn avg_of(values: &[f64]) -> FieldValue {
        let records: Vec<Record> = values.iter().map(|v| section("d", "i", *v)).collect();
        apply(ApplyToken::Avg, "avg", &records)
    }

    #[test]
    fn test_partition_by_single_column() {
        let records = vec![
            section("cpsc", "a", 80.0),
            section("math", "b", 70.0),
            section("cpsc", "c", 90.0),
        ];
        let partitions = Grouper::partition(&[key("dept")], &records);

        assert_eq!(partitions.len(), 2);
        assert_eq!(partitions[0].values, vec![Some(FieldValue::from("cpsc"))]);
        assert_eq!(partitions[0].records.len(), 2);
        assert_eq!(partitions[1].records.len(), 1);
    }

    #[test]
    fn test_partition_tuples_do_not_collide() {
        // Naive concatenation would merge ("ab","c") and ("a","bc")
        let mut first = Record::new();
        first.insert("dept".into(), FieldValue::from("ab"));
        first.insert("id".into(), FieldValue::from("c"));
        let mut second = Record::new();
        second.insert("dept".into(), FieldValue::from("a"));
        second.insert("id".into(), FieldValue::from("bc"));

        let records = vec![first, second];
        let partitions = Grouper::partition(&[key("dept"), key("id")], &records);
        assert_eq!(partitions.len(), 2);
    }

    #[test]
    fn test_number_and_string_groups_differ() {
        let mut first = Record::new();
        first.insert("id".into(), FieldValue::from("110"));
        let mut second = Record::new();
        second.insert("id".into(), FieldValue::from(110.0));

        let records = vec![first, second];
        assert_eq!(Grouper::partition(&[key("id")], &records).len(), 2);
    }

    #[test]
    fn test_group_sum_end_to_end() {
        let records = vec![
            section("cpsc", "a", 80.0),
            section("cpsc", "b", 90.0),
            section("math", "c", 70.0),
        ];
        let rows = Grouper::group(
            &[key("dept")],
            &[Transformation::new(ApplyToken::Sum, key("avg"), "total")],
            &records,
        );

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["courses_dept"], FieldValue::from("cpsc"));
        assert_eq!(rows[0]["total"], FieldValue::from(170.0));
        assert_eq!(rows[1]["courses_dept"], FieldValue::from("math"));
        assert_eq!(rows[1]["total"], FieldValue::from(70.0));
    }

    #[test]
    fn test_count_is_distinct() {
        let records = vec![
            section("cpsc", "smith", 80.0),
            section("cpsc", "smith", 85.0),
            section("cpsc", "jones", 90.0),
        ];
        assert_eq!(apply(ApplyToken::Count, "instructor", &records), FieldValue::from(2.0));
        assert_eq!(apply(ApplyToken::Count, "avg", &records), FieldValue::from(3.0));
    }

    #[test]
    fn test_max_min() {
        let records = vec![
            section("cpsc", "a", 80.0),
            section("cpsc", "b", 95.5),
            section("cpsc", "c", 61.25),
        ];
        assert_eq!(apply(ApplyToken::Max, "avg", &records), FieldValue::from(95.5));
        assert_eq!(apply(ApplyToken::Min, "avg", &records), FieldValue::from(61.25));
    }

    #[test]
    fn test_avg_simple() {
        assert_eq!(avg_of(&[1.0, 2.0]), FieldValue::from(1.5));
        assert_eq!(avg_of(&[1.0, 2.0, 2.0]), FieldValue::from(1.67));
    }

    #[test]
    fn test_avg_without_float_drift() {
        // 0.1 summed ten times in f64 is 0.9999999999999999
        let values = vec![0.1; 10];
        assert_eq!(avg_of(&values), FieldValue::from(0.1));

        // Binary accumulation would give 1.0049999999999999 / 1 -> 1.0
        assert_eq!(avg_of(&[1.005]), FieldValue::from(1.01));
    }

    #[test]
    fn test_sum_rounds_to_two_places() {
        let records: Vec<Record> = [0.1, 0.2, 0.004]
            .iter()
            .map(|v| section("d", "i", *v))
            .collect();
        assert_eq!(apply(ApplyToken::Sum, "avg", &records), FieldValue::from(0.3));

        let records: Vec<Record> = vec![section("d", "i", 0.125)];
        assert_eq!(apply(ApplyToken::Sum, "avg", &records), FieldValue::from(0.13));
    }

    #[test]
    fn test_negative_zero_counts_once() {
        let mut first = Record::new();
        first.insert("avg".into(), FieldValue::from(0.0));
        let mut second = Record::new();
        second.insert("avg".into(), FieldValue::from(-0.0));

        let records = vec![first, second];
        assert_eq!(apply(ApplyToken::Count, "avg", &records), FieldValue::from(1.0));
    }
}
