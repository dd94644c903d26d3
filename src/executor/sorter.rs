//! Result sorting for query execution
//!
//! Multi-key, stable, deterministic.

use std::cmp::Ordering;

use crate::dataset::FieldValue;
use crate::query::{Order, SortDirection};

use super::result::Row;

/// Sorts result rows
pub struct ResultSorter;

impl ResultSorter {
    /// Sorts rows by the ORDER keys.
    ///
    /// The first key on which two rows differ decides; rows equal on
    /// every key keep their input order.
    pub fn sort(rows: &mut [Row], order: &Order) {
        rows.sort_by(|a, b| {
            let ordering = Self::compare_rows(a, b, &order.keys);
            match order.direction {
                SortDirection::Up => ordering,
                SortDirection::Down => ordering.reverse(),
            }
        });
    }

    fn compare_rows(a: &Row, b: &Row, keys: &[String]) -> Ordering {
        keys.iter()
            .map(|key| Self::compare_values(a.get(key), b.get(key)))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    /// Missing values sort before present ones
    fn compare_values(a: Option<&FieldValue>, b: Option<&FieldValue>) -> Ordering {
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) => a.natural_cmp(b),
        }
    }
}
