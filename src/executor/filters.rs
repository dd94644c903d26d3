//! Filter evaluation for query execution
//!
//! Walks the typed filter tree against one record. No shared state,
//! no type coercion beyond rendering numbers for IS.

use crate::dataset::{FieldValue, Record};
use crate::query::{CompareOp, FilterNode, WildcardPattern};

/// Evaluates filter trees against records
pub struct FilterEvaluator;

impl FilterEvaluator {
    /// Checks a record against an optional filter. No filter matches everything.
    pub fn matches(filter: Option<&FilterNode>, record: &Record) -> bool {
        filter.map_or(true, |node| Self::evaluate(node, record))
    }

    /// Evaluates one node against a record
    pub fn evaluate(node: &FilterNode, record: &Record) -> bool {
        match node {
            FilterNode::And(children) => children.iter().all(|c| Self::evaluate(c, record)),
            FilterNode::Or(children) => children.iter().any(|c| Self::evaluate(c, record)),
            FilterNode::Not(child) => !Self::evaluate(child, record),
            FilterNode::Compare { op, key, threshold } => record
                .get(&key.field)
                .and_then(FieldValue::as_number)
                .map_or(false, |value| Self::compare(*op, value, *threshold)),
            FilterNode::Match { key, pattern } => record
                .get(&key.field)
                .map_or(false, |value| Self::match_value(pattern, value)),
        }
    }

    /// Strict numeric comparison
    fn compare(op: CompareOp, value: f64, threshold: f64) -> bool {
        match op {
            CompareOp::Lt => value < threshold,
            CompareOp::Gt => value > threshold,
            CompareOp::Eq => value == threshold,
        }
    }

    fn match_value(pattern: &WildcardPattern, value: &FieldValue) -> bool {
        match value {
            FieldValue::Text(s) => pattern.is_match(s),
            FieldValue::Number(_) => pattern.is_match(&value.to_string()),
        }
    }
}
