//! Primitive field values and flat records

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A flat record: unqualified field name to primitive value
pub type Record = HashMap<String, FieldValue>;

/// A primitive value: every record field is a number or a string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Returns the numeric value, if this is a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }

    /// Returns the string value, if this is a string
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Number(_) => None,
            FieldValue::Text(s) => Some(s),
        }
    }

    /// Natural ordering for sorting.
    ///
    /// Numbers compare numerically, strings lexicographically.
    /// A column never mixes types, but if it does numbers sort first.
    pub fn natural_cmp(&self, other: &FieldValue) -> Ordering {
        match (self, other) {
            (FieldValue::Number(a), FieldValue::Number(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
            (FieldValue::Number(_), FieldValue::Text(_)) => Ordering::Less,
            (FieldValue::Text(_), FieldValue::Number(_)) => Ordering::Greater,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n as f64)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_untagged() {
        let record: Record = serde_json::from_str(r#"{"dept": "cpsc", "avg": 80.5}"#).unwrap();
        assert_eq!(record["dept"], FieldValue::Text("cpsc".into()));
        assert_eq!(record["avg"], FieldValue::Number(80.5));
    }

    #[test]
    fn test_natural_ordering() {
        let one = FieldValue::from(1.0);
        let two = FieldValue::from(2.0);
        assert_eq!(one.natural_cmp(&two), Ordering::Less);

        let a = FieldValue::from("alice");
        let b = FieldValue::from("bob");
        assert_eq!(b.natural_cmp(&a), Ordering::Greater);
        assert_eq!(a.natural_cmp(&a.clone()), Ordering::Equal);
    }

    #[test]
    fn test_display_integral_number() {
        assert_eq!(FieldValue::from(310.0).to_string(), "310");
        assert_eq!(FieldValue::from(1.5).to_string(), "1.5");
        assert_eq!(FieldValue::from("abc").to_string(), "abc");
    }
}
