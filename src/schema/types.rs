//! Dataset kinds and their fixed field sets
//!
//! Courses:
//! - numeric: avg, pass, fail, audit, year
//! - string: dept, id, instructor, title, uuid
//!
//! Rooms:
//! - numeric: lat, lon, seats
//! - string: fullname, shortname, number, name, address, type, furniture, href

use std::fmt;

use serde::{Deserialize, Serialize};

const COURSES_NUMERIC: &[&str] = &["avg", "pass", "fail", "audit", "year"];
const COURSES_STRING: &[&str] = &["dept", "id", "instructor", "title", "uuid"];

const ROOMS_NUMERIC: &[&str] = &["lat", "lon", "seats"];
const ROOMS_STRING: &[&str] = &[
    "fullname",
    "shortname",
    "number",
    "name",
    "address",
    "type",
    "furniture",
    "href",
];

/// The two supported dataset kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    #[serde(alias = "Courses", alias = "COURSES")]
    Courses,
    #[serde(alias = "Rooms", alias = "ROOMS")]
    Rooms,
}

/// Role a field plays in a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRole {
    /// mkey: compared with LT/GT/EQ, aggregated with MAX/MIN/AVG/SUM
    Numeric,
    /// skey: matched with IS
    String,
}

impl DatasetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::Courses => "courses",
            DatasetKind::Rooms => "rooms",
        }
    }

    /// Returns the field names valid for this kind in the given role
    pub fn fields(&self, role: FieldRole) -> &'static [&'static str] {
        match (self, role) {
            (DatasetKind::Courses, FieldRole::Numeric) => COURSES_NUMERIC,
            (DatasetKind::Courses, FieldRole::String) => COURSES_STRING,
            (DatasetKind::Rooms, FieldRole::Numeric) => ROOMS_NUMERIC,
            (DatasetKind::Rooms, FieldRole::String) => ROOMS_STRING,
        }
    }

    /// Checks whether `field` is valid for this kind in `role`
    pub fn is_valid_field(&self, field: &str, role: FieldRole) -> bool {
        self.fields(role).contains(&field)
    }

    /// Returns the role of `field`, or None if the kind has no such field
    pub fn role_of(&self, field: &str) -> Option<FieldRole> {
        [FieldRole::Numeric, FieldRole::String]
            .into_iter()
            .find(|role| self.is_valid_field(field, *role))
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_courses_fields() {
        let kind = DatasetKind::Courses;
        assert!(kind.is_valid_field("avg", FieldRole::Numeric));
        assert!(kind.is_valid_field("instructor", FieldRole::String));
        assert!(!kind.is_valid_field("avg", FieldRole::String));
        assert!(!kind.is_valid_field("seats", FieldRole::Numeric));
    }

    #[test]
    fn test_rooms_fields() {
        let kind = DatasetKind::Rooms;
        assert!(kind.is_valid_field("seats", FieldRole::Numeric));
        assert!(kind.is_valid_field("furniture", FieldRole::String));
        assert!(!kind.is_valid_field("dept", FieldRole::String));
    }

    #[test]
    fn test_role_of() {
        assert_eq!(DatasetKind::Rooms.role_of("lat"), Some(FieldRole::Numeric));
        assert_eq!(DatasetKind::Rooms.role_of("href"), Some(FieldRole::String));
        assert_eq!(DatasetKind::Courses.role_of("href"), None);
    }

    #[test]
    fn test_kind_deserialize_any_case() {
        let kind: DatasetKind = serde_json::from_str("\"Rooms\"").unwrap();
        assert_eq!(kind, DatasetKind::Rooms);
        let kind: DatasetKind = serde_json::from_str("\"courses\"").unwrap();
        assert_eq!(kind, DatasetKind::Courses);
    }
}
