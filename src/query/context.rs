//! Per-validation state
//!
//! One context per validation pass. It is threaded through every
//! validation call as `&mut` and handed to the builder afterwards; it is
//! never shared between queries.

use serde_json::Value;

use crate::schema::{DatasetKind, QualifiedKey};

use super::ast::Column;

/// The dataset fixed by the first qualified key of a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDataset {
    pub id: String,
    pub kind: DatasetKind,
}

/// State accumulated while validating one query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationContext {
    dataset: Option<ResolvedDataset>,
    apply_keys: Vec<String>,
    group_keys: Vec<QualifiedKey>,
    columns: Vec<Column>,
}

impl ValidationContext {
    /// Creates an empty context: no dataset, no keys
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the resolved dataset, if a key has been seen
    pub fn dataset(&self) -> Option<&ResolvedDataset> {
        self.dataset.as_ref()
    }

    /// Fixes the dataset for the rest of the pass
    pub(crate) fn resolve_dataset(&mut self, id: impl Into<String>, kind: DatasetKind) {
        self.dataset = Some(ResolvedDataset {
            id: id.into(),
            kind,
        });
    }

    /// Returns the APPLY output names, in declaration order
    pub fn apply_keys(&self) -> &[String] {
        &self.apply_keys
    }

    /// Checks if an APPLY output name has been declared
    pub fn has_apply_key(&self, name: &str) -> bool {
        self.apply_keys.iter().any(|k| k == name)
    }

    /// Records an APPLY output name. Returns false if it was already declared.
    pub(crate) fn declare_apply_key(&mut self, name: &str) -> bool {
        if self.has_apply_key(name) {
            return false;
        }
        self.apply_keys.push(name.to_string());
        true
    }

    /// Returns the GROUP keys
    pub fn group_keys(&self) -> &[QualifiedKey] {
        &self.group_keys
    }

    /// Finds a GROUP key by its qualified name
    pub fn group_key(&self, name: &str) -> Option<&QualifiedKey> {
        self.group_keys.iter().find(|k| k.to_string() == name)
    }

    pub(crate) fn set_group_keys(&mut self, keys: Vec<QualifiedKey>) {
        self.group_keys = keys;
    }

    /// Grouping is active once a non-empty GROUP has been accepted
    pub fn is_grouping(&self) -> bool {
        !self.group_keys.is_empty()
    }

    /// Returns the accepted COLUMNS
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Checks if a name is one of the accepted COLUMNS
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name() == name)
    }

    pub(crate) fn set_columns(&mut self, columns: Vec<Column>) {
        self.columns = columns;
    }
}

/// A raw query that passed validation, with the state it produced
#[derive(Debug, Clone)]
pub struct ValidatedQuery<'q> {
    raw: &'q Value,
    context: ValidationContext,
}

impl<'q> ValidatedQuery<'q> {
    pub(crate) fn new(raw: &'q Value, context: ValidationContext) -> Self {
        Self { raw, context }
    }

    /// Returns the raw query
    pub fn raw(&self) -> &'q Value {
        self.raw
    }

    /// Returns the validation state
    pub fn context(&self) -> &ValidationContext {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_keys_unique() {
        let mut ctx = ValidationContext::new();
        assert!(ctx.declare_apply_key("total"));
        assert!(!ctx.declare_apply_key("total"));
        assert!(ctx.declare_apply_key("avgGrade"));
        assert_eq!(ctx.apply_keys(), &["total".to_string(), "avgGrade".to_string()]);
    }

    #[test]
    fn test_grouping_needs_keys() {
        let mut ctx = ValidationContext::new();
        assert!(!ctx.is_grouping());

        ctx.set_group_keys(vec![QualifiedKey::new("courses", "dept")]);
        assert!(ctx.is_grouping());
        assert!(ctx.group_key("courses_dept").is_some());
        assert!(ctx.group_key("courses_avg").is_none());
    }

    #[test]
    fn test_fresh_context_has_no_dataset() {
        let mut ctx = ValidationContext::new();
        assert!(ctx.dataset().is_none());

        ctx.resolve_dataset("rooms", DatasetKind::Rooms);
        assert_eq!(ctx.dataset().map(|d| d.kind), Some(DatasetKind::Rooms));
    }
}
