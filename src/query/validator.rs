//! Query validator
//!
//! Checks a raw JSON query against the query grammar and the schema of
//! the one dataset it references. Validation order is fixed:
//!
//! 1. WHERE
//! 2. TRANSFORMATIONS (if present)
//! 3. OPTIONS
//!
//! OPTIONS depends on the GROUP and APPLY keys resolved in step 2, and
//! the dataset id is resolved lazily by the first qualified key seen.
//! Any violation rejects the whole query.

use serde_json::{Map, Value};
use tracing::debug;

use crate::schema::{FieldRole, QualifiedKey, SchemaRegistry};

use super::ast::{ApplyToken, Column, SortDirection};
use super::context::{ValidatedQuery, ValidationContext};
use super::errors::{QueryError, QueryResult};
use super::pattern::is_valid_wildcard;

type Object = Map<String, Value>;

/// Validates raw queries against a schema registry.
///
/// The validator itself holds no per-query state: each call to
/// `validate` creates its own `ValidationContext`.
pub struct QueryValidator<'a, S: SchemaRegistry + ?Sized> {
    registry: &'a S,
}

impl<'a, S: SchemaRegistry + ?Sized> QueryValidator<'a, S> {
    /// Creates a validator backed by the given registry
    pub fn new(registry: &'a S) -> Self {
        Self { registry }
    }

    /// Validates a raw query.
    ///
    /// # Errors
    ///
    /// - `DatasetNotFound` if the first qualified key names an unknown dataset
    /// - `InvalidQuery` for every other violation
    pub fn validate<'q>(&self, raw: &'q Value) -> QueryResult<ValidatedQuery<'q>> {
        let mut ctx = ValidationContext::new();

        match self.check_query(raw, &mut ctx) {
            Ok(()) => {
                if let Some(dataset) = ctx.dataset() {
                    debug!(dataset = %dataset.id, kind = %dataset.kind, "query validated");
                }
                Ok(ValidatedQuery::new(raw, ctx))
            }
            Err(err) => {
                debug!(code = err.code(), reason = %err, "query rejected");
                Err(err)
            }
        }
    }

    /// Returns the boolean verdict only
    pub fn is_valid(&self, raw: &Value) -> bool {
        self.validate(raw).is_ok()
    }

    fn check_query(&self, raw: &Value, ctx: &mut ValidationContext) -> QueryResult<()> {
        let query = as_object(raw, "Query")?;

        match query.len() {
            2 => {
                self.check_body(section(query, "WHERE")?, ctx)?;
                self.check_options(section(query, "OPTIONS")?, ctx)
            }
            3 => {
                self.check_body(section(query, "WHERE")?, ctx)?;
                self.check_transformations(section(query, "TRANSFORMATIONS")?, ctx)?;
                self.check_options(section(query, "OPTIONS")?, ctx)
            }
            n => Err(QueryError::invalid(format!(
                "Query must have 2 or 3 top-level keys, found {}",
                n
            ))),
        }
    }

    // =========================================================================
    // WHERE
    // =========================================================================

    fn check_body(&self, body: &Value, ctx: &mut ValidationContext) -> QueryResult<()> {
        let body = as_object(body, "WHERE")?;
        match body.len() {
            0 => Ok(()),
            1 => self.check_filter_object(body, ctx),
            n => Err(QueryError::invalid(format!(
                "WHERE must have at most one key, found {}",
                n
            ))),
        }
    }

    fn check_filter(&self, filter: &Value, ctx: &mut ValidationContext) -> QueryResult<()> {
        self.check_filter_object(as_object(filter, "Filter")?, ctx)
    }

    fn check_filter_object(&self, filter: &Object, ctx: &mut ValidationContext) -> QueryResult<()> {
        let (name, operand) = single_entry(filter, "Filter")?;

        match name.as_str() {
            "LT" | "GT" | "EQ" => self.check_m_comparison(name, operand, ctx),
            "IS" => self.check_s_comparison(operand, ctx),
            "AND" | "OR" => self.check_filter_array(name, operand, ctx),
            "NOT" => self.check_filter(operand, ctx),
            other => Err(QueryError::invalid(format!("Unknown filter '{}'", other))),
        }
    }

    fn check_m_comparison(
        &self,
        op: &str,
        operand: &Value,
        ctx: &mut ValidationContext,
    ) -> QueryResult<()> {
        let (key, value) = single_entry(as_object(operand, op)?, op)?;
        self.resolve_key(key, Some(FieldRole::Numeric), ctx)?;

        if !value.is_number() {
            return Err(QueryError::invalid(format!(
                "{} value for '{}' must be a number",
                op, key
            )));
        }
        Ok(())
    }

    fn check_s_comparison(&self, operand: &Value, ctx: &mut ValidationContext) -> QueryResult<()> {
        let (key, value) = single_entry(as_object(operand, "IS")?, "IS")?;
        self.resolve_key(key, Some(FieldRole::String), ctx)?;

        let pattern = value.as_str().ok_or_else(|| {
            QueryError::invalid(format!("IS value for '{}' must be a string", key))
        })?;

        if !is_valid_wildcard(pattern) {
            return Err(QueryError::invalid(format!(
                "IS pattern '{}' may only have leading or trailing wildcards",
                pattern
            )));
        }
        Ok(())
    }

    fn check_filter_array(
        &self,
        name: &str,
        operand: &Value,
        ctx: &mut ValidationContext,
    ) -> QueryResult<()> {
        let children = non_empty_array(operand, name)?;
        children
            .iter()
            .try_for_each(|child| self.check_filter(child, ctx))
    }

    // =========================================================================
    // TRANSFORMATIONS
    // =========================================================================

    fn check_transformations(
        &self,
        transformations: &Value,
        ctx: &mut ValidationContext,
    ) -> QueryResult<()> {
        let transformations = as_object(transformations, "TRANSFORMATIONS")?;
        if transformations.len() != 2 {
            return Err(QueryError::invalid(
                "TRANSFORMATIONS must have exactly GROUP and APPLY",
            ));
        }

        self.check_group(section(transformations, "GROUP")?, ctx)?;

        let apply = section(transformations, "APPLY")?
            .as_array()
            .ok_or_else(|| QueryError::invalid("APPLY must be an array"))?;
        apply
            .iter()
            .try_for_each(|rule| self.check_apply_rule(rule, ctx))
    }

    fn check_group(&self, group: &Value, ctx: &mut ValidationContext) -> QueryResult<()> {
        let keys = non_empty_array(group, "GROUP")?
            .iter()
            .map(|key| self.resolve_key_value(key, None, ctx))
            .collect::<QueryResult<Vec<_>>>()?;

        ctx.set_group_keys(keys);
        Ok(())
    }

    fn check_apply_rule(&self, rule: &Value, ctx: &mut ValidationContext) -> QueryResult<()> {
        let (name, body) = single_entry(as_object(rule, "APPLY rule")?, "APPLY rule")?;

        if name.trim().is_empty() || name.contains('_') {
            return Err(QueryError::invalid(format!(
                "APPLY name '{}' must be non-blank and contain no underscore",
                name
            )));
        }
        if !ctx.declare_apply_key(name) {
            return Err(QueryError::invalid(format!(
                "APPLY name '{}' is declared more than once",
                name
            )));
        }

        let (token, key) = single_entry(as_object(body, name)?, name)?;
        let token = ApplyToken::from_token(token)
            .ok_or_else(|| QueryError::invalid(format!("Unknown APPLY token '{}'", token)))?;

        let role = token.requires_numeric().then_some(FieldRole::Numeric);
        self.resolve_key_value(key, role, ctx)?;
        Ok(())
    }

    // =========================================================================
    // OPTIONS
    // =========================================================================

    fn check_options(&self, options: &Value, ctx: &mut ValidationContext) -> QueryResult<()> {
        let options = as_object(options, "OPTIONS")?;

        match options.len() {
            1 => self.check_columns(section(options, "COLUMNS")?, ctx),
            2 => {
                self.check_columns(section(options, "COLUMNS")?, ctx)?;
                self.check_order(section(options, "ORDER")?, ctx)
            }
            _ => Err(QueryError::invalid(
                "OPTIONS must have COLUMNS and optionally ORDER",
            )),
        }
    }

    fn check_columns(&self, columns: &Value, ctx: &mut ValidationContext) -> QueryResult<()> {
        let entries = non_empty_array(columns, "COLUMNS")?;

        let columns = if ctx.is_grouping() {
            entries
                .iter()
                .map(|entry| grouped_column(entry, ctx))
                .collect::<QueryResult<Vec<_>>>()?
        } else {
            entries
                .iter()
                .map(|entry| self.resolve_key_value(entry, None, ctx).map(Column::Field))
                .collect::<QueryResult<Vec<_>>>()?
        };

        ctx.set_columns(columns);
        Ok(())
    }

    fn check_order(&self, order: &Value, ctx: &ValidationContext) -> QueryResult<()> {
        if let Value::String(key) = order {
            return check_sort_key(key, ctx);
        }

        let order = as_object(order, "ORDER")?;
        if order.len() != 2 {
            return Err(QueryError::invalid("ORDER must have exactly dir and keys"));
        }

        let dir = section(order, "dir")?;
        if dir.as_str().and_then(SortDirection::from_token).is_none() {
            return Err(QueryError::invalid("ORDER dir must be UP or DOWN"));
        }

        non_empty_array(section(order, "keys")?, "ORDER keys")?
            .iter()
            .try_for_each(|key| match key {
                Value::String(key) => check_sort_key(key, ctx),
                _ => Err(QueryError::invalid("ORDER keys must be strings")),
            })
    }

    // =========================================================================
    // Keys
    // =========================================================================

    fn resolve_key_value(
        &self,
        raw: &Value,
        role: Option<FieldRole>,
        ctx: &mut ValidationContext,
    ) -> QueryResult<QualifiedKey> {
        let raw = raw
            .as_str()
            .ok_or_else(|| QueryError::invalid(format!("Key {} must be a string", raw)))?;
        self.resolve_key(raw, role, ctx)
    }

    /// Resolves a qualified key in the given role (`None` accepts either).
    ///
    /// The first well-formed key fixes the query's dataset; every later
    /// key must use the same id.
    fn resolve_key(
        &self,
        raw: &str,
        role: Option<FieldRole>,
        ctx: &mut ValidationContext,
    ) -> QueryResult<QualifiedKey> {
        let key = QualifiedKey::parse(raw)
            .ok_or_else(|| QueryError::invalid(format!("'{}' is not a qualified key", raw)))?;

        if key.dataset_id.trim().is_empty() {
            return Err(QueryError::invalid(format!(
                "Key '{}' has a blank dataset id",
                raw
            )));
        }

        if ctx.dataset().is_none() {
            let kind = self.registry.kind_of(&key.dataset_id)?;
            ctx.resolve_dataset(&key.dataset_id, kind);
        }

        let dataset = ctx
            .dataset()
            .ok_or_else(|| QueryError::invalid("No dataset resolved"))?;

        if dataset.id != key.dataset_id {
            return Err(QueryError::invalid(format!(
                "Query references more than one dataset: '{}' and '{}'",
                dataset.id, key.dataset_id
            )));
        }

        let valid = match role {
            Some(role) => dataset.kind.is_valid_field(&key.field, role),
            None => dataset.kind.role_of(&key.field).is_some(),
        };
        if !valid {
            let expected = match role {
                Some(FieldRole::Numeric) => "numeric field",
                Some(FieldRole::String) => "string field",
                None => "field",
            };
            return Err(QueryError::invalid(format!(
                "'{}' is not a {} of {} dataset '{}'",
                raw, expected, dataset.kind, dataset.id
            )));
        }

        Ok(key)
    }
}

fn grouped_column(entry: &Value, ctx: &ValidationContext) -> QueryResult<Column> {
    let name = entry
        .as_str()
        .ok_or_else(|| QueryError::invalid("COLUMNS entries must be strings"))?;

    if let Some(key) = ctx.group_key(name) {
        return Ok(Column::Field(key.clone()));
    }
    if ctx.has_apply_key(name) {
        return Ok(Column::Aggregate(name.to_string()));
    }
    Err(QueryError::invalid(format!(
        "Column '{}' is neither a GROUP key nor an APPLY name",
        name
    )))
}

fn check_sort_key(key: &str, ctx: &ValidationContext) -> QueryResult<()> {
    if ctx.has_column(key) {
        Ok(())
    } else {
        Err(QueryError::invalid(format!(
            "ORDER key '{}' is not in COLUMNS",
            key
        )))
    }
}

fn as_object<'v>(value: &'v Value, what: &str) -> QueryResult<&'v Object> {
    value
        .as_object()
        .ok_or_else(|| QueryError::invalid(format!("{} must be an object", what)))
}

fn section<'v>(object: &'v Object, name: &str) -> QueryResult<&'v Value> {
    object
        .get(name)
        .ok_or_else(|| QueryError::invalid(format!("Missing {}", name)))
}

fn single_entry<'v>(object: &'v Object, what: &str) -> QueryResult<(&'v String, &'v Value)> {
    let mut entries = object.iter();
    match (entries.next(), entries.next()) {
        (Some(entry), None) => Ok(entry),
        _ => Err(QueryError::invalid(format!(
            "{} must have exactly one key, found {}",
            what,
            object.len()
        ))),
    }
}

fn non_empty_array<'v>(value: &'v Value, what: &str) -> QueryResult<&'v Vec<Value>> {
    match value.as_array() {
        Some(items) if !items.is_empty() => Ok(items),
        _ => Err(QueryError::invalid(format!(
            "{} must be a non-empty array",
            what
        ))),
    }
}
