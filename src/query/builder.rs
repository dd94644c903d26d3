//! Query builder
//!
//! Converts a validated raw query into the typed `Query`. The filter is
//! rebuilt by recursive descent over the same grammar the validator
//! accepted; columns, group keys and the dataset id are taken from the
//! validation context rather than re-parsed.

use serde_json::{Map, Value};

use crate::schema::QualifiedKey;

use super::ast::{
    ApplyToken, CompareOp, FilterNode, Order, Query, SortDirection, Transformation,
};
use super::context::ValidatedQuery;
use super::errors::{QueryError, QueryResult};
use super::pattern::WildcardPattern;

/// Builds typed queries from validated raw input
pub struct QueryBuilder;

impl QueryBuilder {
    /// Builds the typed query.
    ///
    /// The error path is only reachable if `validated` did not come
    /// from `QueryValidator`.
    pub fn build(validated: &ValidatedQuery<'_>) -> QueryResult<Query> {
        let raw = validated.raw();
        let ctx = validated.context();

        let dataset_id = ctx
            .dataset()
            .map(|d| d.id.clone())
            .ok_or_else(|| shape_error("no dataset resolved"))?;

        let mut query = Query::new(dataset_id, ctx.columns().to_vec());

        let body = member(raw, "WHERE")?;
        if let Some(filter) = body.as_object().filter(|b| !b.is_empty()) {
            query.filter = Some(Self::build_filter_object(filter)?);
        }

        if let Some(transformations) = raw.get("TRANSFORMATIONS") {
            let apply = member(transformations, "APPLY")?
                .as_array()
                .ok_or_else(|| shape_error("APPLY"))?;
            let rules = apply
                .iter()
                .map(Self::build_transformation)
                .collect::<QueryResult<Vec<_>>>()?;

            query = query.with_grouping(ctx.group_keys().to_vec(), rules);
        }

        if let Some(order) = member(raw, "OPTIONS")?.get("ORDER") {
            query.order = Some(Self::build_order(order)?);
        }

        Ok(query)
    }

    fn build_filter(filter: &Value) -> QueryResult<FilterNode> {
        let filter = filter.as_object().ok_or_else(|| shape_error("filter"))?;
        Self::build_filter_object(filter)
    }

    fn build_filter_object(filter: &Map<String, Value>) -> QueryResult<FilterNode> {
        let (name, operand) = single_entry(filter)?;

        match name.as_str() {
            "AND" => Ok(FilterNode::And(Self::build_children(operand)?)),
            "OR" => Ok(FilterNode::Or(Self::build_children(operand)?)),
            "NOT" => Ok(FilterNode::negate(Self::build_filter(operand)?)),
            "IS" => {
                let (key, pattern) = comparison(operand)?;
                let pattern = pattern.as_str().ok_or_else(|| shape_error("IS value"))?;
                Ok(FilterNode::matches(key, WildcardPattern::new(pattern)?))
            }
            token => {
                let op = CompareOp::from_token(token).ok_or_else(|| shape_error(token))?;
                let (key, threshold) = comparison(operand)?;
                let threshold = threshold
                    .as_f64()
                    .ok_or_else(|| shape_error("comparison value"))?;
                Ok(FilterNode::compare(op, key, threshold))
            }
        }
    }

    fn build_children(operand: &Value) -> QueryResult<Vec<FilterNode>> {
        operand
            .as_array()
            .ok_or_else(|| shape_error("filter array"))?
            .iter()
            .map(Self::build_filter)
            .collect()
    }

    fn build_transformation(rule: &Value) -> QueryResult<Transformation> {
        let rule = rule.as_object().ok_or_else(|| shape_error("APPLY rule"))?;
        let (output, body) = single_entry(rule)?;

        let body = body.as_object().ok_or_else(|| shape_error("APPLY body"))?;
        let (token, source) = single_entry(body)?;

        let token = ApplyToken::from_token(token).ok_or_else(|| shape_error(token))?;
        let source = key_of(source.as_str().ok_or_else(|| shape_error("APPLY key"))?)?;

        Ok(Transformation::new(token, source, output.as_str()))
    }

    fn build_order(order: &Value) -> QueryResult<Order> {
        if let Some(key) = order.as_str() {
            return Ok(Order::up([key]));
        }

        let direction = member(order, "dir")?
            .as_str()
            .and_then(SortDirection::from_token)
            .ok_or_else(|| shape_error("ORDER dir"))?;

        let keys = member(order, "keys")?
            .as_array()
            .ok_or_else(|| shape_error("ORDER keys"))?
            .iter()
            .map(|k| {
                k.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| shape_error("ORDER key"))
            })
            .collect::<QueryResult<Vec<_>>>()?;

        Ok(Order { direction, keys })
    }
}

fn comparison(operand: &Value) -> QueryResult<(QualifiedKey, &Value)> {
    let operand = operand.as_object().ok_or_else(|| shape_error("comparison"))?;
    let (key, value) = single_entry(operand)?;
    Ok((key_of(key)?, value))
}

fn key_of(raw: &str) -> QueryResult<QualifiedKey> {
    QualifiedKey::parse(raw).ok_or_else(|| shape_error(raw))
}

fn member<'v>(value: &'v Value, name: &str) -> QueryResult<&'v Value> {
    value.get(name).ok_or_else(|| shape_error(name))
}

fn single_entry(object: &Map<String, Value>) -> QueryResult<(&String, &Value)> {
    object.iter().next().ok_or_else(|| shape_error("empty object"))
}

fn shape_error(at: &str) -> QueryError {
    QueryError::invalid(format!("Unexpected query shape at {}", at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ast::Column;
    use crate::query::QueryValidator;
    use crate::schema::{DatasetKind, SchemaError, SchemaRegistry, SchemaResult};
    use serde_json::json;

    struct CoursesOnly;

    impl SchemaRegistry for CoursesOnly {
        fn kind_of(&self, dataset_id: &str) -> SchemaResult<DatasetKind> {
            match dataset_id {
                "courses" => Ok(DatasetKind::Courses),
                other => Err(SchemaError::DatasetNotFound(other.to_string())),
            }
        }
    }

    fn build(raw: Value) -> Query {
        let validator = QueryValidator::new(&CoursesOnly);
        let validated = validator.validate(&raw).unwrap();
        QueryBuilder::build(&validated).unwrap()
    }

    fn key(field: &str) -> QualifiedKey {
        QualifiedKey::new("courses", field)
    }

    #[test]
    fn test_empty_where_has_no_filter() {
        let query = build(json!({
            "WHERE": {},
            "OPTIONS": {"COLUMNS": ["courses_dept"]}
        }));

        assert_eq!(query.dataset_id, "courses");
        assert!(query.filter.is_none());
        assert!(query.order.is_none());
        assert!(!query.is_grouped());
        assert_eq!(query.columns, vec![Column::Field(key("dept"))]);
    }

    #[test]
    fn test_filter_tree_mirrors_input() {
        let query = build(json!({
            "WHERE": {"AND": [
                {"GT": {"courses_avg": 90}},
                {"NOT": {"IS": {"courses_dept": "cp*"}}}
            ]},
            "OPTIONS": {"COLUMNS": ["courses_dept"]}
        }));

        let expected = FilterNode::And(vec![
            FilterNode::compare(CompareOp::Gt, key("avg"), 90.0),
            FilterNode::negate(FilterNode::matches(
                key("dept"),
                WildcardPattern::new("cp*").unwrap(),
            )),
        ]);
        assert_eq!(query.filter, Some(expected));
    }

    #[test]
    fn test_transformations_and_order() {
        let query = build(json!({
            "WHERE": {},
            "TRANSFORMATIONS": {
                "GROUP": ["courses_dept", "courses_year"],
                "APPLY": [
                    {"total": {"SUM": "courses_avg"}},
                    {"profs": {"COUNT": "courses_instructor"}}
                ]
            },
            "OPTIONS": {
                "COLUMNS": ["courses_dept", "total", "profs"],
                "ORDER": {"dir": "DOWN", "keys": ["total", "courses_dept"]}
            }
        }));

        assert_eq!(query.group_columns, Some(vec![key("dept"), key("year")]));
        assert_eq!(
            query.transformations,
            Some(vec![
                Transformation::new(ApplyToken::Sum, key("avg"), "total"),
                Transformation::new(ApplyToken::Count, key("instructor"), "profs"),
            ])
        );
        assert_eq!(query.order, Some(Order::down(["total", "courses_dept"])));
        assert_eq!(
            query.columns,
            vec![
                Column::Field(key("dept")),
                Column::Aggregate("total".into()),
                Column::Aggregate("profs".into()),
            ]
        );
    }

    #[test]
    fn test_bare_order_is_ascending() {
        let query = build(json!({
            "WHERE": {},
            "OPTIONS": {"COLUMNS": ["courses_avg"], "ORDER": "courses_avg"}
        }));
        assert_eq!(query.order, Some(Order::up(["courses_avg"])));
    }
}
