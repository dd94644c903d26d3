//! Typed query representation
//!
//! Built once from a validated raw query. Nothing past this point
//! inspects raw JSON.

use std::fmt;

use crate::schema::QualifiedKey;

use super::pattern::WildcardPattern;

/// Numeric comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// field < threshold
    Lt,
    /// field > threshold
    Gt,
    /// field == threshold
    Eq,
}

impl CompareOp {
    /// Parses a wire token (`LT`, `GT`, `EQ`)
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "LT" => Some(CompareOp::Lt),
            "GT" => Some(CompareOp::Gt),
            "EQ" => Some(CompareOp::Eq),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Lt => "LT",
            CompareOp::Gt => "GT",
            CompareOp::Eq => "EQ",
        }
    }
}

/// Recursive boolean filter tree
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    And(Vec<FilterNode>),
    Or(Vec<FilterNode>),
    Not(Box<FilterNode>),
    Compare {
        op: CompareOp,
        key: QualifiedKey,
        threshold: f64,
    },
    Match {
        key: QualifiedKey,
        pattern: WildcardPattern,
    },
}

impl FilterNode {
    /// Create a numeric comparison
    pub fn compare(op: CompareOp, key: QualifiedKey, threshold: f64) -> Self {
        FilterNode::Compare { op, key, threshold }
    }

    /// Create a wildcard match
    pub fn matches(key: QualifiedKey, pattern: WildcardPattern) -> Self {
        FilterNode::Match { key, pattern }
    }

    /// Wraps a node in a negation
    pub fn negate(node: FilterNode) -> Self {
        FilterNode::Not(Box::new(node))
    }

    /// Returns the number of nodes in this tree
    pub fn node_count(&self) -> usize {
        match self {
            FilterNode::And(children) | FilterNode::Or(children) => {
                1 + children.iter().map(FilterNode::node_count).sum::<usize>()
            }
            FilterNode::Not(child) => 1 + child.node_count(),
            FilterNode::Compare { .. } | FilterNode::Match { .. } => 1,
        }
    }
}

/// Aggregation tokens for APPLY rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApplyToken {
    Max,
    Min,
    Avg,
    Sum,
    Count,
}

impl ApplyToken {
    /// Parses a wire token (`MAX`, `MIN`, `AVG`, `SUM`, `COUNT`)
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "MAX" => Some(ApplyToken::Max),
            "MIN" => Some(ApplyToken::Min),
            "AVG" => Some(ApplyToken::Avg),
            "SUM" => Some(ApplyToken::Sum),
            "COUNT" => Some(ApplyToken::Count),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplyToken::Max => "MAX",
            ApplyToken::Min => "MIN",
            ApplyToken::Avg => "AVG",
            ApplyToken::Sum => "SUM",
            ApplyToken::Count => "COUNT",
        }
    }

    /// COUNT accepts any key; the rest need a numeric one
    pub fn requires_numeric(&self) -> bool {
        !matches!(self, ApplyToken::Count)
    }
}

/// One APPLY rule: `{ output: { TOKEN: source } }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformation {
    pub token: ApplyToken,
    pub source: QualifiedKey,
    pub output: String,
}

impl Transformation {
    pub fn new(token: ApplyToken, source: QualifiedKey, output: impl Into<String>) -> Self {
        Self {
            token,
            source,
            output: output.into(),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Up,
    Down,
}

impl SortDirection {
    /// Parses a wire token (`UP`, `DOWN`)
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "UP" => Some(SortDirection::Up),
            "DOWN" => Some(SortDirection::Down),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Up => "UP",
            SortDirection::Down => "DOWN",
        }
    }
}

/// Sort order over output column names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub direction: SortDirection,
    /// Ties on earlier keys are broken by later ones
    pub keys: Vec<String>,
}

impl Order {
    pub fn up(keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            direction: SortDirection::Up,
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn down(keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            direction: SortDirection::Down,
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}

/// A declared output column
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Column {
    /// A qualified dataset key (ungrouped query, or a group column)
    Field(QualifiedKey),
    /// An APPLY output name
    Aggregate(String),
}

impl Column {
    /// Returns the column name as it appears in result rows
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Column::Field(key) => write!(f, "{}", key),
            Column::Aggregate(name) => f.write_str(name),
        }
    }
}

/// Typed query over a single dataset
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// The one dataset every key references
    pub dataset_id: String,
    /// Output columns, in declared order
    pub columns: Vec<Column>,
    /// Absent when WHERE is empty
    pub filter: Option<FilterNode>,
    /// Present iff TRANSFORMATIONS was given
    pub group_columns: Option<Vec<QualifiedKey>>,
    /// Present iff TRANSFORMATIONS was given
    pub transformations: Option<Vec<Transformation>>,
    pub order: Option<Order>,
}

impl Query {
    /// Creates a query that selects `columns` from every record
    pub fn new(dataset_id: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            dataset_id: dataset_id.into(),
            columns,
            filter: None,
            group_columns: None,
            transformations: None,
            order: None,
        }
    }

    /// Sets the filter
    pub fn with_filter(mut self, filter: FilterNode) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Sets grouping and the aggregations computed per group
    pub fn with_grouping(
        mut self,
        group_columns: Vec<QualifiedKey>,
        transformations: Vec<Transformation>,
    ) -> Self {
        self.group_columns = Some(group_columns);
        self.transformations = Some(transformations);
        self
    }

    /// Sets the order
    pub fn with_order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    /// Returns true if the query groups its results
    pub fn is_grouped(&self) -> bool {
        self.group_columns.is_some()
    }

    /// Returns the output column names, in declared order
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(Column::name).collect()
    }
}
