//! Common types and traits shared by the builder and the grammar

use super::Builder;
use crate::bindings::{Bindings, Bound};
use crate::value::{Document, Expression};
use crate::{Error, IntoOperator, Operator, Result, Value};
use std::collections::HashMap;
use std::fmt;

/// Core trait for query builders
pub trait QueryBuilder {
    /// Compile the query into AQL text
    fn to_aql(&self) -> Result<String>;

    /// Same as [`to_aql`](QueryBuilder::to_aql), for callers written against SQL builders
    fn to_sql(&self) -> Result<String> {
        self.to_aql()
    }

    /// Flattened bind parameters in emission order
    fn get_bindings(&self) -> Result<Bindings>;

    /// Clone the builder (for immutable chaining)
    fn clone_builder(&self) -> Self
    where
        Self: Sized;
}

/// Right-hand side of a condition
#[derive(Debug, Clone)]
pub enum Operand {
    Value(Value),
    Expression(Expression),
    Column(String),
    Query(Box<Builder>),
}

/// Trait for values usable on the right-hand side of a condition
pub trait IntoOperand {
    fn into_operand(self) -> Operand;
}

impl<T> IntoOperand for T
where
    T: Into<Value>,
{
    fn into_operand(self) -> Operand {
        Operand::Value(self.into())
    }
}

impl IntoOperand for Expression {
    fn into_operand(self) -> Operand {
        Operand::Expression(self)
    }
}

impl IntoOperand for Builder {
    fn into_operand(self) -> Operand {
        Operand::Query(Box::new(self))
    }
}

impl IntoOperand for Operand {
    fn into_operand(self) -> Operand {
        self
    }
}

/// Reference to another column, used where a value would otherwise be bound
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef(pub String);

impl IntoOperand for ColumnRef {
    fn into_operand(self) -> Operand {
        Operand::Column(self.0)
    }
}

/// Trait for conditions that can be used in `where_` clauses
pub trait IntoCondition {
    fn into_condition(self) -> (String, Result<Operator>, Operand);
}

// Implementation for shorthand equality: where_(("age", 18))
impl<T> IntoCondition for (&str, T)
where
    T: IntoOperand,
{
    fn into_condition(self) -> (String, Result<Operator>, Operand) {
        (self.0.to_string(), Ok(Operator::EQ), self.1.into_operand())
    }
}

// Implementation for explicit operators: where_(("age", op::GT, 18)) or where_(("age", ">", 18))
impl<T, O> IntoCondition for (&str, O, T)
where
    T: IntoOperand,
    O: IntoOperator,
{
    fn into_condition(self) -> (String, Result<Operator>, Operand) {
        (
            self.0.to_string(),
            self.1.into_operator(),
            self.2.into_operand(),
        )
    }
}

/// Sub-queries are given either as a finished builder or as a closure
/// receiving a builder that already knows the parent's aliases
pub trait IntoSubQuery {
    fn into_sub_query(self, parent: &Builder) -> Builder;
}

impl IntoSubQuery for Builder {
    fn into_sub_query(mut self, parent: &Builder) -> Builder {
        self.aliases.import_table_aliases(&parent.aliases);
        self
    }
}

impl<F> IntoSubQuery for F
where
    F: FnOnce(Builder) -> Builder,
{
    fn into_sub_query(self, parent: &Builder) -> Builder {
        self(parent.for_sub_query())
    }
}

/// How WHERE conditions are connected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhereConnector {
    And,
    Or,
}

impl WhereConnector {
    pub fn as_str(&self) -> &'static str {
        match self {
            WhereConnector::And => "AND",
            WhereConnector::Or => "OR",
        }
    }
}

/// Date component compared by the date-based filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePart {
    Date,
    Time,
    Year,
    Month,
    Day,
}

/// One filter clause
#[derive(Debug, Clone)]
pub struct Where {
    pub kind: WhereKind,
    pub connector: WhereConnector,
}

#[derive(Debug, Clone)]
pub enum WhereKind {
    Basic {
        column: String,
        operator: Operator,
        value: Bound,
    },
    Between {
        column: String,
        low: Bound,
        high: Bound,
        not: bool,
    },
    In {
        column: String,
        values: Bound,
        not: bool,
    },
    InRaw {
        column: String,
        values: Vec<i64>,
        not: bool,
    },
    InSub {
        column: String,
        query: Box<Builder>,
        not: bool,
    },
    Null {
        column: String,
        not: bool,
    },
    Column {
        first: String,
        operator: Operator,
        second: String,
    },
    Sub {
        column: String,
        operator: Operator,
        query: Box<Builder>,
    },
    Exists {
        query: Box<Builder>,
        not: bool,
    },
    Nested {
        query: Box<Builder>,
    },
    Expression {
        aql: Expression,
    },
    JsonContains {
        column: String,
        value: Bound,
        all: bool,
        not: bool,
    },
    JsonLength {
        column: String,
        operator: Operator,
        value: Bound,
    },
    Date {
        part: DatePart,
        column: String,
        operator: Operator,
        value: Bound,
    },
    Bitwise {
        column: String,
        operator: Operator,
        value: Bound,
    },
}

/// Join types supported by the grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Cross,
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinType::Inner => write!(f, "inner"),
            JoinType::Left => write!(f, "left"),
            JoinType::Cross => write!(f, "cross"),
        }
    }
}

/// Sort direction for ORDER BY clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "ASC"),
            SortDirection::Desc => write!(f, "DESC"),
        }
    }
}

/// Trait for values accepted as a sort direction
pub trait IntoSortDirection {
    fn into_sort_direction(self) -> Result<SortDirection>;
}

impl IntoSortDirection for SortDirection {
    fn into_sort_direction(self) -> Result<SortDirection> {
        Ok(self)
    }
}

impl IntoSortDirection for &str {
    fn into_sort_direction(self) -> Result<SortDirection> {
        match self.trim().to_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(Error::invalid_argument(
                "Order direction must be \"asc\" or \"desc\".",
            )),
        }
    }
}

/// One SORT criterion
#[derive(Debug, Clone)]
pub enum OrderClause {
    Column {
        column: String,
        direction: SortDirection,
    },
    Raw(Expression),
    Random,
    BestMatching {
        direction: SortDirection,
    },
}

/// Grouping key of a COLLECT statement
#[derive(Debug, Clone)]
pub enum GroupKey {
    Column(String),
    Raw(Expression),
}

/// Aggregation function types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    Count,
    CountDistinct,
    Sum,
    Avg,
    Min,
    Max,
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateFunction::Count => write!(f, "COUNT"),
            AggregateFunction::CountDistinct => write!(f, "COUNT_DISTINCT"),
            AggregateFunction::Sum => write!(f, "SUM"),
            AggregateFunction::Avg => write!(f, "AVG"),
            AggregateFunction::Min => write!(f, "MIN"),
            AggregateFunction::Max => write!(f, "MAX"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Aggregate {
    pub function: AggregateFunction,
    pub column: Option<String>,
}

/// Column selector for the RETURN projection
#[derive(Debug, Clone)]
pub enum ColumnSelector {
    Column(String),
    Aliased { column: String, alias: String },
    /// Whole documents of a table (`table.*`); empty for the main collection
    Documents(String),
    Raw {
        expression: Expression,
        alias: Option<String>,
    },
    Sub {
        query: Box<Builder>,
        alias: String,
    },
}

/// Split on the first case-insensitive `" as "`
pub(crate) fn split_as(text: &str) -> Option<(&str, &str)> {
    let idx = text
        .as_bytes()
        .windows(4)
        .position(|window| window.eq_ignore_ascii_case(b" as "))?;
    Some((&text[..idx], &text[idx + 4..]))
}

impl ColumnSelector {
    /// Parse `column`, `column as alias` and `table.*`
    pub fn parse(column: &str) -> Self {
        let column = column.trim();

        if let Some((name, alias)) = split_as(column) {
            return Self::Aliased {
                column: name.trim().to_string(),
                alias: alias.trim().to_string(),
            };
        }

        if column == "*" {
            return Self::Documents(String::new());
        }

        match column.strip_suffix(".*") {
            Some(table) => Self::Documents(table.to_string()),
            None => Self::Column(column.to_string()),
        }
    }

    /// Add alias to this column selector
    pub fn as_alias(self, alias: &str) -> Self {
        match self {
            Self::Column(column) | Self::Aliased { column, .. } => Self::Aliased {
                column,
                alias: alias.to_string(),
            },
            Self::Raw { expression, .. } => Self::Raw {
                expression,
                alias: Some(alias.to_string()),
            },
            Self::Sub { query, .. } => Self::Sub {
                query,
                alias: alias.to_string(),
            },
            Self::Documents(table) => Self::Documents(table),
        }
    }
}

/// Trait for converting various types into column selectors
pub trait IntoColumnSelectors {
    fn into_column_selectors(self) -> Vec<ColumnSelector>;
}

impl IntoColumnSelectors for &str {
    fn into_column_selectors(self) -> Vec<ColumnSelector> {
        vec![ColumnSelector::parse(self)]
    }
}

impl IntoColumnSelectors for String {
    fn into_column_selectors(self) -> Vec<ColumnSelector> {
        vec![ColumnSelector::parse(&self)]
    }
}

impl IntoColumnSelectors for ColumnSelector {
    fn into_column_selectors(self) -> Vec<ColumnSelector> {
        vec![self]
    }
}

impl IntoColumnSelectors for Vec<&str> {
    fn into_column_selectors(self) -> Vec<ColumnSelector> {
        self.into_iter().map(ColumnSelector::parse).collect()
    }
}

impl IntoColumnSelectors for Vec<String> {
    fn into_column_selectors(self) -> Vec<ColumnSelector> {
        self.iter().map(|c| ColumnSelector::parse(c)).collect()
    }
}

impl IntoColumnSelectors for Vec<ColumnSelector> {
    fn into_column_selectors(self) -> Vec<ColumnSelector> {
        self
    }
}

impl<const N: usize> IntoColumnSelectors for [&str; N] {
    fn into_column_selectors(self) -> Vec<ColumnSelector> {
        self.into_iter().map(ColumnSelector::parse).collect()
    }
}

macro_rules! impl_column_tuple {
    ($($name:ident),+) => {
        impl IntoColumnSelectors for ($(impl_column_tuple!(@str $name),)+) {
            #[allow(non_snake_case)]
            fn into_column_selectors(self) -> Vec<ColumnSelector> {
                let ($($name,)+) = self;
                vec![$(ColumnSelector::parse($name)),+]
            }
        }
    };
    (@str $name:ident) => { &str };
}

impl_column_tuple!(A, B);
impl_column_tuple!(A, B, C);
impl_column_tuple!(A, B, C, D);
impl_column_tuple!(A, B, C, D, E);
impl_column_tuple!(A, B, C, D, E, F);

/// Source of a query's main FOR loop
#[derive(Debug, Clone)]
pub enum FromClause {
    Collection { name: String, alias: String },
    View { name: String, alias: String },
    Sub { query: Box<Builder>, alias: String },
}

impl FromClause {
    pub fn alias(&self) -> &str {
        match self {
            FromClause::Collection { alias, .. }
            | FromClause::View { alias, .. }
            | FromClause::Sub { alias, .. } => alias,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UnionClause {
    pub query: Box<Builder>,
    pub all: bool,
}

/// Full-text search over an ArangoSearch view
#[derive(Debug, Clone)]
pub struct SearchClause {
    pub fields: Vec<String>,
    pub text: Bound,
    pub analyzer: Bound,
}

/// Query variable introduced with LET
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub value: VariableValue,
}

#[derive(Debug, Clone)]
pub enum VariableValue {
    Bound(Bound),
    Query(Box<Builder>),
}

/// Trait for documents written by insert and upsert
pub trait IntoDocument {
    fn into_document(self) -> Result<Document>;
}

impl IntoDocument for Document {
    fn into_document(self) -> Result<Document> {
        Ok(self)
    }
}

impl IntoDocument for HashMap<String, Value> {
    fn into_document(self) -> Result<Document> {
        let mut entries: Vec<(String, Value)> = self.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries.into_iter().collect())
    }
}

impl IntoDocument for serde_json::Value {
    fn into_document(self) -> Result<Document> {
        match Value::from_json(self) {
            Value::Object(doc) => Ok(doc),
            other => Err(Error::invalid_argument(format!(
                "Expected a JSON object, got {}.",
                other.type_name()
            ))),
        }
    }
}

impl<V> IntoDocument for Vec<(&str, V)>
where
    V: Into<Value>,
{
    fn into_document(self) -> Result<Document> {
        Ok(self
            .into_iter()
            .map(|(key, value)| (key.to_string(), value.into()))
            .collect())
    }
}

/// Trait for the attribute assignments of an update
pub trait IntoUpdateData {
    fn into_update_data(self) -> Result<Vec<(String, Operand)>>;
}

impl IntoUpdateData for Document {
    fn into_update_data(self) -> Result<Vec<(String, Operand)>> {
        Ok(self
            .into_iter()
            .map(|(key, value)| (key, Operand::Value(value)))
            .collect())
    }
}

impl IntoUpdateData for HashMap<String, Value> {
    fn into_update_data(self) -> Result<Vec<(String, Operand)>> {
        self.into_document()?.into_update_data()
    }
}

impl IntoUpdateData for serde_json::Value {
    fn into_update_data(self) -> Result<Vec<(String, Operand)>> {
        self.into_document()?.into_update_data()
    }
}

impl<V> IntoUpdateData for Vec<(&str, V)>
where
    V: IntoOperand,
{
    fn into_update_data(self) -> Result<Vec<(String, Operand)>> {
        Ok(self
            .into_iter()
            .map(|(key, value)| (key.to_string(), value.into_operand()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_column_selector_parsing() {
        assert!(matches!(ColumnSelector::parse("name"), ColumnSelector::Column(c) if c == "name"));
        assert!(matches!(
            ColumnSelector::parse("characters.name AS characterName"),
            ColumnSelector::Aliased { column, alias } if column == "characters.name" && alias == "characterName"
        ));
        assert!(matches!(ColumnSelector::parse("locations.*"), ColumnSelector::Documents(t) if t == "locations"));
        assert!(matches!(ColumnSelector::parse("*"), ColumnSelector::Documents(t) if t.is_empty()));
    }

    #[test]
    fn test_alias_split_keeps_multibyte_names() {
        assert!(matches!(
            ColumnSelector::parse("İ as é"),
            ColumnSelector::Aliased { column, alias } if column == "İ" && alias == "é"
        ));
        assert!(matches!(
            ColumnSelector::parse("straße AS Straße"),
            ColumnSelector::Aliased { column, alias } if column == "straße" && alias == "Straße"
        ));
        assert_eq!(split_as("İİ as ß"), Some(("İİ", "ß")));
        assert_eq!(split_as("İ"), None);
    }

    #[test]
    fn test_tuple_column_selectors() {
        let selectors = ("id", "name", "surname as family").into_column_selectors();
        assert_eq!(selectors.len(), 3);
        assert!(matches!(&selectors[2], ColumnSelector::Aliased { alias, .. } if alias == "family"));
    }

    #[test]
    fn test_sort_direction_parsing() {
        assert_eq!("ASC".into_sort_direction().unwrap(), SortDirection::Asc);
        assert_eq!(" desc ".into_sort_direction().unwrap(), SortDirection::Desc);
        assert!(matches!(
            "sideways".into_sort_direction(),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_condition_shorthand_uses_equality() {
        let (column, operator, operand) = ("name", "Ned").into_condition();
        assert_eq!(column, "name");
        assert_eq!(operator.unwrap(), Operator::EQ);
        assert!(matches!(operand, Operand::Value(Value::String(s)) if s == "Ned"));
    }

    #[test]
    fn test_condition_with_invalid_operator_defers_error() {
        let (_, operator, _) = ("age", "~~", 18).into_condition();
        assert!(operator.is_err());
    }

    #[test]
    fn test_into_document_rejects_non_objects() {
        assert!(json!([1, 2]).into_document().is_err());
        let doc = json!({"id": "NedStark", "name": "Ned"}).into_document().unwrap();
        assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["id", "name"]);
    }

    #[test]
    fn test_aggregate_function_names() {
        assert_eq!(AggregateFunction::CountDistinct.to_string(), "COUNT_DISTINCT");
        assert_eq!(AggregateFunction::Avg.to_string(), "AVG");
    }
}
