//! Aqueduct Core - a fluent query builder that compiles to AQL
//!
//! Queries are composed with SQL-style builder methods and compiled into
//! ArangoDB's AQL together with their bind parameters. Collection aliases,
//! `id`/`_key` translation and constructs AQL lacks (left joins, unions,
//! grouped projections) are handled by the grammar.
//!
//! ```
//! use aqueduct_core::{table, QueryBuilder};
//!
//! let query = table("characters").where_(("surname", "Stark")).limit(10);
//! let aql = query.to_aql().unwrap();
//! assert!(aql.starts_with("FOR characterDoc IN characters FILTER characterDoc.`surname` == @"));
//! assert!(aql.ends_with("LIMIT 10 RETURN characterDoc"));
//! ```

pub mod alias;
pub mod bindings;
pub mod builder;
pub mod config;
pub mod error;
pub mod executor;
pub mod grammar;
pub mod operator;
pub mod schema;
pub mod transaction;
pub mod value;

// Re-export main types
pub use bindings::{BindingCategory, Bindings};
pub use builder::{
    AggregateFunction, Builder, ColumnRef, ColumnSelector, IntoColumnSelectors, IntoCondition,
    IntoDocument, IntoOperand, IntoSortDirection, IntoSubQuery, IntoUpdateData, JoinClause,
    JoinType, QueryBuilder, SortDirection, WhereConnector,
};
pub use config::ConnectionConfig;
pub use error::{ClientError, Error, Result};
pub use executor::{
    Connection, Cursor, DatabaseClient, ExecutableModification, ExecutableQuery, QueryExecuted,
    Statement,
};
pub use grammar::CompiledQuery;
pub use operator::{op, IntoOperator, Operator};
pub use transaction::{TransactionCollections, TransactionManager, TransactionOptions};
pub use value::{Document, Expression, Value};

/// Create a new query builder over the given collection
pub fn table(name: &str) -> Builder {
    Builder::new().from(name)
}

/// A trusted AQL fragment, emitted verbatim instead of being bound
///
/// # Examples
///
/// ```
/// use aqueduct_core::{raw, table, QueryBuilder};
///
/// let query = table("characters").where_(("age", ">", raw("characterDoc.`min_age`")));
/// assert_eq!(
///     query.to_aql().unwrap(),
///     "FOR characterDoc IN characters FILTER characterDoc.`age` > characterDoc.`min_age` RETURN characterDoc"
/// );
/// ```
pub fn raw(aql: impl Into<String>) -> Expression {
    Expression::new(aql)
}

/// Create a column selector for aliasing
///
/// # Examples
///
/// ```
/// use aqueduct_core::{col, table, QueryBuilder};
///
/// let query = table("characters").select(col("name").as_alias("characterName"));
/// assert_eq!(
///     query.to_aql().unwrap(),
///     "FOR characterDoc IN characters RETURN {characterName: characterDoc.`name`}"
/// );
/// ```
pub fn col(name: &str) -> ColumnSelector {
    ColumnSelector::parse(name)
}
