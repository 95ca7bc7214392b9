//! Query builder module
//!
//! [`Builder`] accumulates clause descriptors, bind parameters and aliases.
//! Mutators consume and return the builder. A mutator that receives
//! arguments it cannot express records an error instead of panicking; the
//! first recorded error is returned by every compile and execute entry point
//! and later mutations are ignored.

pub mod common;
pub mod delete;
pub mod groups;
pub mod insert;
pub mod joins;
pub mod orders;
pub mod search;
pub mod unions;
pub mod update;
pub mod wheres;

pub use common::{
    Aggregate, AggregateFunction, ColumnRef, ColumnSelector, DatePart, FromClause, GroupKey,
    IntoColumnSelectors, IntoCondition, IntoDocument, IntoOperand, IntoSortDirection,
    IntoSubQuery, IntoUpdateData, JoinType, Operand, OrderClause, QueryBuilder, SearchClause,
    SortDirection, UnionClause, Variable, VariableValue, Where, WhereConnector, WhereKind,
};
pub use joins::JoinClause;

use crate::alias::{generate_table_alias, AliasRegistry, DEFAULT_ALIAS_POSTFIX};
use crate::bindings::{
    clean_bindings, is_placeholder, BindingCategory, BindingStore, Bindings, Bound,
};
use crate::grammar;
use crate::value::Expression;
use crate::{Error, Result, Value};

/// AQL query builder
#[derive(Debug, Clone)]
pub struct Builder {
    pub(crate) table_prefix: String,
    pub(crate) from: Option<FromClause>,
    pub(crate) columns: Vec<ColumnSelector>,
    pub(crate) distinct: bool,
    pub(crate) wheres: Vec<Where>,
    pub(crate) joins: Vec<JoinClause>,
    pub(crate) groups: Vec<GroupKey>,
    pub(crate) havings: Vec<Where>,
    pub(crate) aggregate: Option<Aggregate>,
    pub(crate) orders: Vec<OrderClause>,
    pub(crate) union_orders: Vec<OrderClause>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
    pub(crate) union_limit: Option<u64>,
    pub(crate) union_offset: Option<u64>,
    pub(crate) unions: Vec<UnionClause>,
    pub(crate) search: Option<SearchClause>,
    pub(crate) variables: Vec<Variable>,
    pub(crate) return_single_value: bool,
    pub(crate) bindings: BindingStore,
    pub(crate) aliases: AliasRegistry,
    pub(crate) error: Option<Error>,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    /// Create an empty builder; call [`from`](Builder::from) before compiling
    pub fn new() -> Self {
        Self {
            table_prefix: String::new(),
            from: None,
            columns: Vec::new(),
            distinct: false,
            wheres: Vec::new(),
            joins: Vec::new(),
            groups: Vec::new(),
            havings: Vec::new(),
            aggregate: None,
            orders: Vec::new(),
            union_orders: Vec::new(),
            limit: None,
            offset: None,
            union_limit: None,
            union_offset: None,
            unions: Vec::new(),
            search: None,
            variables: Vec::new(),
            return_single_value: false,
            bindings: BindingStore::new(),
            aliases: AliasRegistry::new(),
            error: None,
        }
    }

    /// Prefix prepended to every collection name in generated AQL
    pub fn with_table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }

    /// Process-unique identity used in placeholder names
    pub fn query_id(&self) -> u64 {
        self.bindings.query_id()
    }

    /// The first validation error recorded by a mutator
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    pub fn aliases(&self) -> &AliasRegistry {
        &self.aliases
    }

    pub fn bindings(&self) -> &BindingStore {
        &self.bindings
    }

    /// Document variable of the main FOR loop
    pub fn default_alias(&self) -> Option<&str> {
        self.from.as_ref().map(FromClause::alias)
    }

    pub(crate) fn check(&self) -> Result<()> {
        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// Record a validation error; the first one wins
    pub(crate) fn fail(mut self, err: Error) -> Self {
        if self.error.is_none() {
            self.error = Some(err);
        }
        self
    }

    /// Turn an operand into the text the grammar will emit, binding plain values
    pub(crate) fn bind(&mut self, operand: Operand, category: BindingCategory) -> Bound {
        match operand {
            Operand::Value(Value::String(s)) if is_placeholder(&s) => Bound::Raw(s),
            Operand::Value(value) => Bound::Placeholder(self.bindings.add(value, category)),
            Operand::Expression(expression) => Bound::Raw(expression.to_string()),
            Operand::Column(column) => Bound::Column(column),
            Operand::Query(mut query) => {
                if runs_inside_loop(category) {
                    self.scope_sub_query(&mut query);
                }
                match grammar::compile_sub_query(&query) {
                    Ok(aql) => {
                        self.absorb(&query, category);
                        Bound::Raw(aql)
                    }
                    Err(err) => {
                        if self.error.is_none() {
                            self.error = Some(err);
                        }
                        Bound::Raw(String::new())
                    }
                }
            }
        }
    }

    /// Merge a sub-builder's bindings and pending error into this builder
    pub(crate) fn absorb(&mut self, query: &Builder, category: BindingCategory) {
        self.bindings.merge(&query.bindings, Some(category));
        if self.error.is_none() {
            self.error = query.error.clone();
        }
    }

    /// Resolve a sub-query argument against this builder and take over its bindings
    pub(crate) fn adopt<Q>(&mut self, sub: Q, category: BindingCategory) -> Builder
    where
        Q: IntoSubQuery,
    {
        let mut query = sub.into_sub_query(self);
        if runs_inside_loop(category) {
            self.scope_sub_query(&mut query);
        }
        self.absorb(&query, category);
        query
    }

    /// Rename a nested sub-query's document variable when this builder
    /// already binds it, so the inner FOR does not redeclare it
    pub(crate) fn scope_sub_query(&self, query: &mut Builder) {
        let (name, alias) = match &query.from {
            Some(FromClause::Collection { name, alias } | FromClause::View { name, alias }) => {
                (name.clone(), alias.clone())
            }
            _ => return,
        };
        if !self.aliases.is_table_alias(&alias)
            || alias != generate_table_alias(&name, DEFAULT_ALIAS_POSTFIX)
        {
            return;
        }

        let scoped = format!("{}{}", alias, query.query_id());
        query.aliases.register_table_alias(&name, Some(&scoped));
        if let Some(FromClause::Collection { alias, .. } | FromClause::View { alias, .. }) =
            &mut query.from
        {
            *alias = scoped;
        }
    }

    /// Add a binding under a category given by name
    pub fn add_binding(mut self, value: impl Into<Value>, category: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        match self.bindings.add_named(value, category) {
            Ok(_) => self,
            Err(err) => self.fail(err),
        }
    }

    /// Add several bindings under a category given by name
    ///
    /// Trusted expressions in `values` are skipped; they are never sent as
    /// parameters.
    pub fn add_bindings<I, O>(mut self, values: I, category: &str) -> Self
    where
        I: IntoIterator<Item = O>,
        O: IntoOperand,
    {
        if self.error.is_some() {
            return self;
        }
        let values = clean_bindings(values.into_iter().map(IntoOperand::into_operand));
        for value in values {
            if let Err(err) = self.bindings.add_named(value, category) {
                return self.fail(err);
            }
        }
        self
    }

    /// Replace the bindings of one category
    pub fn set_bindings(mut self, values: Bindings, category: BindingCategory) -> Self {
        self.bindings.set(values, category);
        self
    }

    /// Import the bindings of another builder, keeping their categories
    pub fn import_bindings(mut self, other: &Builder) -> Self {
        self.bindings.import(&other.bindings);
        self
    }

    /// Merge another builder's bindings, optionally into one category
    pub fn merge_bindings(mut self, other: &Builder, category: Option<BindingCategory>) -> Self {
        self.bindings.merge(&other.bindings, category);
        self
    }

    /// Set the collection to query; accepts `"characters as c"`
    pub fn from(mut self, table: &str) -> Self {
        let (name, alias) = split_alias(table);
        let alias = self.aliases.register_table_alias(&name, alias.as_deref());
        self.from = Some(FromClause::Collection { name, alias });
        self
    }

    /// Same as [`from`](Builder::from)
    pub fn table(self, table: &str) -> Self {
        self.from(table)
    }

    /// Iterate over an ArangoSearch view instead of a collection
    pub fn from_view(mut self, view: &str) -> Self {
        let (name, alias) = split_alias(view);
        let alias = self.aliases.register_table_alias(&name, alias.as_deref());
        self.from = Some(FromClause::View { name, alias });
        self
    }

    /// Iterate over the result of a sub-query
    pub fn from_sub<Q>(mut self, sub: Q, alias: &str) -> Self
    where
        Q: IntoSubQuery,
    {
        if self.error.is_some() {
            return self;
        }
        let query = self.adopt(sub, BindingCategory::From);
        let alias = if alias.is_empty() {
            self.aliases.register_sub_query_alias(query.query_id())
        } else {
            self.aliases.register_table_alias(alias, Some(alias))
        };
        self.from = Some(FromClause::Sub {
            query: Box::new(query),
            alias,
        });
        self
    }

    /// Select specific columns
    ///
    /// # Examples
    /// ```
    /// use aqueduct_core::{table, QueryBuilder};
    ///
    /// let query = table("characters").select(("id", "name"));
    /// assert_eq!(
    ///     query.to_aql().unwrap(),
    ///     "FOR characterDoc IN characters RETURN {id: characterDoc.`_key`, name: characterDoc.`name`}"
    /// );
    /// ```
    pub fn select<T>(mut self, columns: T) -> Self
    where
        T: IntoColumnSelectors,
    {
        self.columns.clear();
        self.bindings.set(Bindings::new(), BindingCategory::Select);
        self.add_select(columns)
    }

    /// Append columns to the projection
    pub fn add_select<T>(mut self, columns: T) -> Self
    where
        T: IntoColumnSelectors,
    {
        for selector in columns.into_column_selectors() {
            if let ColumnSelector::Aliased { column, alias } = &selector {
                self.aliases.register_column_alias(column, alias);
            }
            self.columns.push(selector);
        }
        self
    }

    /// Add a trusted AQL expression to the projection
    pub fn select_raw(mut self, expression: impl Into<String>) -> Self {
        self.columns.push(ColumnSelector::Raw {
            expression: Expression::new(expression),
            alias: None,
        });
        self
    }

    /// Add a trusted AQL expression to the projection under an attribute name
    pub fn select_raw_as(mut self, expression: impl Into<String>, alias: &str) -> Self {
        self.columns.push(ColumnSelector::Raw {
            expression: Expression::new(expression),
            alias: Some(alias.to_string()),
        });
        self
    }

    /// Add a sub-query result to the projection under `alias`
    pub fn select_sub<Q>(mut self, sub: Q, alias: &str) -> Self
    where
        Q: IntoSubQuery,
    {
        if self.error.is_some() {
            return self;
        }
        let mut query = self.adopt(sub, BindingCategory::Select);
        query.return_single_value = true;
        self.aliases.register_variable(alias, alias);
        self.columns.push(ColumnSelector::Sub {
            query: Box::new(query),
            alias: alias.to_string(),
        });
        self
    }

    /// Return only distinct results
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Introduce a query variable bound to a value or trusted expression
    pub fn set<V>(mut self, name: &str, value: V) -> Self
    where
        V: IntoOperand,
    {
        if self.error.is_some() {
            return self;
        }
        let bound = self.bind(value.into_operand(), BindingCategory::Variable);
        self.aliases.register_variable(name, name);
        self.variables.push(Variable {
            name: name.to_string(),
            value: VariableValue::Bound(bound),
        });
        self
    }

    /// Introduce a query variable holding a sub-query result
    pub fn set_sub<Q>(mut self, name: &str, sub: Q) -> Self
    where
        Q: IntoSubQuery,
    {
        if self.error.is_some() {
            return self;
        }
        let mut query = self.adopt(sub, BindingCategory::Variable);
        query.return_single_value = true;
        self.aliases.register_variable(name, name);
        self.variables.push(Variable {
            name: name.to_string(),
            value: VariableValue::Query(Box::new(query)),
        });
        self
    }

    /// A fresh builder that resolves the parent's collections and variables
    pub fn for_sub_query(&self) -> Builder {
        let mut query = Builder::new().with_table_prefix(self.table_prefix.clone());
        query.aliases.import_table_aliases(&self.aliases);
        query.aliases.import_variables(&self.aliases);
        query
    }

    /// A fresh builder over the same source, used for parenthesized conditions
    pub fn for_nested_where(&self) -> Builder {
        let mut query = Builder::new().with_table_prefix(self.table_prefix.clone());
        query.from = self.from.clone();
        query.aliases = self.aliases.clone();
        query
    }

    /// Copy compiled in place of the builder; placeholders added to it keep
    /// this builder's naming sequence
    pub(crate) fn working_copy(&self) -> Builder {
        let mut query = self.clone();
        query.bindings = self.bindings.snapshot();
        query
    }

    /// Compile the query together with the bindings it references
    pub fn to_compiled(&self) -> Result<grammar::CompiledQuery> {
        grammar::compile_select(self)
    }

    /// Compile a query answering whether any row matches
    pub fn exists_query(&self) -> Result<grammar::CompiledQuery> {
        self.check()?;
        let mut query = self.working_copy();
        let aql = grammar::writes::compile_exists(&mut query)?;
        Ok(grammar::CompiledQuery::from_store(aql, &query.bindings))
    }

    /// Compile a query computing one aggregate over the matching rows
    ///
    /// Every function except [`AggregateFunction::Count`] needs a column.
    pub fn aggregate_query(
        &self,
        function: AggregateFunction,
        column: Option<&str>,
    ) -> Result<grammar::CompiledQuery> {
        self.check()?;
        if column.is_none() && function != AggregateFunction::Count {
            return Err(Error::invalid_argument(format!(
                "The {} aggregate requires a column.",
                function
            )));
        }
        let mut query = self.working_copy();
        query.aggregate = Some(Aggregate {
            function,
            column: column.filter(|c| *c != "*").map(str::to_string),
        });
        query.columns.clear();
        query.distinct = false;
        let aql = grammar::compile_query(&mut query)?;
        Ok(grammar::CompiledQuery::from_store(aql, &query.bindings))
    }
}

impl QueryBuilder for Builder {
    fn to_aql(&self) -> Result<String> {
        grammar::compile_select(self).map(|compiled| compiled.aql)
    }

    fn get_bindings(&self) -> Result<Bindings> {
        self.check()?;
        Ok(self.bindings.flatten())
    }

    fn clone_builder(&self) -> Self {
        self.clone()
    }
}

/// Whether sub-queries bound under `category` are evaluated inside the main FOR loop
fn runs_inside_loop(category: BindingCategory) -> bool {
    !matches!(
        category,
        BindingCategory::Variable | BindingCategory::From | BindingCategory::Union
    )
}

/// Split `"name as alias"` into its parts
pub(crate) fn split_alias(table: &str) -> (String, Option<String>) {
    let trimmed = table.trim();
    match common::split_as(trimmed) {
        Some((name, alias)) => (name.trim().to_string(), Some(alias.trim().to_string())),
        None => (trimmed.to_string(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table;

    #[test]
    fn test_basic_select() {
        let query = table("characters");
        assert_eq!(
            query.to_aql().unwrap(),
            "FOR characterDoc IN characters RETURN characterDoc"
        );
    }

    #[test]
    fn test_select_columns() {
        let query = table("characters").select(("id", "name"));
        assert_eq!(
            query.to_aql().unwrap(),
            "FOR characterDoc IN characters RETURN {id: characterDoc.`_key`, name: characterDoc.`name`}"
        );
    }

    #[test]
    fn test_select_with_alias() {
        let query = table("characters").select(("name as characterName", "surname"));
        assert_eq!(
            query.to_aql().unwrap(),
            "FOR characterDoc IN characters RETURN {characterName: characterDoc.`name`, surname: characterDoc.`surname`}"
        );
    }

    #[test]
    fn test_table_alias() {
        let query = table("characters as c").where_(("c.alive", true));
        let aql = query.to_aql().unwrap();
        let id = query.query_id();
        assert_eq!(
            aql,
            format!("FOR c IN characters FILTER c.`alive` == @{}_where_1 RETURN c", id)
        );
    }

    #[test]
    fn test_table_prefix() {
        let query = Builder::new().with_table_prefix("got_").from("characters");
        assert_eq!(
            query.to_aql().unwrap(),
            "FOR characterDoc IN got_characters RETURN characterDoc"
        );
    }

    #[test]
    fn test_missing_collection_fails() {
        let err = Builder::new().to_aql().unwrap_err();
        assert!(matches!(err, Error::Compilation { .. }));
    }

    #[test]
    fn test_distinct() {
        let query = table("characters").select("surname").distinct();
        assert_eq!(
            query.to_aql().unwrap(),
            "FOR characterDoc IN characters RETURN DISTINCT {surname: characterDoc.`surname`}"
        );
    }

    #[test]
    fn test_select_raw() {
        let query = table("characters").select_raw_as("LENGTH(characterDoc.`children`)", "childCount");
        assert_eq!(
            query.to_aql().unwrap(),
            "FOR characterDoc IN characters RETURN {childCount: LENGTH(characterDoc.`children`)}"
        );
    }

    #[test]
    fn test_set_variable() {
        let query = table("characters")
            .set("house", "Stark")
            .where_column("surname", "==", "house");
        let id = query.query_id();
        assert_eq!(
            query.to_aql().unwrap(),
            format!(
                "LET house = @{id}_variable_1 FOR characterDoc IN characters FILTER characterDoc.`surname` == house RETURN characterDoc"
            )
        );
    }

    #[test]
    fn test_set_sub_query_with_single_row() {
        let query = table("characters").set_sub("ned", |q: Builder| {
            q.from("characters").where_(("id", "NedStark")).limit(1)
        });
        let aql = query.to_aql().unwrap();
        assert!(aql.starts_with("LET ned = FIRST((FOR characterDoc IN characters FILTER"));
        assert!(aql.ends_with("LIMIT 1 RETURN characterDoc)) FOR characterDoc IN characters RETURN characterDoc"));
        assert_eq!(query.get_bindings().unwrap().len(), 1);
    }

    #[test]
    fn test_select_sub() {
        let query = table("characters").select_sub(
            |q: Builder| {
                q.from("locations")
                    .where_column("locations.id", "==", "characters.residence_id")
                    .select("name")
            },
            "residence",
        );
        assert_eq!(
            query.to_aql().unwrap(),
            "FOR characterDoc IN characters LET residence = (FOR locationDoc IN locations FILTER locationDoc.`_key` == characterDoc.`residence_id` RETURN locationDoc.`name`) RETURN {residence: residence}"
        );
    }

    #[test]
    fn test_from_sub() {
        let sub = table("characters").where_(("alive", true));
        let sub_id = sub.query_id();
        let query = table("ignored").from_sub(sub, "living");
        assert_eq!(
            query.to_aql().unwrap(),
            format!(
                "FOR living IN (FOR characterDoc IN characters FILTER characterDoc.`alive` == @{sub_id}_where_1 RETURN characterDoc) RETURN living"
            )
        );
        assert_eq!(
            query.bindings().get(BindingCategory::From).map(|b| b.len()),
            Some(1)
        );
    }

    #[test]
    fn test_select_drops_replaced_sub_select_bindings() {
        let query = table("characters")
            .select_sub(
                |q: Builder| q.from("locations").where_(("region", "North")).select("name"),
                "residence",
            )
            .select("name");
        assert!(query.get_bindings().unwrap().is_empty());
        assert_eq!(
            query.to_aql().unwrap(),
            "FOR characterDoc IN characters RETURN {name: characterDoc.`name`}"
        );
    }

    #[test]
    fn test_add_bindings_skips_expressions() {
        let query = table("characters").add_bindings(
            vec![
                Operand::Value(Value::from("Stark")),
                Operand::Expression(Expression::new("DATE_NOW()")),
                Operand::Value(Value::from(3)),
            ],
            "where",
        );
        let id = query.query_id();
        let bindings = query.get_bindings().unwrap();
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[&format!("{id}_where_1")], Value::from("Stark"));
        assert_eq!(bindings[&format!("{id}_where_2")], Value::from(3));

        let rejected = table("characters").add_bindings(vec![1, 2], "nope");
        assert!(matches!(rejected.error(), Some(Error::InvalidArgument { .. })));
    }

    #[test]
    fn test_unknown_binding_category_is_recorded() {
        let query = table("characters").add_binding(1, "nope");
        assert!(matches!(query.error(), Some(Error::InvalidArgument { .. })));
        assert!(query.to_aql().is_err());
        assert!(query.get_bindings().is_err());
    }

    #[test]
    fn test_compilation_is_idempotent() {
        let query = table("characters")
            .where_(("alive", true))
            .group_by("surname")
            .order_by("surname", "asc");
        let first = query.to_compiled().unwrap();
        let second = query.to_compiled().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_immutable_builder_pattern() {
        let base = table("characters").where_(("alive", true));
        let starks = base.clone().where_(("surname", "Stark"));
        let lannisters = base.clone().where_(("surname", "Lannister"));

        assert_ne!(starks.query_id(), lannisters.query_id());
        assert_eq!(base.get_bindings().unwrap().len(), 1);
        assert_eq!(starks.get_bindings().unwrap().len(), 2);
        assert_eq!(lannisters.get_bindings().unwrap().len(), 2);
    }

    #[test]
    fn test_exists_query() {
        let query = table("characters").where_(("surname", "Stark"));
        let id = query.query_id();
        let compiled = query.exists_query().unwrap();
        assert_eq!(
            compiled.aql,
            format!(
                "RETURN LENGTH((FOR characterDoc IN characters FILTER characterDoc.`surname` == @{id}_where_1 LIMIT 1 RETURN 1)) > 0"
            )
        );
        assert_eq!(compiled.bindings.len(), 1);
    }

    #[test]
    fn test_count_aggregate() {
        let query = table("characters").where_(("alive", true));
        let compiled = query.aggregate_query(AggregateFunction::Count, None).unwrap();
        assert!(compiled.aql.ends_with(
            "COLLECT WITH COUNT INTO aggregateResult RETURN {aggregate: aggregateResult}"
        ));
        // the builder itself is left untouched
        assert!(query.aggregate.is_none());
    }

    #[test]
    fn test_max_aggregate() {
        let compiled = table("characters")
            .select("name")
            .aggregate_query(AggregateFunction::Max, Some("age"))
            .unwrap();
        assert_eq!(
            compiled.aql,
            "FOR characterDoc IN characters COLLECT AGGREGATE aggregateResult = MAX(characterDoc.`age`) RETURN {aggregate: aggregateResult}"
        );
    }

    #[test]
    fn test_grouped_aggregate() {
        let compiled = table("characters")
            .group_by("surname")
            .aggregate_query(AggregateFunction::Avg, Some("age"))
            .unwrap();
        assert_eq!(
            compiled.aql,
            "FOR characterDoc IN characters COLLECT surname = characterDoc.`surname` AGGREGATE aggregateResult = AVG(characterDoc.`age`) RETURN {aggregate: aggregateResult}"
        );
    }

    #[test]
    fn test_aggregate_without_column_is_rejected() {
        let err = table("characters")
            .aggregate_query(AggregateFunction::Sum, None)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[test]
    fn test_compiled_bindings_match_placeholders() {
        let query = table("characters")
            .where_(("surname", "Stark"))
            .where_nested(|q| q)
            .set_bindings(
                [("stale".to_string(), Value::from(1))].into_iter().collect(),
                BindingCategory::Order,
            );
        let compiled = query.to_compiled().unwrap();
        assert_eq!(compiled.bindings.len(), 1);
        for name in compiled.bindings.keys() {
            assert!(compiled.aql.contains(&format!("@{name}")));
        }
    }

    #[test]
    fn test_split_alias() {
        assert_eq!(split_alias("characters AS c"), ("characters".to_string(), Some("c".to_string())));
        assert_eq!(split_alias(" characters "), ("characters".to_string(), None));
        assert_eq!(split_alias("İ as é"), ("İ".to_string(), Some("é".to_string())));
    }

    #[test]
    fn test_multibyte_table_alias() {
        let query = table("İ as é");
        assert_eq!(query.to_aql().unwrap(), "FOR é IN `İ` RETURN é");
    }
}
