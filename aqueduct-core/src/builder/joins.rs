//! Joins, expressed as additional FOR loops

use super::common::{FromClause, IntoCondition, IntoSubQuery, JoinType};
use super::{split_alias, Builder};
use crate::bindings::BindingCategory;
use crate::{Error, IntoOperator, Value};

/// A joined collection or sub-query together with its `on` conditions
///
/// The conditions live on an inner builder whose main loop is the joined
/// source, so they are compiled exactly like top-level filters.
#[derive(Debug, Clone)]
pub struct JoinClause {
    pub(crate) join_type: JoinType,
    pub(crate) query: Builder,
}

impl JoinClause {
    pub fn join_type(&self) -> JoinType {
        self.join_type
    }

    /// Document variable of the joined source
    pub fn alias(&self) -> &str {
        self.query.default_alias().unwrap_or_default()
    }

    /// Compare a column of the joined source with another column
    pub fn on<O>(mut self, first: &str, operator: O, second: &str) -> Self
    where
        O: IntoOperator,
    {
        self.query = self.query.where_column(first, operator, second);
        self
    }

    pub fn or_on<O>(mut self, first: &str, operator: O, second: &str) -> Self
    where
        O: IntoOperator,
    {
        self.query = self.query.or_where_column(first, operator, second);
        self
    }

    /// Compare a column of the joined source with a bound value
    pub fn where_<C>(mut self, condition: C) -> Self
    where
        C: IntoCondition,
    {
        self.query = self.query.where_(condition);
        self
    }

    pub fn or_where<C>(mut self, condition: C) -> Self
    where
        C: IntoCondition,
    {
        self.query = self.query.or_where(condition);
        self
    }

    pub fn where_in(mut self, column: &str, values: impl Into<Value>) -> Self {
        self.query = self.query.where_in(column, values);
        self
    }

    pub fn where_null(mut self, column: &str) -> Self {
        self.query = self.query.where_null(column);
        self
    }

    pub fn where_not_null(mut self, column: &str) -> Self {
        self.query = self.query.where_not_null(column);
        self
    }
}

impl Builder {
    /// Build a join clause over a collection, registering its alias on this builder
    fn new_join(&mut self, join_type: JoinType, table: &str) -> JoinClause {
        let (name, alias) = split_alias(table);
        let alias = self.aliases.register_table_alias(&name, alias.as_deref());
        let mut query = self.for_sub_query();
        query.from = Some(FromClause::Collection { name, alias });
        JoinClause { join_type, query }
    }

    fn new_sub_join<Q>(&mut self, join_type: JoinType, sub: Q, alias: &str) -> JoinClause
    where
        Q: IntoSubQuery,
    {
        let sub = self.adopt(sub, BindingCategory::Join);
        let alias = if alias.is_empty() {
            self.aliases.register_sub_query_alias(sub.query_id())
        } else {
            self.aliases.register_table_alias(alias, Some(alias))
        };
        let mut query = self.for_sub_query();
        query.from = Some(FromClause::Sub {
            query: Box::new(sub),
            alias,
        });
        JoinClause { join_type, query }
    }

    fn push_join(mut self, join: JoinClause) -> Self {
        self.absorb(&join.query, BindingCategory::Join);
        self.joins.push(join);
        self
    }

    /// Add an INNER JOIN
    ///
    /// # Examples
    /// ```
    /// use aqueduct_core::{table, QueryBuilder};
    ///
    /// let query = table("characters").join("locations", "characters.residence_id", "=", "locations.id");
    /// assert_eq!(
    ///     query.to_aql().unwrap(),
    ///     "FOR characterDoc IN characters FOR locationDoc IN locations FILTER characterDoc.`residence_id` == locationDoc.`_key` RETURN MERGE(characterDoc, locationDoc)"
    /// );
    /// ```
    pub fn join<O>(mut self, table: &str, first: &str, operator: O, second: &str) -> Self
    where
        O: IntoOperator,
    {
        if self.error.is_some() {
            return self;
        }
        let join = self.new_join(JoinType::Inner, table).on(first, operator, second);
        self.push_join(join)
    }

    /// Add an INNER JOIN with conditions built by a closure
    pub fn join_with<F>(mut self, table: &str, f: F) -> Self
    where
        F: FnOnce(JoinClause) -> JoinClause,
    {
        if self.error.is_some() {
            return self;
        }
        let join = f(self.new_join(JoinType::Inner, table));
        self.push_join(join)
    }

    /// Add a LEFT JOIN; documents without a match are kept with an empty partner
    pub fn left_join<O>(mut self, table: &str, first: &str, operator: O, second: &str) -> Self
    where
        O: IntoOperator,
    {
        if self.error.is_some() {
            return self;
        }
        let join = self.new_join(JoinType::Left, table).on(first, operator, second);
        self.push_join(join)
    }

    pub fn left_join_with<F>(mut self, table: &str, f: F) -> Self
    where
        F: FnOnce(JoinClause) -> JoinClause,
    {
        if self.error.is_some() {
            return self;
        }
        let join = f(self.new_join(JoinType::Left, table));
        self.push_join(join)
    }

    /// Add a CROSS JOIN
    pub fn cross_join(mut self, table: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        let join = self.new_join(JoinType::Cross, table);
        self.push_join(join)
    }

    /// Join the result of a sub-query
    pub fn join_sub<Q, O>(
        mut self,
        sub: Q,
        alias: &str,
        first: &str,
        operator: O,
        second: &str,
    ) -> Self
    where
        Q: IntoSubQuery,
        O: IntoOperator,
    {
        if self.error.is_some() {
            return self;
        }
        let join = self
            .new_sub_join(JoinType::Inner, sub, alias)
            .on(first, operator, second);
        self.push_join(join)
    }

    pub fn left_join_sub<Q, O>(
        mut self,
        sub: Q,
        alias: &str,
        first: &str,
        operator: O,
        second: &str,
    ) -> Self
    where
        Q: IntoSubQuery,
        O: IntoOperator,
    {
        if self.error.is_some() {
            return self;
        }
        let join = self
            .new_sub_join(JoinType::Left, sub, alias)
            .on(first, operator, second);
        self.push_join(join)
    }

    /// AQL has no right outer join; swap the collections and use a left join
    pub fn right_join<O>(self, _table: &str, _first: &str, _operator: O, _second: &str) -> Self
    where
        O: IntoOperator,
    {
        self.fail(Error::unsupported(
            "right join: swap the collections and use left_join",
        ))
    }

    pub fn right_join_sub<Q, O>(
        self,
        _sub: Q,
        _alias: &str,
        _first: &str,
        _operator: O,
        _second: &str,
    ) -> Self
    where
        Q: IntoSubQuery,
        O: IntoOperator,
    {
        self.fail(Error::unsupported(
            "right join: swap the collections and use left_join_sub",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{table, QueryBuilder};

    #[test]
    fn test_inner_join() {
        let query = table("characters").join(
            "locations",
            "characters.residence_id",
            "==",
            "locations.id",
        );
        assert_eq!(
            query.to_aql().unwrap(),
            "FOR characterDoc IN characters FOR locationDoc IN locations FILTER characterDoc.`residence_id` == locationDoc.`_key` RETURN MERGE(characterDoc, locationDoc)"
        );
        assert_eq!(query.aliases().get_table_alias("locations"), Some("locationDoc"));
    }

    #[test]
    fn test_left_join() {
        let query = table("characters").left_join(
            "locations",
            "characters.residence_id",
            "=",
            "locations.id",
        );
        assert_eq!(
            query.to_aql().unwrap(),
            "FOR characterDoc IN characters LET locationDocList = (FOR locationDoc IN locations FILTER characterDoc.`residence_id` == locationDoc.`_key` RETURN locationDoc) FOR locationDoc IN (LENGTH(locationDocList) > 0) ? locationDocList : [{}] RETURN MERGE(characterDoc, locationDoc)"
        );
    }

    #[test]
    fn test_join_with_bound_condition() {
        let query = table("characters").join_with("locations", |join| {
            join.on("characters.residence_id", "==", "locations.id")
                .where_(("locations.region", "North"))
        });
        let bindings = query.get_bindings().unwrap();
        assert_eq!(bindings.len(), 1);
        let name = bindings.keys().next().unwrap().clone();
        assert_eq!(
            query.to_aql().unwrap(),
            format!(
                "FOR characterDoc IN characters FOR locationDoc IN locations FILTER characterDoc.`residence_id` == locationDoc.`_key` AND locationDoc.`region` == @{name} RETURN MERGE(characterDoc, locationDoc)"
            )
        );
        assert!(query.bindings().get(BindingCategory::Join).is_some_and(|b| b.contains_key(&name)));
    }

    #[test]
    fn test_cross_join() {
        let query = table("characters").cross_join("houses").select(("characters.name", "houses.name as house"));
        assert_eq!(
            query.to_aql().unwrap(),
            "FOR characterDoc IN characters FOR houseDoc IN houses RETURN {name: characterDoc.`name`, house: houseDoc.`name`}"
        );
    }

    #[test]
    fn test_join_sub() {
        let rulers = table("characters").where_not_null("rules");
        let query = table("locations").join_sub(rulers, "rulers", "rulers.residence_id", "==", "locations.id");
        let aql = query.to_aql().unwrap();
        assert_eq!(
            aql,
            "FOR locationDoc IN locations FOR rulers IN (FOR characterDoc IN characters FILTER characterDoc.`rules` != null RETURN characterDoc) FILTER rulers.`residence_id` == locationDoc.`_key` RETURN MERGE(locationDoc, rulers)"
        );
    }

    #[test]
    fn test_right_join_is_unsupported() {
        let query = table("characters").right_join("locations", "characters.residence_id", "==", "locations.id");
        assert!(matches!(query.error(), Some(Error::Unsupported { .. })));
        assert!(matches!(query.to_aql(), Err(Error::Unsupported { .. })));
    }

    #[test]
    fn test_join_alias_visible_to_later_clauses() {
        let query = table("characters")
            .join("locations as l", "characters.residence_id", "==", "l.id")
            .where_(("l.region", "North"))
            .select(("name", "l.name as residence"));
        let aql = query.to_aql().unwrap();
        assert!(aql.contains("FOR l IN locations FILTER characterDoc.`residence_id` == l.`_key`"));
        assert!(aql.contains("FILTER l.`region` == @"));
        assert!(aql.ends_with("RETURN {name: characterDoc.`name`, residence: l.`name`}"));
    }
}
