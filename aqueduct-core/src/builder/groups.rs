//! Grouping (`COLLECT`) and having conditions

use super::common::{
    ColumnSelector, GroupKey, IntoColumnSelectors, IntoCondition, Where, WhereConnector, WhereKind,
};
use super::wheres::ConditionTarget;
use super::Builder;
use crate::value::Expression;
use crate::Value;

impl Builder {
    /// Group by one or more columns
    ///
    /// # Examples
    /// ```
    /// use aqueduct_core::{table, QueryBuilder};
    ///
    /// let query = table("characters").group_by("surname");
    /// assert_eq!(
    ///     query.to_aql().unwrap(),
    ///     "FOR characterDoc IN characters COLLECT surname = characterDoc.`surname` RETURN {surname: surname}"
    /// );
    /// ```
    pub fn group_by<C>(mut self, columns: C) -> Self
    where
        C: IntoColumnSelectors,
    {
        for selector in columns.into_column_selectors() {
            match selector {
                ColumnSelector::Column(column) | ColumnSelector::Aliased { column, .. } => {
                    self.groups.push(GroupKey::Column(column))
                }
                ColumnSelector::Raw { expression, .. } => self.groups.push(GroupKey::Raw(expression)),
                ColumnSelector::Documents(_) | ColumnSelector::Sub { .. } => {}
            }
        }
        self
    }

    /// Add a trusted `variable = expression` grouping key
    pub fn group_by_raw(mut self, aql: impl Into<String>) -> Self {
        self.groups.push(GroupKey::Raw(Expression::new(aql)));
        self
    }

    /// Filter grouped results
    pub fn having<C>(self, condition: C) -> Self
    where
        C: IntoCondition,
    {
        self.add_condition(condition, WhereConnector::And, ConditionTarget::Having)
    }

    pub fn or_having<C>(self, condition: C) -> Self
    where
        C: IntoCondition,
    {
        self.add_condition(condition, WhereConnector::Or, ConditionTarget::Having)
    }

    /// Add a trusted AQL having condition verbatim
    pub fn having_raw(mut self, aql: impl Into<String>) -> Self {
        if self.error.is_some() {
            return self;
        }
        self.havings.push(Where {
            kind: WhereKind::Expression {
                aql: Expression::new(aql),
            },
            connector: WhereConnector::And,
        });
        self
    }

    pub fn having_between(self, column: &str, values: impl Into<Value>) -> Self {
        self.add_between(
            column,
            values.into(),
            false,
            WhereConnector::And,
            ConditionTarget::Having,
        )
    }

    pub fn having_null(self, column: &str) -> Self {
        self.add_null(column, false, WhereConnector::And, ConditionTarget::Having)
    }

    pub fn having_not_null(self, column: &str) -> Self {
        self.add_null(column, true, WhereConnector::And, ConditionTarget::Having)
    }
}

#[cfg(test)]
mod tests {
    use crate::{table, QueryBuilder};

    #[test]
    fn test_group_by_single_column() {
        let query = table("characters").group_by("surname");
        assert_eq!(
            query.to_aql().unwrap(),
            "FOR characterDoc IN characters COLLECT surname = characterDoc.`surname` RETURN {surname: surname}"
        );
    }

    #[test]
    fn test_group_by_multiple_columns() {
        let query = table("characters")
            .group_by(("surname", "alive"))
            .select(("surname", "alive"));
        assert_eq!(
            query.to_aql().unwrap(),
            "FOR characterDoc IN characters COLLECT surname = characterDoc.`surname`, alive = characterDoc.`alive` RETURN {surname: surname, alive: alive}"
        );
    }

    #[test]
    fn test_group_keeps_non_grouped_columns() {
        let query = table("characters").group_by("surname").select(("surname", "name"));
        assert_eq!(
            query.to_aql().unwrap(),
            "FOR characterDoc IN characters COLLECT surname = characterDoc.`surname` INTO groupsVariable = {name: characterDoc.`name`} RETURN {surname: surname, name: groupsVariable[*].`name`}"
        );
    }

    #[test]
    fn test_having_uses_group_variable() {
        let query = table("characters")
            .group_by("surname")
            .having(("surname", "!=", "Frey"));
        let id = query.query_id();
        assert_eq!(
            query.to_aql().unwrap(),
            format!(
                "FOR characterDoc IN characters COLLECT surname = characterDoc.`surname` FILTER surname != @{id}_having_1 RETURN {{surname: surname}}"
            )
        );
    }

    #[test]
    fn test_having_between_and_null() {
        let query = table("characters")
            .group_by("age")
            .having_between("age", vec![10, 20])
            .having_not_null("age");
        let id = query.query_id();
        assert_eq!(
            query.to_aql().unwrap(),
            format!(
                "FOR characterDoc IN characters COLLECT age = characterDoc.`age` FILTER (age >= @{id}_having_1 AND age <= @{id}_having_2) AND age != null RETURN {{age: age}}"
            )
        );
    }

    #[test]
    fn test_group_by_raw() {
        let query = table("characters")
            .group_by_raw("born = DATE_YEAR(characterDoc.`born_at`)")
            .select_raw_as("born", "year");
        assert_eq!(
            query.to_aql().unwrap(),
            "FOR characterDoc IN characters COLLECT born = DATE_YEAR(characterDoc.`born_at`) RETURN {year: born}"
        );
    }
}
