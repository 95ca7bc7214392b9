//! Filter clauses (`FILTER` and post-`COLLECT` having conditions)

use super::common::{
    DatePart, IntoCondition, IntoOperand, IntoSubQuery, Operand, Where, WhereConnector,
    WhereKind,
};
use super::Builder;
use crate::bindings::BindingCategory;
use crate::value::{cast_binding, Expression};
use crate::{Error, IntoOperator, Operator, Value};

/// Which condition list a clause is appended to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConditionTarget {
    Where,
    Having,
}

impl ConditionTarget {
    fn category(self) -> BindingCategory {
        match self {
            ConditionTarget::Where => BindingCategory::Where,
            ConditionTarget::Having => BindingCategory::Having,
        }
    }
}

impl Builder {
    fn push_where(&mut self, kind: WhereKind, connector: WhereConnector, target: ConditionTarget) {
        let clause = Where { kind, connector };
        match target {
            ConditionTarget::Where => self.wheres.push(clause),
            ConditionTarget::Having => self.havings.push(clause),
        }
    }

    pub(crate) fn add_condition<C>(
        self,
        condition: C,
        connector: WhereConnector,
        target: ConditionTarget,
    ) -> Self
    where
        C: IntoCondition,
    {
        if self.error.is_some() {
            return self;
        }
        let (column, operator, operand) = condition.into_condition();
        match operator {
            Ok(operator) => self.dispatch_condition(column, operator, operand, connector, target),
            Err(err) => self.fail(err),
        }
    }

    /// Pick the clause kind from the operator and the shape of the value
    pub(crate) fn dispatch_condition(
        mut self,
        column: String,
        operator: Operator,
        operand: Operand,
        connector: WhereConnector,
        target: ConditionTarget,
    ) -> Self {
        if self.error.is_some() {
            return self;
        }
        let category = target.category();
        let operand = match operand {
            Operand::Value(value) => Operand::Value(cast_binding(value)),
            other => other,
        };

        let kind = match operand {
            Operand::Query(query) => {
                let mut query = self.adopt(*query, category);
                query.return_single_value = true;
                if operator.is_membership() {
                    WhereKind::InSub {
                        column,
                        query: Box::new(query),
                        not: operator == Operator::NOT_IN,
                    }
                } else {
                    WhereKind::Sub {
                        column,
                        operator,
                        query: Box::new(query),
                    }
                }
            }
            Operand::Value(Value::Null) => {
                if !operator.accepts_null() {
                    return self.fail(Error::invalid_argument(
                        "Illegal operator and value combination.",
                    ));
                }
                WhereKind::Null {
                    column,
                    not: operator == Operator::NEQ,
                }
            }
            operand if operator.is_membership() => {
                if !is_list_operand(&operand) {
                    return self.fail(Error::invalid_argument(format!(
                        "The {} operator requires an array or a sub-query.",
                        operator
                    )));
                }
                WhereKind::In {
                    column,
                    values: self.bind(operand, category),
                    not: operator == Operator::NOT_IN,
                }
            }
            operand if operator.is_bitwise() => WhereKind::Bitwise {
                column,
                operator,
                value: self.bind(operand, category),
            },
            operand => WhereKind::Basic {
                column,
                operator,
                value: self.bind(operand, category),
            },
        };

        self.push_where(kind, connector, target);
        self
    }

    /// Add a WHERE condition
    ///
    /// # Examples
    /// ```
    /// use aqueduct_core::{table, op};
    ///
    /// let query = table("characters")
    ///     .where_(("age", op::GT, 18))
    ///     .where_(("surname", "Stark"));
    /// ```
    pub fn where_<C>(self, condition: C) -> Self
    where
        C: IntoCondition,
    {
        self.add_condition(condition, WhereConnector::And, ConditionTarget::Where)
    }

    /// Add an OR WHERE condition
    pub fn or_where<C>(self, condition: C) -> Self
    where
        C: IntoCondition,
    {
        self.add_condition(condition, WhereConnector::Or, ConditionTarget::Where)
    }

    /// Add an AND WHERE condition (same as where)
    pub fn and_where<C>(self, condition: C) -> Self
    where
        C: IntoCondition,
    {
        self.where_(condition)
    }

    /// Compare two columns
    pub fn where_column<O>(self, first: &str, operator: O, second: &str) -> Self
    where
        O: IntoOperator,
    {
        self.add_column_condition(first, operator, second, WhereConnector::And)
    }

    pub fn or_where_column<O>(self, first: &str, operator: O, second: &str) -> Self
    where
        O: IntoOperator,
    {
        self.add_column_condition(first, operator, second, WhereConnector::Or)
    }

    fn add_column_condition<O>(
        mut self,
        first: &str,
        operator: O,
        second: &str,
        connector: WhereConnector,
    ) -> Self
    where
        O: IntoOperator,
    {
        if self.error.is_some() {
            return self;
        }
        let operator = match operator.into_operator() {
            Ok(operator) => operator,
            Err(err) => return self.fail(err),
        };
        self.push_where(
            WhereKind::Column {
                first: first.to_string(),
                operator,
                second: second.to_string(),
            },
            connector,
            ConditionTarget::Where,
        );
        self
    }

    /// Match any value of an array
    pub fn where_in(self, column: &str, values: impl Into<Value>) -> Self {
        self.add_in(column, values.into(), false, WhereConnector::And)
    }

    pub fn where_not_in(self, column: &str, values: impl Into<Value>) -> Self {
        self.add_in(column, values.into(), true, WhereConnector::And)
    }

    pub fn or_where_in(self, column: &str, values: impl Into<Value>) -> Self {
        self.add_in(column, values.into(), false, WhereConnector::Or)
    }

    pub fn or_where_not_in(self, column: &str, values: impl Into<Value>) -> Self {
        self.add_in(column, values.into(), true, WhereConnector::Or)
    }

    fn add_in(self, column: &str, values: Value, not: bool, connector: WhereConnector) -> Self {
        if self.error.is_some() {
            return self;
        }
        let operator = if not { Operator::NOT_IN } else { Operator::IN };
        self.dispatch_condition(
            column.to_string(),
            operator,
            Operand::Value(values),
            connector,
            ConditionTarget::Where,
        )
    }

    /// Match any value returned by a sub-query
    pub fn where_in_sub<Q>(self, column: &str, sub: Q) -> Self
    where
        Q: IntoSubQuery,
    {
        self.add_in_sub(column, sub, false)
    }

    pub fn where_not_in_sub<Q>(self, column: &str, sub: Q) -> Self
    where
        Q: IntoSubQuery,
    {
        self.add_in_sub(column, sub, true)
    }

    fn add_in_sub<Q>(mut self, column: &str, sub: Q, not: bool) -> Self
    where
        Q: IntoSubQuery,
    {
        if self.error.is_some() {
            return self;
        }
        let mut query = self.adopt(sub, BindingCategory::Where);
        query.return_single_value = true;
        self.push_where(
            WhereKind::InSub {
                column: column.to_string(),
                query: Box::new(query),
                not,
            },
            WhereConnector::And,
            ConditionTarget::Where,
        );
        self
    }

    /// Inline a list of integers instead of binding it
    pub fn where_integer_in_raw(mut self, column: &str, values: &[i64]) -> Self {
        if self.error.is_some() {
            return self;
        }
        self.push_where(
            WhereKind::InRaw {
                column: column.to_string(),
                values: values.to_vec(),
                not: false,
            },
            WhereConnector::And,
            ConditionTarget::Where,
        );
        self
    }

    pub fn where_integer_not_in_raw(mut self, column: &str, values: &[i64]) -> Self {
        if self.error.is_some() {
            return self;
        }
        self.push_where(
            WhereKind::InRaw {
                column: column.to_string(),
                values: values.to_vec(),
                not: true,
            },
            WhereConnector::And,
            ConditionTarget::Where,
        );
        self
    }

    pub fn where_null(self, column: &str) -> Self {
        self.add_null(column, false, WhereConnector::And, ConditionTarget::Where)
    }

    pub fn where_not_null(self, column: &str) -> Self {
        self.add_null(column, true, WhereConnector::And, ConditionTarget::Where)
    }

    pub fn or_where_null(self, column: &str) -> Self {
        self.add_null(column, false, WhereConnector::Or, ConditionTarget::Where)
    }

    pub fn or_where_not_null(self, column: &str) -> Self {
        self.add_null(column, true, WhereConnector::Or, ConditionTarget::Where)
    }

    pub(crate) fn add_null(
        mut self,
        column: &str,
        not: bool,
        connector: WhereConnector,
        target: ConditionTarget,
    ) -> Self {
        self.push_where(
            WhereKind::Null {
                column: column.to_string(),
                not,
            },
            connector,
            target,
        );
        self
    }

    /// Inclusive range; `values` must hold exactly two elements
    pub fn where_between(self, column: &str, values: impl Into<Value>) -> Self {
        self.add_between(column, values.into(), false, WhereConnector::And, ConditionTarget::Where)
    }

    pub fn where_not_between(self, column: &str, values: impl Into<Value>) -> Self {
        self.add_between(column, values.into(), true, WhereConnector::And, ConditionTarget::Where)
    }

    pub fn or_where_between(self, column: &str, values: impl Into<Value>) -> Self {
        self.add_between(column, values.into(), false, WhereConnector::Or, ConditionTarget::Where)
    }

    pub(crate) fn add_between(
        mut self,
        column: &str,
        values: Value,
        not: bool,
        connector: WhereConnector,
        target: ConditionTarget,
    ) -> Self {
        if self.error.is_some() {
            return self;
        }
        let bounds = match cast_binding(values) {
            Value::Array(items) if items.len() == 2 => items,
            _ => {
                return self.fail(Error::invalid_argument(
                    "Between conditions require exactly two values.",
                ))
            }
        };
        let mut bounds = bounds.into_iter();
        let (Some(low), Some(high)) = (bounds.next(), bounds.next()) else {
            return self;
        };

        let category = target.category();
        let low = self.bind(Operand::Value(low), category);
        let high = self.bind(Operand::Value(high), category);
        self.push_where(
            WhereKind::Between {
                column: column.to_string(),
                low,
                high,
                not,
            },
            connector,
            target,
        );
        self
    }

    /// Group conditions in parentheses
    ///
    /// # Examples
    /// ```
    /// use aqueduct_core::table;
    ///
    /// let query = table("characters")
    ///     .where_(("alive", true))
    ///     .where_nested(|q| q.where_(("surname", "Stark")).or_where(("surname", "Snow")));
    /// ```
    pub fn where_nested<F>(self, f: F) -> Self
    where
        F: FnOnce(Builder) -> Builder,
    {
        self.add_nested(f, WhereConnector::And)
    }

    pub fn or_where_nested<F>(self, f: F) -> Self
    where
        F: FnOnce(Builder) -> Builder,
    {
        self.add_nested(f, WhereConnector::Or)
    }

    fn add_nested<F>(mut self, f: F, connector: WhereConnector) -> Self
    where
        F: FnOnce(Builder) -> Builder,
    {
        if self.error.is_some() {
            return self;
        }
        let nested = f(self.for_nested_where());
        self.absorb(&nested, BindingCategory::Where);
        if nested.wheres.is_empty() {
            return self;
        }
        self.push_where(
            WhereKind::Nested {
                query: Box::new(nested),
            },
            connector,
            ConditionTarget::Where,
        );
        self
    }

    /// Require a sub-query to return at least one row
    pub fn where_exists<Q>(self, sub: Q) -> Self
    where
        Q: IntoSubQuery,
    {
        self.add_exists(sub, false, WhereConnector::And)
    }

    pub fn where_not_exists<Q>(self, sub: Q) -> Self
    where
        Q: IntoSubQuery,
    {
        self.add_exists(sub, true, WhereConnector::And)
    }

    pub fn or_where_exists<Q>(self, sub: Q) -> Self
    where
        Q: IntoSubQuery,
    {
        self.add_exists(sub, false, WhereConnector::Or)
    }

    fn add_exists<Q>(mut self, sub: Q, not: bool, connector: WhereConnector) -> Self
    where
        Q: IntoSubQuery,
    {
        if self.error.is_some() {
            return self;
        }
        let query = self.adopt(sub, BindingCategory::Where);
        self.push_where(
            WhereKind::Exists {
                query: Box::new(query),
                not,
            },
            connector,
            ConditionTarget::Where,
        );
        self
    }

    /// Compare a column with the value computed by a sub-query
    pub fn where_sub<O, Q>(mut self, column: &str, operator: O, sub: Q) -> Self
    where
        O: IntoOperator,
        Q: IntoSubQuery,
    {
        if self.error.is_some() {
            return self;
        }
        let operator = match operator.into_operator() {
            Ok(operator) => operator,
            Err(err) => return self.fail(err),
        };
        let mut query = self.adopt(sub, BindingCategory::Where);
        query.return_single_value = true;
        let kind = if operator.is_membership() {
            WhereKind::InSub {
                column: column.to_string(),
                query: Box::new(query),
                not: operator == Operator::NOT_IN,
            }
        } else {
            WhereKind::Sub {
                column: column.to_string(),
                operator,
                query: Box::new(query),
            }
        };
        self.push_where(kind, WhereConnector::And, ConditionTarget::Where);
        self
    }

    /// Add a trusted AQL condition verbatim
    pub fn where_raw(mut self, aql: impl Into<String>) -> Self {
        if self.error.is_some() {
            return self;
        }
        self.push_where(
            WhereKind::Expression {
                aql: Expression::new(aql),
            },
            WhereConnector::And,
            ConditionTarget::Where,
        );
        self
    }

    pub fn or_where_raw(mut self, aql: impl Into<String>) -> Self {
        if self.error.is_some() {
            return self;
        }
        self.push_where(
            WhereKind::Expression {
                aql: Expression::new(aql),
            },
            WhereConnector::Or,
            ConditionTarget::Where,
        );
        self
    }

    /// Match documents whose array attribute contains the value (all values for arrays)
    pub fn where_json_contains(self, column: &str, value: impl Into<Value>) -> Self {
        self.add_json_contains(column, value.into(), false)
    }

    pub fn where_json_doesnt_contain(self, column: &str, value: impl Into<Value>) -> Self {
        self.add_json_contains(column, value.into(), true)
    }

    fn add_json_contains(mut self, column: &str, value: Value, not: bool) -> Self {
        if self.error.is_some() {
            return self;
        }
        let value = cast_binding(value);
        let all = matches!(value, Value::Array(_));
        let value = self.bind(Operand::Value(value), BindingCategory::Where);
        self.push_where(
            WhereKind::JsonContains {
                column: column.to_string(),
                value,
                all,
                not,
            },
            WhereConnector::And,
            ConditionTarget::Where,
        );
        self
    }

    /// Compare the length of an array attribute
    pub fn where_json_length<O, V>(mut self, column: &str, operator: O, value: V) -> Self
    where
        O: IntoOperator,
        V: IntoOperand,
    {
        if self.error.is_some() {
            return self;
        }
        let operator = match operator.into_operator() {
            Ok(operator) => operator,
            Err(err) => return self.fail(err),
        };
        let value = self.bind(value.into_operand(), BindingCategory::Where);
        self.push_where(
            WhereKind::JsonLength {
                column: column.to_string(),
                operator,
                value,
            },
            WhereConnector::And,
            ConditionTarget::Where,
        );
        self
    }

    pub fn where_date<O, V>(self, column: &str, operator: O, value: V) -> Self
    where
        O: IntoOperator,
        V: IntoOperand,
    {
        self.add_date(DatePart::Date, column, operator, value)
    }

    pub fn where_time<O, V>(self, column: &str, operator: O, value: V) -> Self
    where
        O: IntoOperator,
        V: IntoOperand,
    {
        self.add_date(DatePart::Time, column, operator, value)
    }

    pub fn where_year<O, V>(self, column: &str, operator: O, value: V) -> Self
    where
        O: IntoOperator,
        V: IntoOperand,
    {
        self.add_date(DatePart::Year, column, operator, value)
    }

    pub fn where_month<O, V>(self, column: &str, operator: O, value: V) -> Self
    where
        O: IntoOperator,
        V: IntoOperand,
    {
        self.add_date(DatePart::Month, column, operator, value)
    }

    pub fn where_day<O, V>(self, column: &str, operator: O, value: V) -> Self
    where
        O: IntoOperator,
        V: IntoOperand,
    {
        self.add_date(DatePart::Day, column, operator, value)
    }

    fn add_date<O, V>(mut self, part: DatePart, column: &str, operator: O, value: V) -> Self
    where
        O: IntoOperator,
        V: IntoOperand,
    {
        if self.error.is_some() {
            return self;
        }
        let operator = match operator.into_operator() {
            Ok(operator) => operator,
            Err(err) => return self.fail(err),
        };
        let value = self.bind(value.into_operand(), BindingCategory::Where);
        self.push_where(
            WhereKind::Date {
                part,
                column: column.to_string(),
                operator,
                value,
            },
            WhereConnector::And,
            ConditionTarget::Where,
        );
        self
    }

    /// Pattern match with `%` and `_` wildcards
    pub fn where_like(self, column: &str, value: impl Into<Value>, case_sensitive: bool) -> Self {
        let operator = if case_sensitive {
            Operator::LIKE
        } else {
            Operator::ILIKE
        };
        self.dispatch_condition(
            column.to_string(),
            operator,
            Operand::Value(value.into()),
            WhereConnector::And,
            ConditionTarget::Where,
        )
    }

    pub fn or_where_like(self, column: &str, value: impl Into<Value>, case_sensitive: bool) -> Self {
        let operator = if case_sensitive {
            Operator::LIKE
        } else {
            Operator::ILIKE
        };
        self.dispatch_condition(
            column.to_string(),
            operator,
            Operand::Value(value.into()),
            WhereConnector::Or,
            ConditionTarget::Where,
        )
    }

    pub fn where_not_like(self, column: &str, value: impl Into<Value>) -> Self {
        self.dispatch_condition(
            column.to_string(),
            Operator::NOT_LIKE,
            Operand::Value(value.into()),
            WhereConnector::And,
            ConditionTarget::Where,
        )
    }
}

fn is_list_operand(operand: &Operand) -> bool {
    match operand {
        Operand::Value(Value::Array(_)) => true,
        Operand::Value(_) => false,
        Operand::Expression(_) | Operand::Column(_) | Operand::Query(_) => true,
    }
}
