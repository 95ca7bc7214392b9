//! UPDATE statements

use super::common::{IntoUpdateData, Operand};
use super::Builder;
use crate::alias::normalize_column;
use crate::bindings::BindingCategory;
use crate::grammar::{self, CompiledQuery};
use crate::value::Expression;
use crate::{Error, Result, Value};

impl Builder {
    /// Compile an update of every matching document
    ///
    /// Keys written as `options->lang` update nested attributes; `id` is
    /// stored as `_key`.
    ///
    /// # Examples
    /// ```
    /// use aqueduct_core::table;
    ///
    /// let compiled = table("characters")
    ///     .where_(("id", "NedStark"))
    ///     .update_query(vec![("alive", false)])
    ///     .unwrap();
    /// assert!(compiled.aql.contains("UPDATE characterDoc WITH {alive: @"));
    /// ```
    pub fn update_query<U>(&self, values: U) -> Result<CompiledQuery>
    where
        U: IntoUpdateData,
    {
        self.check()?;
        let values = values.into_update_data()?;
        if values.is_empty() {
            return Err(Error::invalid_argument(
                "Update requires at least one attribute.",
            ));
        }
        let mut query = self.working_copy();
        let aql = grammar::writes::compile_update(&mut query, values)?;
        Ok(CompiledQuery::from_store(aql, &query.bindings))
    }

    /// Add `amount` to a numeric attribute of every matching document
    pub fn increment_query(&self, column: &str, amount: impl Into<Value>) -> Result<CompiledQuery> {
        self.adjust(column, amount.into(), "+")
    }

    /// Subtract `amount` from a numeric attribute of every matching document
    pub fn decrement_query(&self, column: &str, amount: impl Into<Value>) -> Result<CompiledQuery> {
        self.adjust(column, amount.into(), "-")
    }

    fn adjust(&self, column: &str, amount: Value, sign: &str) -> Result<CompiledQuery> {
        self.check()?;
        if !matches!(
            amount,
            Value::I32(_) | Value::I64(_) | Value::F32(_) | Value::F64(_)
        ) {
            return Err(Error::invalid_argument(
                "Non-numeric value passed to increment method.",
            ));
        }
        let mut query = self.working_copy();
        let target = normalize_column(&query, column);
        let placeholder = query.bindings.add(amount, BindingCategory::Update);
        let expression = Expression::new(format!("{} {} @{}", target, sign, placeholder));
        let aql = grammar::writes::compile_update(
            &mut query,
            vec![(column.to_string(), Operand::Expression(expression))],
        )?;
        Ok(CompiledQuery::from_store(aql, &query.bindings))
    }
}
