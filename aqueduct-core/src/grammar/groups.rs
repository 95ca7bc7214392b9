//! COLLECT statements for grouping and aggregation
//!
//! After COLLECT only the group variables are in scope. Selected columns that
//! are not grouped are collected into `groupsVariable` and read back from it
//! as arrays.

use super::object_literal;
use crate::alias::{attribute_name, normalize_column, wrap_attribute};
use crate::builder::{AggregateFunction, Builder, ColumnSelector, GroupKey};
use crate::{Error, Result};

/// Variable holding the aggregate result
pub const AGGREGATE_VARIABLE: &str = "aggregateResult";

/// Variable collecting the non-grouped columns of each group
pub const GROUPS_VARIABLE: &str = "groupsVariable";

/// Compile COLLECT and register its variables on the working copy
///
/// Returns the clause and the group variable names in key order.
pub(crate) fn compile_groups(query: &mut Builder) -> Result<Option<(String, Vec<String>)>> {
    if query.groups.is_empty() && query.aggregate.is_none() {
        return Ok(None);
    }

    // expressions are resolved against the documents before any group
    // variable shadows a column name
    let mut keys: Vec<(String, String, Option<String>)> = Vec::with_capacity(query.groups.len());
    for group in &query.groups {
        match group {
            GroupKey::Column(column) => keys.push((
                attribute_name(column),
                normalize_column(query, column),
                Some(column.clone()),
            )),
            GroupKey::Raw(expression) => {
                let (variable, aql) = expression.as_str().split_once('=').ok_or_else(|| {
                    Error::compilation(format!(
                        "Raw group key '{}' must have the form `variable = expression`.",
                        expression
                    ))
                })?;
                keys.push((variable.trim().to_string(), aql.trim().to_string(), None));
            }
        }
    }

    let aggregate = match &query.aggregate {
        Some(aggregate) => Some(match (&aggregate.column, aggregate.function) {
            (None, AggregateFunction::Count) => format!("WITH COUNT INTO {}", AGGREGATE_VARIABLE),
            (Some(column), function) => format!(
                "AGGREGATE {} = {}({})",
                AGGREGATE_VARIABLE,
                function,
                normalize_column(query, column)
            ),
            (None, function) => {
                return Err(Error::compilation(format!(
                    "The {} aggregate requires a column.",
                    function
                )))
            }
        }),
        None => None,
    };

    let candidates: Vec<(String, String, String)> = query
        .columns
        .iter()
        .filter_map(|selector| match selector {
            ColumnSelector::Column(column) => Some((column.clone(), attribute_name(column))),
            ColumnSelector::Aliased { column, alias } => Some((column.clone(), alias.clone())),
            _ => None,
        })
        .map(|(column, key)| {
            let expression = normalize_column(query, &column);
            (column, key, expression)
        })
        .collect();

    let variables: Vec<String> = keys.iter().map(|(variable, ..)| variable.clone()).collect();
    for (variable, _, column) in &keys {
        let reference = column.as_deref().unwrap_or(variable).replace("->", ".");
        query.aliases.register_variable(&reference, variable);
    }

    let mut clause = String::from("COLLECT");
    if !keys.is_empty() {
        let assignments = keys
            .iter()
            .map(|(variable, expression, _)| format!("{} = {}", variable, expression))
            .collect::<Vec<_>>()
            .join(", ");
        clause.push(' ');
        clause.push_str(&assignments);
    }

    if let Some(aggregate) = aggregate {
        query
            .aliases
            .register_variable(AGGREGATE_VARIABLE, AGGREGATE_VARIABLE);
        clause.push(' ');
        clause.push_str(&aggregate);
        return Ok(Some((clause, variables)));
    }

    let kept: Vec<(String, String, String)> = candidates
        .into_iter()
        .filter(|(column, ..)| !variables.contains(&normalize_column(query, column)))
        .collect();
    if !kept.is_empty() {
        let entries: Vec<(&str, &str)> = kept
            .iter()
            .map(|(_, key, expression)| (key.as_str(), expression.as_str()))
            .collect();
        clause.push_str(&format!(" INTO {} = {}", GROUPS_VARIABLE, object_literal(&entries)));
        for (column, key, _) in &kept {
            query.aliases.register_variable(
                &column.replace("->", "."),
                &format!("{}[*].{}", GROUPS_VARIABLE, wrap_attribute(key)),
            );
        }
    }

    Ok(Some((clause, variables)))
}
