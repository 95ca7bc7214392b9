//! RETURN projections
//!
//! Precedence: an aggregate result, a bare value for single-value
//! sub-queries, whole documents, an object literal of attributes, or a MERGE
//! of documents and attributes.

use super::groups::AGGREGATE_VARIABLE;
use super::{compile_sub_query_value, object_literal};
use crate::alias::{attribute_name, normalize_column};
use crate::builder::{Builder, ColumnSelector};
use crate::Result;

/// LET statements for sub-queries in the projection
pub(crate) fn compile_sub_selects(query: &Builder) -> Result<Vec<String>> {
    query
        .columns
        .iter()
        .filter_map(|selector| match selector {
            ColumnSelector::Sub { query: sub, alias } => Some((sub, alias)),
            _ => None,
        })
        .map(|(sub, alias)| -> Result<String> {
            Ok(format!("LET {} = {}", alias, compile_sub_query_value(sub)?))
        })
        .collect()
}

pub(crate) fn compile_return(query: &Builder, group_variables: &[String]) -> Result<String> {
    let distinct = if query.distinct { "DISTINCT " } else { "" };

    if query.aggregate.is_some() {
        return Ok(format!("RETURN {{aggregate: {}}}", AGGREGATE_VARIABLE));
    }

    let mut documents: Vec<String> = Vec::new();
    let mut attributes: Vec<(String, String)> = Vec::new();

    if query.columns.is_empty() {
        if group_variables.is_empty() {
            documents = default_documents(query);
        } else {
            attributes = group_variables
                .iter()
                .map(|variable| (variable.clone(), variable.clone()))
                .collect();
        }
    }

    for selector in &query.columns {
        match selector {
            ColumnSelector::Column(column) => {
                attributes.push((attribute_name(column), normalize_column(query, column)))
            }
            ColumnSelector::Aliased { column, alias } => {
                attributes.push((alias.clone(), normalize_column(query, column)))
            }
            ColumnSelector::Documents(table) if table.is_empty() => {
                documents.extend(query.default_alias().map(str::to_string))
            }
            ColumnSelector::Documents(table) => {
                let alias = query
                    .aliases
                    .get_table_alias(table)
                    .unwrap_or(table.as_str())
                    .to_string();
                documents.push(alias);
            }
            ColumnSelector::Raw {
                expression,
                alias: Some(alias),
            } => attributes.push((alias.clone(), expression.to_string())),
            ColumnSelector::Raw {
                expression,
                alias: None,
            } => documents.push(expression.to_string()),
            ColumnSelector::Sub { alias, .. } => attributes.push((alias.clone(), alias.clone())),
        }
    }

    if query.return_single_value && documents.is_empty() && attributes.len() == 1 {
        return Ok(format!("RETURN {}{}", distinct, attributes[0].1));
    }

    let projection = match (documents.len(), attributes.is_empty()) {
        (0, _) => object_literal(&attributes),
        (1, true) => documents.remove(0),
        (_, true) => format!("MERGE({})", documents.join(", ")),
        (_, false) => format!(
            "MERGE({}, {})",
            documents.join(", "),
            object_literal(&attributes)
        ),
    };
    Ok(format!("RETURN {}{}", distinct, projection))
}

/// The main document and every joined document
fn default_documents(query: &Builder) -> Vec<String> {
    query
        .default_alias()
        .into_iter()
        .map(str::to_string)
        .chain(query.joins.iter().map(|join| join.alias().to_string()))
        .collect()
}
