//! Data-modification statements and existence checks

use super::{
    collection_name, compile_limit, compile_orders, compile_query, compile_source,
    object_literal, render_bound,
};
use crate::alias::wrap_attribute;
use crate::bindings::{BindingCategory, Bound};
use crate::builder::{
    Builder, ColumnSelector, FromClause, Operand, Where, WhereConnector, WhereKind,
};
use crate::value::{convert_id_to_key, Expression};
use crate::{Error, Operator, Result, Value};
use indexmap::IndexMap;

/// Prefixed name of the collection a write targets
fn target_collection(query: &Builder) -> Result<String> {
    match &query.from {
        Some(FromClause::Collection { name, .. }) => {
            Ok(collection_name(&query.table_prefix, name))
        }
        Some(FromClause::View { name, .. }) => Err(Error::compilation(format!(
            "'{}' is a view; views are read-only.",
            name
        ))),
        Some(FromClause::Sub { .. }) => Err(Error::compilation(
            "Cannot write to the result of a sub-query.",
        )),
        None => Err(Error::compilation(
            "No collection to query; call from() first.",
        )),
    }
}

fn main_alias(query: &Builder) -> Result<String> {
    query
        .default_alias()
        .map(str::to_string)
        .ok_or_else(|| Error::compilation("No collection to query; call from() first."))
}

/// `FOR doc IN @rows INSERT doc INTO collection RETURN NEW._key`
pub(crate) fn compile_insert(query: &mut Builder, rows: Value, ignore_errors: bool) -> Result<String> {
    let collection = target_collection(query)?;
    let rows = query.bindings.add(rows, BindingCategory::Insert);
    let options = if ignore_errors {
        " OPTIONS {ignoreErrors: true}"
    } else {
        ""
    };
    Ok(format!(
        "FOR doc IN @{} INSERT doc INTO {}{} RETURN NEW._key",
        rows, collection, options
    ))
}

/// Iterate the matching documents and update each with an object literal
pub(crate) fn compile_update(query: &mut Builder, values: Vec<(String, Operand)>) -> Result<String> {
    let collection = target_collection(query)?;
    let alias = main_alias(query)?;

    let mut document = UpdateDocument::default();
    for (key, operand) in values {
        let operand = match operand {
            Operand::Value(value) => Operand::Value(convert_id_to_key(value)),
            other => other,
        };
        let bound = query.bind(operand, BindingCategory::Update);
        query.check()?;
        document.insert(&key, render_bound(query, &bound));
    }

    let mut parts = compile_source(query)?;
    if let Some(orders) = compile_orders(query, &query.orders, Some(&alias)) {
        parts.push(orders);
    }
    if let Some(limit) = compile_limit(query.limit, query.offset) {
        parts.push(limit);
    }
    parts.push(format!(
        "UPDATE {} WITH {} IN {}",
        alias,
        document.render(),
        collection
    ));
    Ok(parts.join(" "))
}

/// Iterate bound rows and insert or update each, keyed on `unique_by`
pub(crate) fn compile_upsert(
    query: &mut Builder,
    rows: Value,
    unique_by: &[String],
    update: &[String],
) -> Result<String> {
    let collection = target_collection(query)?;
    let rows = query.bindings.add(rows, BindingCategory::Upsert);

    let from_row = |attributes: &[String]| {
        let entries: Vec<(&str, String)> = attributes
            .iter()
            .map(|attribute| (attribute.as_str(), format!("doc.{}", wrap_attribute(attribute))))
            .collect();
        object_literal(&entries)
    };

    Ok(format!(
        "FOR doc IN @{} UPSERT {} INSERT doc UPDATE {} IN {}",
        rows,
        from_row(unique_by),
        from_row(update),
        collection
    ))
}

/// Remove by key directly or iterate and remove the matching documents
pub(crate) fn compile_delete(query: &mut Builder, id: Option<Value>) -> Result<String> {
    let collection = target_collection(query)?;
    let alias = main_alias(query)?;

    if let Some(id) = id {
        let key = query.bindings.add(id, BindingCategory::Where);
        if query.wheres.is_empty() && query.joins.is_empty() {
            return Ok(format!("REMOVE {{_key: @{}}} IN {}", key, collection));
        }
        query.wheres.push(Where {
            kind: WhereKind::Basic {
                column: "id".to_string(),
                operator: Operator::EQ,
                value: Bound::Placeholder(key),
            },
            connector: WhereConnector::And,
        });
    }

    let mut parts = compile_source(query)?;
    if let Some(orders) = compile_orders(query, &query.orders, Some(&alias)) {
        parts.push(orders);
    }
    if let Some(limit) = compile_limit(query.limit, query.offset) {
        parts.push(limit);
    }
    parts.push(format!("REMOVE {} IN {}", alias, collection));
    Ok(parts.join(" "))
}

pub(crate) fn compile_truncate(query: &mut Builder) -> Result<String> {
    let collection = target_collection(query)?;
    Ok(format!("FOR doc IN {} REMOVE doc IN {}", collection, collection))
}

/// `RETURN LENGTH((... LIMIT 1 RETURN 1)) > 0`
pub(crate) fn compile_exists(query: &mut Builder) -> Result<String> {
    if query.unions.is_empty() {
        query.limit = Some(1);
        query.offset = None;
        query.columns = vec![ColumnSelector::Raw {
            expression: Expression::new("1"),
            alias: None,
        }];
        query.distinct = false;
    } else {
        query.union_limit = Some(1);
        query.union_offset = None;
    }
    Ok(format!("RETURN LENGTH(({})) > 0", compile_query(query)?))
}

/// Attributes of an update, nested along `->` paths
#[derive(Debug, Default)]
struct UpdateDocument {
    fields: IndexMap<String, UpdateField>,
}

#[derive(Debug)]
enum UpdateField {
    Value(String),
    Nested(UpdateDocument),
}

impl UpdateDocument {
    fn insert(&mut self, key: &str, aql: String) {
        let mut path: Vec<String> = key.split("->").map(|part| part.trim().to_string()).collect();
        if path.first().is_some_and(|first| first == "id") {
            path[0] = "_key".to_string();
        }
        self.insert_path(&path, aql);
    }

    fn insert_path(&mut self, path: &[String], aql: String) {
        match path {
            [] => {}
            [last] => {
                self.fields.insert(last.clone(), UpdateField::Value(aql));
            }
            [first, rest @ ..] => {
                let entry = self
                    .fields
                    .entry(first.clone())
                    .or_insert_with(|| UpdateField::Nested(UpdateDocument::default()));
                if let UpdateField::Value(_) = entry {
                    *entry = UpdateField::Nested(UpdateDocument::default());
                }
                if let UpdateField::Nested(nested) = entry {
                    nested.insert_path(rest, aql);
                }
            }
        }
    }

    fn render(&self) -> String {
        let entries: Vec<(&str, String)> = self
            .fields
            .iter()
            .map(|(key, field)| {
                let aql = match field {
                    UpdateField::Value(aql) => aql.clone(),
                    UpdateField::Nested(nested) => nested.render(),
                };
                (key.as_str(), aql)
            })
            .collect();
        object_literal(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_document_nesting() {
        let mut document = UpdateDocument::default();
        document.insert("id", "@a".to_string());
        document.insert("options->lang", "@b".to_string());
        document.insert("options->ui->theme", "@c".to_string());
        document.insert("first name", "@d".to_string());
        assert_eq!(
            document.render(),
            "{_key: @a, options: {lang: @b, ui: {theme: @c}}, \"first name\": @d}"
        );
    }

    #[test]
    fn test_exists_over_union() {
        let query = crate::table("characters")
            .where_(("alive", true))
            .union(crate::table("characters").where_(("surname", "Stark")));
        let compiled = query.exists_query().unwrap();
        assert!(compiled.aql.starts_with("RETURN LENGTH((FOR unionResultDoc IN UNION_DISTINCT("));
        assert!(compiled.aql.ends_with("LIMIT 1 RETURN unionResultDoc)) > 0"));
        assert_eq!(compiled.bindings.len(), 2);
    }

    #[test]
    fn test_write_to_view_is_rejected() {
        let query = Builder::new().from_view("character_view");
        assert!(matches!(
            query.truncate_query(),
            Err(Error::Compilation { .. })
        ));
    }
}
