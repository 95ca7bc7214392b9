//! INSERT and UPSERT statements
//!
//! All rows of one statement are bound as a single array parameter and
//! iterated server-side, so the AQL text does not depend on the row count.

use super::common::IntoDocument;
use super::Builder;
use crate::grammar::{self, CompiledQuery};
use crate::value::{convert_id_to_key, Document};
use crate::{Error, Result, Value};

impl Builder {
    /// Compile an insert of one or more documents, returning their keys
    ///
    /// `id` attributes are stored as `_key`.
    ///
    /// # Examples
    /// ```
    /// use aqueduct_core::table;
    /// use serde_json::json;
    ///
    /// let compiled = table("characters")
    ///     .insert_query(vec![json!({"id": "NedStark", "name": "Ned"})])
    ///     .unwrap();
    /// assert!(compiled.aql.starts_with("FOR doc IN @"));
    /// ```
    pub fn insert_query<I, D>(&self, rows: I) -> Result<CompiledQuery>
    where
        I: IntoIterator<Item = D>,
        D: IntoDocument,
    {
        self.compile_insert(rows, false)
    }

    /// Same as [`insert_query`](Builder::insert_query) for a single document
    pub fn insert_get_id_query<D>(&self, row: D) -> Result<CompiledQuery>
    where
        D: IntoDocument,
    {
        self.compile_insert([row], false)
    }

    /// Insert documents, skipping those that violate a unique constraint
    pub fn insert_or_ignore_query<I, D>(&self, rows: I) -> Result<CompiledQuery>
    where
        I: IntoIterator<Item = D>,
        D: IntoDocument,
    {
        self.compile_insert(rows, true)
    }

    fn compile_insert<I, D>(&self, rows: I, ignore_errors: bool) -> Result<CompiledQuery>
    where
        I: IntoIterator<Item = D>,
        D: IntoDocument,
    {
        self.check()?;
        let rows = prepare_rows(rows)?;
        let mut query = self.working_copy();
        let aql = grammar::writes::compile_insert(&mut query, rows, ignore_errors)?;
        Ok(CompiledQuery::from_store(aql, &query.bindings))
    }

    /// Compile an insert-or-update keyed on `unique_by`
    ///
    /// Existing documents get the `update` attributes of the incoming row;
    /// without an explicit list every attribute of the first row except the
    /// unique ones is updated.
    pub fn upsert_query<I, D>(
        &self,
        rows: I,
        unique_by: &[&str],
        update: Option<&[&str]>,
    ) -> Result<CompiledQuery>
    where
        I: IntoIterator<Item = D>,
        D: IntoDocument,
    {
        self.check()?;
        if unique_by.is_empty() {
            return Err(Error::invalid_argument(
                "Upsert requires at least one unique attribute.",
            ));
        }
        let documents = rows
            .into_iter()
            .map(IntoDocument::into_document)
            .collect::<Result<Vec<Document>>>()?;
        if documents.is_empty() {
            return Err(Error::invalid_argument(
                "Upsert requires at least one document.",
            ));
        }

        let unique_by: Vec<String> = unique_by.iter().map(|c| key_attribute(c)).collect();
        let update: Vec<String> = match update {
            Some(columns) => columns.iter().map(|c| key_attribute(c)).collect(),
            None => documents[0]
                .keys()
                .map(|c| key_attribute(c))
                .filter(|c| !unique_by.contains(c))
                .collect(),
        };

        let rows = Value::Array(
            documents
                .into_iter()
                .map(|doc| convert_id_to_key(Value::Object(doc)))
                .collect(),
        );
        let mut query = self.working_copy();
        let aql = grammar::writes::compile_upsert(&mut query, rows, &unique_by, &update)?;
        Ok(CompiledQuery::from_store(aql, &query.bindings))
    }
}

fn prepare_rows<I, D>(rows: I) -> Result<Value>
where
    I: IntoIterator<Item = D>,
    D: IntoDocument,
{
    let rows = rows
        .into_iter()
        .map(|row| row.into_document().map(|doc| convert_id_to_key(Value::Object(doc))))
        .collect::<Result<Vec<Value>>>()?;
    if rows.is_empty() {
        return Err(Error::invalid_argument(
            "Insert requires at least one document.",
        ));
    }
    Ok(Value::Array(rows))
}

fn key_attribute(column: &str) -> String {
    match column {
        "id" => "_key".to_string(),
        other => other.to_string(),
    }
}
