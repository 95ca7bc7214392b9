//! REMOVE statements

use super::Builder;
use crate::grammar::{self, CompiledQuery};
use crate::{Result, Value};

impl Builder {
    /// Compile a removal of the matching documents
    ///
    /// With a key and no other conditions the document is removed directly
    /// without iterating the collection.
    ///
    /// # Examples
    /// ```
    /// use aqueduct_core::table;
    ///
    /// let compiled = table("characters").delete_query(Some("NedStark".into())).unwrap();
    /// assert!(compiled.aql.starts_with("REMOVE {_key: @"));
    /// ```
    pub fn delete_query(&self, id: Option<Value>) -> Result<CompiledQuery> {
        self.check()?;
        let mut query = self.working_copy();
        let aql = grammar::writes::compile_delete(&mut query, id)?;
        Ok(CompiledQuery::from_store(aql, &query.bindings))
    }

    /// Compile a removal of every document in the collection
    pub fn truncate_query(&self) -> Result<CompiledQuery> {
        self.check()?;
        let mut query = self.working_copy();
        let aql = grammar::writes::compile_truncate(&mut query)?;
        Ok(CompiledQuery::from_store(aql, &query.bindings))
    }
}
