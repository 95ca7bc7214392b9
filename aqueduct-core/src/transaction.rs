//! Server-side transactions
//!
//! ArangoDB runs multi-statement transactions as a JavaScript action on the
//! server. Queries issued inside a transaction are collected per nesting
//! level; committing the outermost level compiles them into one action that
//! is executed in a single request. Nested levels fold into their parent on
//! commit and are discarded on rollback.

use crate::bindings::Bindings;
use crate::grammar::CompiledQuery;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Collections a transaction declares up front
///
/// Every write collection is also declared for reading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionCollections {
    pub read: Vec<String>,
    pub write: Vec<String>,
}

impl TransactionCollections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read<I, S>(mut self, collections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        push_unique(&mut self.read, collections);
        self
    }

    pub fn write<I, S>(mut self, collections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        push_unique(&mut self.write, collections);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.read.is_empty() && self.write.is_empty()
    }

    fn merge(&mut self, other: TransactionCollections) {
        push_unique(&mut self.read, other.read);
        push_unique(&mut self.write, other.write);
    }

    /// Write collections added to the read set, both de-duplicated
    fn normalized(&self) -> Self {
        let mut read = Vec::new();
        push_unique(&mut read, self.read.iter().chain(self.write.iter()).cloned());
        let mut write = Vec::new();
        push_unique(&mut write, self.write.iter().cloned());
        Self { read, write }
    }
}

fn push_unique<I, S>(target: &mut Vec<String>, items: I)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    for item in items {
        let item = item.into();
        if !target.contains(&item) {
            target.push(item);
        }
    }
}

/// One statement of the transaction action
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionCommand {
    pub name: String,
    pub command: String,
    pub collections: TransactionCollections,
}

impl TransactionCommand {
    /// An `aqlQuery` command running `query` with its bindings
    pub fn aql_query(query: &CompiledQuery, collections: TransactionCollections) -> Result<Self> {
        let aql = serde_json::to_string(&query.aql)?;
        let command = if query.bindings.is_empty() {
            format!("db._query({});", aql)
        } else {
            format!("db._query({}, {});", aql, bindings_json(&query.bindings)?)
        };
        Ok(Self {
            name: "aqlQuery".to_string(),
            command,
            collections,
        })
    }
}

fn bindings_json(bindings: &Bindings) -> Result<String> {
    Ok(serde_json::to_string(bindings)?)
}

/// Request body of a JavaScript transaction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionOptions {
    pub collections: TransactionCollections,
    pub action: String,
}

/// Depth-indexed collection of transaction commands
#[derive(Debug, Default)]
pub struct TransactionManager {
    commands: Vec<Vec<TransactionCommand>>,
    collections: Vec<TransactionCollections>,
}

impl TransactionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current nesting level; zero outside a transaction
    pub fn depth(&self) -> usize {
        self.commands.len()
    }

    pub fn begin(&mut self, collections: TransactionCollections) {
        self.commands.push(Vec::new());
        self.collections.push(collections);
        tracing::trace!(depth = self.depth(), "transaction started");
    }

    /// Queue a query at the current level
    ///
    /// Without explicit collections they are read off the AQL.
    pub fn add_query(
        &mut self,
        query: &CompiledQuery,
        collections: Option<TransactionCollections>,
    ) -> Result<()> {
        let collections = collections.unwrap_or_else(|| extract_collections(&query.aql));
        let command = TransactionCommand::aql_query(query, collections)?;
        self.add_command(command)
    }

    pub fn add_command(&mut self, command: TransactionCommand) -> Result<()> {
        let commands = self
            .commands
            .last_mut()
            .ok_or_else(|| Error::transaction("There is no active transaction."))?;
        tracing::trace!(depth = commands.len() + 1, command = %command.command, "transaction command queued");
        commands.push(command);
        Ok(())
    }

    /// Commands queued at the current level
    pub fn commands(&self) -> &[TransactionCommand] {
        self.commands.last().map(Vec::as_slice).unwrap_or_default()
    }

    /// Close the current level
    ///
    /// Nested levels fold into their parent and yield `None`; the outermost
    /// level yields the action to execute.
    pub fn commit(&mut self) -> Result<Option<TransactionOptions>> {
        let (commands, collections) = match (self.commands.pop(), self.collections.pop()) {
            (Some(commands), Some(collections)) => (commands, collections),
            _ => return Err(Error::transaction("There is no active transaction to commit.")),
        };
        if commands.is_empty() {
            return Err(Error::transaction(
                "Cannot commit a transaction without commands.",
            ));
        }

        if let (Some(parent_commands), Some(parent_collections)) =
            (self.commands.last_mut(), self.collections.last_mut())
        {
            parent_collections.merge(collections);
            parent_commands.extend(commands);
            return Ok(None);
        }

        Ok(Some(compile_transaction(commands, collections)))
    }

    /// Discard the current level
    pub fn rollback(&mut self) -> Result<()> {
        if self.commands.pop().is_none() {
            return Err(Error::transaction("There is no active transaction to roll back."));
        }
        self.collections.pop();
        tracing::trace!(depth = self.depth(), "transaction rolled back");
        Ok(())
    }

    /// Drop every level
    pub fn reset(&mut self) {
        self.commands.clear();
        self.collections.clear();
    }
}

/// Build the action and the declared collections of a transaction
pub fn compile_transaction(
    commands: Vec<TransactionCommand>,
    collections: TransactionCollections,
) -> TransactionOptions {
    let mut declared = collections;
    let statements: Vec<String> = commands
        .into_iter()
        .map(|command| {
            declared.merge(command.collections);
            command.command
        })
        .collect();

    TransactionOptions {
        collections: declared.normalized(),
        action: format!(
            "function () {{ var db = require('@arangodb').db; {} }}",
            statements.join(" ")
        ),
    }
}

const WRITE_KEYWORDS: [&str; 5] = ["INSERT", "UPDATE", "UPSERT", "REPLACE", "REMOVE"];

/// Collections read and written by an AQL statement
///
/// Collections iterated by `FOR` are read; collections following `IN` or
/// `INTO` after a write keyword are written. Bound collections and
/// sub-queries are skipped.
pub fn extract_collections(aql: &str) -> TransactionCollections {
    let tokens: Vec<&str> = aql.split_whitespace().collect();
    let mut read = Vec::new();
    let mut write = Vec::new();
    let mut pending_write = false;

    for (idx, token) in tokens.iter().enumerate() {
        let upper = token.to_ascii_uppercase();
        if WRITE_KEYWORDS.contains(&upper.as_str()) {
            pending_write = true;
            continue;
        }
        if upper != "IN" && upper != "INTO" {
            continue;
        }
        let Some(name) = tokens.get(idx + 1).and_then(|next| collection_token(next)) else {
            continue;
        };
        if pending_write {
            pending_write = false;
            push_unique(&mut write, [name]);
        } else if idx >= 2 && tokens[idx - 2].trim_start_matches('(').eq_ignore_ascii_case("FOR") {
            push_unique(&mut read, [name]);
        }
    }

    TransactionCollections { read, write }.normalized()
}

fn collection_token(token: &str) -> Option<String> {
    let name = token.trim_end_matches([')', ',']).trim_matches('`');
    let valid = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    valid.then(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;

    fn compiled(aql: &str) -> CompiledQuery {
        CompiledQuery {
            aql: aql.to_string(),
            bindings: Bindings::new(),
        }
    }

    #[test]
    fn test_commit_without_transaction_fails() {
        let mut manager = TransactionManager::new();
        assert!(matches!(manager.commit(), Err(Error::Transaction { .. })));
        assert!(manager.rollback().is_err());
        assert!(manager.add_query(&compiled("RETURN 1"), None).is_err());
    }

    #[test]
    fn test_empty_transaction_cannot_commit() {
        let mut manager = TransactionManager::new();
        manager.begin(TransactionCollections::new());
        assert!(manager.commit().is_err());
        assert_eq!(manager.depth(), 0);
    }

    #[test]
    fn test_single_level_compiles_action() {
        let mut manager = TransactionManager::new();
        manager.begin(TransactionCollections::new().write(["characters"]));

        let mut bindings = Bindings::new();
        bindings.insert("1_insert_1".to_string(), Value::from("Ned"));
        let query = CompiledQuery {
            aql: "FOR doc IN @1_insert_1 INSERT doc INTO characters RETURN NEW._key".to_string(),
            bindings,
        };
        manager.add_query(&query, None).unwrap();

        let options = manager.commit().unwrap().unwrap();
        assert_eq!(
            options.action,
            "function () { var db = require('@arangodb').db; db._query(\"FOR doc IN @1_insert_1 INSERT doc INTO characters RETURN NEW._key\", {\"1_insert_1\":\"Ned\"}); }"
        );
        assert_eq!(options.collections.write, vec!["characters"]);
        assert_eq!(options.collections.read, vec!["characters"]);
        assert_eq!(manager.depth(), 0);
    }

    #[test]
    fn test_nested_commit_folds_into_parent() {
        let mut manager = TransactionManager::new();
        manager.begin(TransactionCollections::new().write(["characters"]));
        manager
            .add_query(&compiled("REMOVE {_key: \"Ned\"} IN characters"), None)
            .unwrap();

        manager.begin(TransactionCollections::new().read(["locations"]));
        manager
            .add_query(&compiled("FOR doc IN children REMOVE doc IN children"), None)
            .unwrap();
        assert_eq!(manager.depth(), 2);
        assert!(manager.commit().unwrap().is_none());
        assert_eq!(manager.commands().len(), 2);

        let options = manager.commit().unwrap().unwrap();
        assert_eq!(options.collections.write, vec!["characters", "children"]);
        assert_eq!(
            options.collections.read,
            vec!["locations", "characters", "children"]
        );
    }

    #[test]
    fn test_rollback_discards_nested_level() {
        let mut manager = TransactionManager::new();
        manager.begin(TransactionCollections::new());
        manager.add_query(&compiled("RETURN 1"), None).unwrap();
        manager.begin(TransactionCollections::new());
        manager.add_query(&compiled("RETURN 2"), None).unwrap();
        manager.rollback().unwrap();
        assert_eq!(manager.depth(), 1);
        assert_eq!(manager.commands().len(), 1);
    }

    #[test]
    fn test_extract_collections() {
        let collections = extract_collections(
            "FOR characterDoc IN characters FOR locationDoc IN (FOR l IN locations RETURN l) FILTER characterDoc.`alive` == @1_where_1 UPDATE characterDoc WITH {alive: false} IN characters",
        );
        assert_eq!(collections.write, vec!["characters"]);
        assert_eq!(collections.read, vec!["characters", "locations"]);

        let collections = extract_collections("FOR doc IN @1_upsert_1 UPSERT {_key: doc.`_key`} INSERT doc UPDATE {} IN `got-characters`");
        assert_eq!(collections.write, vec!["got-characters"]);
    }
}
