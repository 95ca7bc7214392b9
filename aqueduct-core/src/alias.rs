//! Collection and attribute alias resolution
//!
//! Every collection a query touches is iterated under a document variable
//! (`characters` becomes `characterDoc`). Column references written the SQL
//! way (`characters.name`, `name`, `options->lang`) are rewritten against
//! those variables before they reach AQL text.

use crate::builder::Builder;
use heck::ToLowerCamelCase;
use indexmap::IndexMap;

/// Postfix appended to generated document variables
pub const DEFAULT_ALIAS_POSTFIX: &str = "Doc";

/// Table and column aliases visible to one builder
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AliasRegistry {
    tables: IndexMap<String, String>,
    columns: IndexMap<String, String>,
    variables: IndexMap<String, String>,
}

impl AliasRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an alias for a table, generating one when none is given
    ///
    /// Registering a table twice without an explicit alias keeps the first alias.
    pub fn register_table_alias(&mut self, table: &str, alias: Option<&str>) -> String {
        match alias {
            Some(alias) => {
                self.tables.insert(table.to_string(), alias.to_string());
                alias.to_string()
            }
            None => self
                .tables
                .entry(table.to_string())
                .or_insert_with(|| generate_table_alias(table, DEFAULT_ALIAS_POSTFIX))
                .clone(),
        }
    }

    /// Alias for a sub-query source, derived from the sub-builder's identity
    pub fn register_sub_query_alias(&mut self, query_id: u64) -> String {
        let alias = format!("subQuery{}{}", query_id, DEFAULT_ALIAS_POSTFIX);
        self.tables.insert(alias.clone(), alias.clone());
        alias
    }

    pub fn get_table_alias(&self, table: &str) -> Option<&str> {
        self.tables.get(table).map(String::as_str)
    }

    pub fn is_table_alias(&self, name: &str) -> bool {
        self.tables.values().any(|alias| alias == name)
    }

    pub fn table_aliases(&self) -> &IndexMap<String, String> {
        &self.tables
    }

    /// Remember that `column` is exposed as `alias` in the projection
    pub fn register_column_alias(&mut self, column: &str, alias: &str) {
        self.columns.insert(column.to_string(), alias.to_string());
    }

    pub fn get_column_alias(&self, column: &str) -> Option<&str> {
        self.columns.get(column).map(String::as_str)
    }

    /// Reverse lookup: the raw column a projection alias stands for
    pub fn column_for_alias(&self, alias: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(_, a)| a.as_str() == alias)
            .map(|(column, _)| column.as_str())
    }

    /// Map a column reference onto a query variable expression
    pub fn register_variable(&mut self, reference: &str, expression: &str) {
        self.variables
            .insert(reference.to_string(), expression.to_string());
    }

    pub fn get_variable(&self, reference: &str) -> Option<&str> {
        self.variables.get(reference).map(String::as_str)
    }

    /// Whether `name` is a variable introduced by the query itself
    pub fn is_variable(&self, name: &str) -> bool {
        self.variables
            .iter()
            .any(|(reference, expression)| reference == name || expression == name)
    }

    /// Copy table aliases from `source` without overriding existing ones
    pub fn import_table_aliases(&mut self, source: &AliasRegistry) {
        for (table, alias) in &source.tables {
            if !self.tables.contains_key(table) {
                self.tables.insert(table.clone(), alias.clone());
            }
        }
    }

    /// Copy query variables from `source`; sub-queries can see the parent's LETs
    pub fn import_variables(&mut self, source: &AliasRegistry) {
        for (reference, expression) in &source.variables {
            if !self.variables.contains_key(reference) {
                self.variables.insert(reference.clone(), expression.clone());
            }
        }
    }

    /// Make both registries aware of each other's table aliases
    pub fn exchange_table_aliases(&mut self, other: &mut AliasRegistry) {
        other.import_table_aliases(self);
        self.import_table_aliases(other);
    }
}

/// Derive a document variable from a collection name
///
/// # Examples
/// ```
/// use aqueduct_core::alias::generate_table_alias;
///
/// assert_eq!(generate_table_alias("characters", "Doc"), "characterDoc");
/// assert_eq!(generate_table_alias("user_roles", "Doc"), "userRoleDoc");
/// ```
pub fn generate_table_alias(table: &str, postfix: &str) -> String {
    let singular = pluralizer::pluralize(table, 1, false);
    format!("{}{}", singular.to_lower_camel_case(), postfix)
}

/// Quote one attribute name, keeping array operators outside the quotes
pub(crate) fn wrap_attribute(segment: &str) -> String {
    if segment == "*" {
        return "*".to_string();
    }
    let (name, suffix) = match segment.find('[') {
        Some(idx) => segment.split_at(idx),
        None => (segment, ""),
    };
    if name.is_empty() {
        return segment.to_string();
    }
    format!("`{}`{}", name.replace('`', "\\`"), suffix)
}

/// Resolve a column reference against the builder's aliases
///
/// `characters.id` becomes ``characterDoc.`_key` ``, `options->lang` becomes
/// ``characterDoc.`options`.`lang` ``. References to query variables are left
/// as they are. Unknown prefixes are treated as nested attributes of the
/// current document.
pub fn normalize_column(query: &Builder, column: &str) -> String {
    normalize_column_in(query, column, query.default_alias())
}

pub(crate) fn normalize_column_in(
    query: &Builder,
    column: &str,
    default_alias: Option<&str>,
) -> String {
    let column = column.trim().replace("->", ".");
    let aliases = &query.aliases;

    if let Some(variable) = aliases.get_variable(&column) {
        return variable.to_string();
    }

    if !column.contains('.') {
        if let Some(raw) = aliases.column_for_alias(&column) {
            if raw != column {
                return normalize_column_in(query, raw, default_alias);
            }
        }
    }

    let segments: Vec<&str> = column.split('.').collect();
    let first = segments[0];

    if aliases.is_variable(first) {
        if segments.len() == 1 {
            return first.to_string();
        }
        return join_attributes(first, &segments[1..]);
    }

    if segments.len() > 1 {
        if let Some(alias) = aliases.get_table_alias(first) {
            return join_attributes(alias, &segments[1..]);
        }
        if aliases.is_table_alias(first) {
            return join_attributes(first, &segments[1..]);
        }
    }

    match default_alias {
        Some(alias) => join_attributes(alias, &segments),
        None => join_attributes("", &segments),
    }
}

/// Attribute path of `column` on a known document variable, skipping alias lookups
pub(crate) fn qualify_column(variable: &str, column: &str) -> String {
    let column = column.trim().replace("->", ".");
    let segments: Vec<&str> = column.split('.').collect();
    join_attributes(variable, &segments)
}

/// Attribute path of `column` on a projected row, which carries `id` as is
pub(crate) fn qualify_projected(variable: &str, column: &str) -> String {
    let column = column.trim().replace("->", ".");
    std::iter::once(variable.to_string())
        .chain(column.split('.').map(wrap_attribute))
        .collect::<Vec<_>>()
        .join(".")
}

/// Last attribute of a column reference, used as its key in projections
pub(crate) fn attribute_name(column: &str) -> String {
    let column = column.trim().replace("->", ".");
    let last = column.rsplit('.').next().unwrap_or_default();
    let last = last.split('[').next().unwrap_or_default();
    last.to_string()
}

fn join_attributes(alias: &str, attributes: &[&str]) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(attributes.len() + 1);
    if !alias.is_empty() {
        parts.push(alias.to_string());
    }
    for (position, attribute) in attributes.iter().enumerate() {
        if position == 0 && *attribute == "id" {
            parts.push(wrap_attribute("_key"));
        } else {
            parts.push(wrap_attribute(attribute));
        }
    }
    parts.join(".")
}
