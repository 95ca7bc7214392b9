//! AQL compilation
//!
//! The grammar turns the clause model of a [`Builder`] into AQL text. It
//! always works on a copy of the builder: compiling registers query
//! variables (group keys, aggregate results) on the alias registry, and
//! the caller's builder must come out unchanged so it can be compiled again.
//!
//! Statement order is fixed: LET variables, the main FOR loop (with SEARCH
//! for views), joins, FILTER, COLLECT, post-collect FILTER, SORT, LIMIT,
//! sub-select LETs and finally RETURN. Unions wrap the whole statement.

pub(crate) mod columns;
pub(crate) mod filters;
pub(crate) mod groups;
pub(crate) mod joins;
pub(crate) mod unions;
pub(crate) mod writes;

use crate::alias::{normalize_column, normalize_column_in};
use crate::bindings::{BindingStore, Bindings, Bound};
use crate::builder::{Builder, FromClause, OrderClause, VariableValue};
use crate::{Error, Result};

/// AQL text together with the bind parameters it references
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub aql: String,
    pub bindings: Bindings,
}

impl CompiledQuery {
    /// Keep only the bindings whose placeholders occur in `aql`
    ///
    /// ArangoDB rejects bind parameters a query does not declare.
    pub(crate) fn from_store(aql: String, store: &BindingStore) -> Self {
        let bindings = store
            .flatten()
            .into_iter()
            .filter(|(name, _)| references_placeholder(&aql, name))
            .collect();
        Self { aql, bindings }
    }
}

fn references_placeholder(aql: &str, name: &str) -> bool {
    let needle = format!("@{}", name);
    aql.match_indices(&needle).any(|(idx, _)| {
        !aql[idx + needle.len()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}

/// Compile a read query
pub fn compile_select(query: &Builder) -> Result<CompiledQuery> {
    query.check()?;
    let mut query = query.working_copy();
    let aql = compile_query(&mut query)?;
    Ok(CompiledQuery::from_store(aql, &query.bindings))
}

/// Compile a working copy in place
pub(crate) fn compile_query(query: &mut Builder) -> Result<String> {
    if !query.unions.is_empty() {
        return unions::compile_unions(query);
    }
    compile_components(query)
}

/// Compile a nested query, wrapped in parentheses
pub(crate) fn compile_sub_query(query: &Builder) -> Result<String> {
    query.check()?;
    let mut query = query.working_copy();
    Ok(format!("({})", compile_query(&mut query)?))
}

/// Sub-query text, unwrapped to its only row when limited to one
pub(crate) fn compile_sub_query_value(query: &Builder) -> Result<String> {
    let aql = compile_sub_query(query)?;
    if query.limit == Some(1) {
        Ok(format!("FIRST({})", aql))
    } else {
        Ok(aql)
    }
}

pub(crate) fn compile_components(query: &mut Builder) -> Result<String> {
    let mut parts = compile_source(query)?;

    let group_variables = match groups::compile_groups(query)? {
        Some((clause, variables)) => {
            parts.push(clause);
            variables
        }
        None => Vec::new(),
    };
    if let Some(havings) = filters::compile_havings(query)? {
        parts.push(havings);
    }
    if let Some(orders) = compile_orders(query, &query.orders, query.default_alias()) {
        parts.push(orders);
    }
    if let Some(limit) = compile_limit(query.limit, query.offset) {
        parts.push(limit);
    }
    parts.extend(columns::compile_sub_selects(query)?);
    parts.push(columns::compile_return(query, &group_variables)?);

    Ok(parts.join(" "))
}

/// Everything up to and including the FILTER of the main loop
pub(crate) fn compile_source(query: &Builder) -> Result<Vec<String>> {
    let mut parts = compile_variables(query)?;
    parts.push(compile_from(query)?);
    if let Some(search) = compile_search(query) {
        parts.push(search);
    }
    parts.extend(joins::compile_joins(query)?);
    if let Some(wheres) = filters::compile_wheres(query)? {
        parts.push(wheres);
    }
    Ok(parts)
}

fn compile_variables(query: &Builder) -> Result<Vec<String>> {
    query
        .variables
        .iter()
        .map(|variable| -> Result<String> {
            let value = match &variable.value {
                VariableValue::Bound(bound) => render_bound(query, bound),
                VariableValue::Query(sub) => compile_sub_query_value(sub)?,
            };
            Ok(format!("LET {} = {}", variable.name, value))
        })
        .collect()
}

fn compile_from(query: &Builder) -> Result<String> {
    match &query.from {
        Some(FromClause::Collection { name, alias }) | Some(FromClause::View { name, alias }) => {
            Ok(format!(
                "FOR {} IN {}",
                alias,
                collection_name(&query.table_prefix, name)
            ))
        }
        Some(FromClause::Sub { query: sub, alias }) => {
            Ok(format!("FOR {} IN {}", alias, compile_sub_query(sub)?))
        }
        None => Err(Error::compilation(
            "No collection to query; call from() first.",
        )),
    }
}

fn compile_search(query: &Builder) -> Option<String> {
    let search = query.search.as_ref()?;
    let text = render_bound(query, &search.text);
    let analyzer = render_bound(query, &search.analyzer);
    let conditions = search
        .fields
        .iter()
        .map(|field| {
            format!(
                "{} IN TOKENS({}, {})",
                normalize_column(query, field),
                text,
                analyzer
            )
        })
        .collect::<Vec<_>>()
        .join(" OR ");
    Some(format!("SEARCH ANALYZER({}, {})", conditions, analyzer))
}

pub(crate) fn compile_orders(
    query: &Builder,
    orders: &[OrderClause],
    default_alias: Option<&str>,
) -> Option<String> {
    if orders.is_empty() {
        return None;
    }
    let criteria = orders
        .iter()
        .map(|order| match order {
            OrderClause::Column { column, direction } => format!(
                "{} {}",
                normalize_column_in(query, column, default_alias),
                direction
            ),
            OrderClause::Raw(expression) => expression.to_string(),
            OrderClause::Random => "RAND()".to_string(),
            OrderClause::BestMatching { direction } => {
                format!("BM25({}) {}", default_alias.unwrap_or_default(), direction)
            }
        })
        .collect::<Vec<_>>();
    Some(format!("SORT {}", criteria.join(", ")))
}

/// `LIMIT offset, count`; an offset without a count is dropped
pub(crate) fn compile_limit(limit: Option<u64>, offset: Option<u64>) -> Option<String> {
    match (limit, offset) {
        (Some(limit), Some(offset)) if offset > 0 => Some(format!("LIMIT {}, {}", offset, limit)),
        (Some(limit), _) => Some(format!("LIMIT {}", limit)),
        (None, _) => None,
    }
}

/// Collection reference with the table prefix, quoted when needed
pub(crate) fn collection_name(prefix: &str, name: &str) -> String {
    let name = format!("{}{}", prefix, name);
    if is_identifier(&name) && !is_keyword(&name) {
        name
    } else {
        format!("`{}`", name.replace('`', "\\`"))
    }
}

pub(crate) fn render_bound(query: &Builder, bound: &Bound) -> String {
    match bound {
        Bound::Placeholder(name) => format!("@{}", name),
        Bound::Raw(aql) => aql.clone(),
        Bound::Column(column) => normalize_column(query, column),
    }
}

/// Attribute name as written in an object literal
pub(crate) fn object_key(key: &str) -> String {
    if is_identifier(key) && !is_keyword(key) {
        key.to_string()
    } else {
        serde_json::Value::String(key.to_string()).to_string()
    }
}

/// AQL object literal from ordered key/expression pairs
pub(crate) fn object_literal<K, V>(entries: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let fields = entries
        .iter()
        .map(|(key, value)| format!("{}: {}", object_key(key.as_ref()), value.as_ref()))
        .collect::<Vec<_>>();
    format!("{{{}}}", fields.join(", "))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

const KEYWORDS: &[&str] = &[
    "AGGREGATE", "ALL", "AND", "ANY", "ASC", "COLLECT", "DESC", "DISTINCT", "FALSE", "FILTER",
    "FOR", "GRAPH", "IN", "INBOUND", "INSERT", "INTO", "K_PATHS", "K_SHORTEST_PATHS", "LET",
    "LIKE", "LIMIT", "NONE", "NOT", "NULL", "OR", "OUTBOUND", "REMOVE", "REPLACE", "RETURN",
    "SHORTEST_PATH", "SORT", "TRUE", "UPDATE", "UPSERT", "WINDOW", "WITH",
];

fn is_keyword(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    KEYWORDS.contains(&upper.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_reference_respects_boundaries() {
        let aql = "FILTER a == @5_where_10";
        assert!(references_placeholder(aql, "5_where_10"));
        assert!(!references_placeholder(aql, "5_where_1"));
    }

    #[test]
    fn test_compile_limit() {
        assert_eq!(compile_limit(Some(10), None).as_deref(), Some("LIMIT 10"));
        assert_eq!(compile_limit(Some(10), Some(0)).as_deref(), Some("LIMIT 10"));
        assert_eq!(compile_limit(Some(10), Some(5)).as_deref(), Some("LIMIT 5, 10"));
        assert_eq!(compile_limit(None, Some(5)), None);
    }

    #[test]
    fn test_collection_name_quoting() {
        assert_eq!(collection_name("", "characters"), "characters");
        assert_eq!(collection_name("got_", "characters"), "got_characters");
        assert_eq!(collection_name("", "user-roles"), "`user-roles`");
        assert_eq!(collection_name("", "filter"), "`filter`");
    }

    #[test]
    fn test_object_literal_keys() {
        let entries = [("name", "a"), ("first name", "b"), ("return", "c")];
        assert_eq!(
            object_literal(&entries),
            "{name: a, \"first name\": b, \"return\": c}"
        );
    }
}
