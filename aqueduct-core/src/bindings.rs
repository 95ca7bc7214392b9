//! Categorized bind parameters
//!
//! Each builder owns a [`BindingStore`]. Values are filed under the clause
//! category that introduced them and named `<query_id>_<category>_<n>`, so
//! bindings merged in from sub-builders never collide with the parent's.

use crate::value::{cast_binding, Value};
use crate::{Error, Result};
use indexmap::IndexMap;
use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

/// Flattened bind parameters as sent to the server, keyed without the `@`
pub type Bindings = IndexMap<String, Value>;

static NEXT_QUERY_ID: AtomicU64 = AtomicU64::new(1);

/// Allocate a process-unique builder identity
pub(crate) fn next_query_id() -> u64 {
    NEXT_QUERY_ID.fetch_add(1, Ordering::Relaxed)
}

/// Clause category a binding belongs to, in emission order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BindingCategory {
    Variable,
    From,
    Search,
    Join,
    Where,
    GroupBy,
    Having,
    Order,
    Union,
    UnionOrder,
    Select,
    Insert,
    Update,
    Upsert,
}

impl BindingCategory {
    pub const ALL: [BindingCategory; 14] = [
        BindingCategory::Variable,
        BindingCategory::From,
        BindingCategory::Search,
        BindingCategory::Join,
        BindingCategory::Where,
        BindingCategory::GroupBy,
        BindingCategory::Having,
        BindingCategory::Order,
        BindingCategory::Union,
        BindingCategory::UnionOrder,
        BindingCategory::Select,
        BindingCategory::Insert,
        BindingCategory::Update,
        BindingCategory::Upsert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BindingCategory::Variable => "variable",
            BindingCategory::From => "from",
            BindingCategory::Search => "search",
            BindingCategory::Join => "join",
            BindingCategory::Where => "where",
            BindingCategory::GroupBy => "groupBy",
            BindingCategory::Having => "having",
            BindingCategory::Order => "order",
            BindingCategory::Union => "union",
            BindingCategory::UnionOrder => "unionOrder",
            BindingCategory::Select => "select",
            BindingCategory::Insert => "insert",
            BindingCategory::Update => "update",
            BindingCategory::Upsert => "upsert",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl Display for BindingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BindingCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        BindingCategory::ALL
            .iter()
            .copied()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| Error::invalid_argument(format!("Invalid binding type: {}.", s)))
    }
}

/// Whether `text` is a bind-parameter reference produced by a binding store
pub fn is_placeholder(text: &str) -> bool {
    let Some(name) = text.strip_prefix('@') else {
        return false;
    };
    let mut parts = name.splitn(3, '_');
    let (Some(id), Some(category), Some(ordinal)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    !id.is_empty()
        && id.chars().all(|c| c.is_ascii_digit())
        && category.parse::<BindingCategory>().is_ok()
        && !ordinal.is_empty()
        && ordinal.chars().all(|c| c.is_ascii_digit())
}

/// Per-builder store of bind parameters
#[derive(Debug)]
pub struct BindingStore {
    query_id: u64,
    categories: IndexMap<BindingCategory, IndexMap<String, Value>>,
    counters: [usize; 14],
}

impl BindingStore {
    pub fn new() -> Self {
        Self::with_query_id(next_query_id())
    }

    pub fn with_query_id(query_id: u64) -> Self {
        Self {
            query_id,
            categories: BindingCategory::ALL
                .iter()
                .map(|category| (*category, IndexMap::new()))
                .collect(),
            counters: [0; 14],
        }
    }

    pub fn query_id(&self) -> u64 {
        self.query_id
    }

    /// Add a value and return its placeholder name (without `@`)
    pub fn add(&mut self, value: impl Into<Value>, category: BindingCategory) -> String {
        let counter = &mut self.counters[category.index()];
        *counter += 1;
        let name = format!("{}_{}_{}", self.query_id, category, counter);

        self.categories
            .entry(category)
            .or_default()
            .insert(name.clone(), cast_binding(value.into()));
        name
    }

    /// Add a value under a category given by name
    pub fn add_named(&mut self, value: impl Into<Value>, category: &str) -> Result<String> {
        let category = category.parse::<BindingCategory>()?;
        Ok(self.add(value, category))
    }

    /// Replace all bindings of a category
    pub fn set(&mut self, values: Bindings, category: BindingCategory) {
        self.categories.insert(
            category,
            values
                .into_iter()
                .map(|(name, value)| (name, cast_binding(value)))
                .collect(),
        );
    }

    pub fn get(&self, category: BindingCategory) -> Option<&IndexMap<String, Value>> {
        self.categories.get(&category)
    }

    /// Merge another store's bindings, keeping their names
    ///
    /// With a category every incoming binding is filed under it, otherwise
    /// each keeps its own category.
    pub fn merge(&mut self, other: &BindingStore, category: Option<BindingCategory>) {
        for (source_category, values) in &other.categories {
            let target = category.unwrap_or(*source_category);
            let entry = self.categories.entry(target).or_default();
            for (name, value) in values {
                entry.insert(name.clone(), value.clone());
            }
        }
    }

    /// Import every category of another store unchanged
    pub fn import(&mut self, other: &BindingStore) {
        self.merge(other, None);
    }

    /// Flatten all categories in emission order
    pub fn flatten(&self) -> Bindings {
        BindingCategory::ALL
            .iter()
            .filter_map(|category| self.categories.get(category))
            .flat_map(|values| values.iter())
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Copy that keeps the identity and counters, for compiling a working copy
    pub(crate) fn snapshot(&self) -> Self {
        Self {
            query_id: self.query_id,
            categories: self.categories.clone(),
            counters: self.counters,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.categories.values().all(IndexMap::is_empty)
    }

    pub fn len(&self) -> usize {
        self.categories.values().map(IndexMap::len).sum()
    }
}

impl Default for BindingStore {
    fn default() -> Self {
        Self::new()
    }
}

/// A copy gets a fresh identity so its new bindings never shadow the original's
impl Clone for BindingStore {
    fn clone(&self) -> Self {
        Self {
            query_id: next_query_id(),
            categories: self.categories.clone(),
            counters: [0; 14],
        }
    }
}

/// Operand text for a bound value, either a placeholder or trusted AQL
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    /// Placeholder name, rendered as `@name`
    Placeholder(String),
    /// Trusted AQL emitted verbatim
    Raw(String),
    /// Column reference, normalized at compile time
    Column(String),
}

/// Drop trusted expressions from a list of operands, keeping bindable values
pub fn clean_bindings<I>(values: I) -> Vec<Value>
where
    I: IntoIterator<Item = crate::builder::Operand>,
{
    values
        .into_iter()
        .filter_map(|operand| match operand {
            crate::builder::Operand::Value(value) => Some(value),
            _ => None,
        })
        .collect()
}
