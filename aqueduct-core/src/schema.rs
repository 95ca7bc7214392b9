//! Schema maintenance queries
//!
//! Documents in a collection have no fixed columns, so checking, renaming or
//! dropping an attribute means touching every document. The collection is
//! bound as `@@collection`; attribute names are bound values used as
//! dynamic keys.

use crate::bindings::Bindings;
use crate::grammar::CompiledQuery;
use crate::{Error, Result, Value};
use serde::{Deserialize, Serialize};

const COLLECTION_PARAMETER: &str = "@collection";

fn collection_bindings(collection: &str) -> Bindings {
    let mut bindings = Bindings::new();
    bindings.insert(COLLECTION_PARAMETER.to_string(), Value::from(collection));
    bindings
}

fn require_attributes(attributes: &[&str]) -> Result<()> {
    if attributes.is_empty() {
        return Err(Error::invalid_argument("At least one attribute is required."));
    }
    Ok(())
}

/// Whether any document carries all of `attributes`
pub fn compile_has_attribute(collection: &str, attributes: &[&str]) -> Result<CompiledQuery> {
    require_attributes(attributes)?;
    let mut bindings = collection_bindings(collection);
    let conditions = attributes
        .iter()
        .enumerate()
        .map(|(idx, attribute)| {
            let name = format!("attribute_{}", idx + 1);
            bindings.insert(name.clone(), Value::from(*attribute));
            format!("HAS(doc, @{})", name)
        })
        .collect::<Vec<_>>()
        .join(" AND ");

    Ok(CompiledQuery {
        aql: format!(
            "RETURN LENGTH((FOR doc IN @@collection FILTER {} LIMIT 1 RETURN true)) > 0",
            conditions
        ),
        bindings,
    })
}

/// Move an attribute to a new name in every document that has it
pub fn compile_rename_attribute(collection: &str, from: &str, to: &str) -> Result<CompiledQuery> {
    if from.is_empty() || to.is_empty() {
        return Err(Error::invalid_argument(
            "Attribute names must not be empty.",
        ));
    }
    let mut bindings = collection_bindings(collection);
    bindings.insert("from".to_string(), Value::from(from));
    bindings.insert("to".to_string(), Value::from(to));

    Ok(CompiledQuery {
        aql: "FOR doc IN @@collection FILTER HAS(doc, @from) UPDATE doc WITH {[@from]: null, [@to]: doc[@from]} IN @@collection OPTIONS {keepNull: false}".to_string(),
        bindings,
    })
}

/// Remove attributes from every document
pub fn compile_drop_attribute(collection: &str, attributes: &[&str]) -> Result<CompiledQuery> {
    require_attributes(attributes)?;
    let mut bindings = collection_bindings(collection);
    let fields = attributes
        .iter()
        .enumerate()
        .map(|(idx, attribute)| {
            let name = format!("attribute_{}", idx + 1);
            bindings.insert(name.clone(), Value::from(*attribute));
            format!("[@{}]: null", name)
        })
        .collect::<Vec<_>>()
        .join(", ");

    Ok(CompiledQuery {
        aql: format!(
            "FOR doc IN @@collection UPDATE doc WITH {{{}}} IN @@collection OPTIONS {{keepNull: false}}",
            fields
        ),
        bindings,
    })
}

/// ArangoDB index types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexType {
    Persistent,
    Hash,
    Skiplist,
    Ttl,
    Geo,
    Fulltext,
    Inverted,
}

impl IndexType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexType::Persistent => "persistent",
            IndexType::Hash => "hash",
            IndexType::Skiplist => "skiplist",
            IndexType::Ttl => "ttl",
            IndexType::Geo => "geo",
            IndexType::Fulltext => "fulltext",
            IndexType::Inverted => "inverted",
        }
    }
}

/// Parameters of an index creation request
///
/// ```
/// use aqueduct_core::schema::IndexOptions;
///
/// let index = IndexOptions::persistent(["surname", "name"]).unique();
/// let json = serde_json::to_value(&index).unwrap();
/// assert_eq!(json["type"], "persistent");
/// assert_eq!(json["unique"], true);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexOptions {
    #[serde(rename = "type")]
    pub kind: IndexType,
    pub fields: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sparse: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deduplicate: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_background: Option<bool>,
    /// Seconds after which ttl-indexed documents expire
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_after: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo_json: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
}

impl IndexOptions {
    pub fn new<I, S>(kind: IndexType, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            fields: fields.into_iter().map(Into::into).collect(),
            name: None,
            unique: None,
            sparse: None,
            deduplicate: None,
            in_background: None,
            expire_after: None,
            geo_json: None,
            min_length: None,
        }
    }

    pub fn persistent<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(IndexType::Persistent, fields)
    }

    pub fn ttl(field: impl Into<String>, expire_after: u64) -> Self {
        let mut index = Self::new(IndexType::Ttl, [field.into()]);
        index.expire_after = Some(expire_after);
        index
    }

    pub fn geo<I, S>(fields: I, geo_json: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut index = Self::new(IndexType::Geo, fields);
        index.geo_json = Some(geo_json);
        index
    }

    pub fn fulltext(field: impl Into<String>, min_length: u32) -> Self {
        let mut index = Self::new(IndexType::Fulltext, [field.into()]);
        index.min_length = Some(min_length);
        index
    }

    pub fn inverted<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(IndexType::Inverted, fields)
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = Some(true);
        self
    }

    pub fn sparse(mut self) -> Self {
        self.sparse = Some(true);
        self
    }

    pub fn deduplicate(mut self, deduplicate: bool) -> Self {
        self.deduplicate = Some(deduplicate);
        self
    }

    pub fn in_background(mut self) -> Self {
        self.in_background = Some(true);
        self
    }

    /// `collection_field_type`, with dots in attribute paths replaced
    pub fn default_name(&self, collection: &str) -> String {
        let mut parts = vec![collection.to_string()];
        parts.extend(self.fields.iter().map(|field| field.replace(['.', '['], "_").replace(['*', ']'], "")));
        parts.push(self.kind.as_str().to_string());
        parts.join("_").to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_has_attribute() {
        let query = compile_has_attribute("characters", &["name", "surname"]).unwrap();
        assert_eq!(
            query.aql,
            "RETURN LENGTH((FOR doc IN @@collection FILTER HAS(doc, @attribute_1) AND HAS(doc, @attribute_2) LIMIT 1 RETURN true)) > 0"
        );
        assert_eq!(query.bindings["@collection"], Value::from("characters"));
        assert_eq!(query.bindings["attribute_2"], Value::from("surname"));
    }

    #[test]
    fn test_rename_attribute() {
        let query = compile_rename_attribute("characters", "name", "first_name").unwrap();
        assert!(query.aql.contains("{[@from]: null, [@to]: doc[@from]}"));
        assert_eq!(query.bindings.len(), 3);
        assert!(compile_rename_attribute("characters", "", "x").is_err());
    }

    #[test]
    fn test_drop_attribute() {
        let query = compile_drop_attribute("characters", &["alive", "age"]).unwrap();
        assert_eq!(
            query.aql,
            "FOR doc IN @@collection UPDATE doc WITH {[@attribute_1]: null, [@attribute_2]: null} IN @@collection OPTIONS {keepNull: false}"
        );
        assert!(matches!(
            compile_drop_attribute("characters", &[]),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_index_options_serialization() {
        let index = IndexOptions::ttl("expires_at", 3600).name("expiry");
        assert_eq!(
            serde_json::to_value(&index).unwrap(),
            json!({"type": "ttl", "fields": ["expires_at"], "name": "expiry", "expireAfter": 3600})
        );

        let geo = IndexOptions::geo(["location"], true).in_background();
        assert_eq!(
            serde_json::to_value(&geo).unwrap(),
            json!({"type": "geo", "fields": ["location"], "inBackground": true, "geoJson": true})
        );
    }

    #[test]
    fn test_default_index_name() {
        let index = IndexOptions::persistent(["house.region", "tags[*]"]);
        assert_eq!(
            index.default_name("characters"),
            "characters_house_region_tags__persistent"
        );
    }
}
