//! Value types for AQL bind parameters and documents

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{self, Display};

/// An ordered JSON object
pub type Document = IndexMap<String, Value>;

/// A value that can be bound to an AQL query or stored in a document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// 32-bit integer
    I32(i32),
    /// 64-bit integer
    I64(i64),
    /// 32-bit float
    F32(f32),
    /// 64-bit float
    F64(f64),
    /// String value
    String(String),
    /// Array of values
    Array(Vec<Value>),
    /// Object with ordered attributes
    Object(Document),
    /// Raw JSON, converted to the native variants when bound
    Json(serde_json::Value),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null) || matches!(self, Value::Json(serde_json::Value::Null))
    }

    /// Get the AQL type name for this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::I32(_) | Value::I64(_) | Value::F32(_) | Value::F64(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Json(json) => match json {
                serde_json::Value::Null => "null",
                serde_json::Value::Bool(_) => "bool",
                serde_json::Value::Number(_) => "number",
                serde_json::Value::String(_) => "string",
                serde_json::Value::Array(_) => "array",
                serde_json::Value::Object(_) => "object",
            },
        }
    }

    /// Extract array values if this is an Array variant
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Document> {
        match self {
            Value::Object(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert a `serde_json::Value` tree into native variants
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::I64(i),
                None => Value::F64(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from_json(value)))
                    .collect(),
            ),
        }
    }

    /// Convert into a `serde_json::Value`; non-finite floats become null
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::I32(i) => serde_json::Value::from(*i),
            Value::I64(i) => serde_json::Value::from(*i),
            Value::F32(f) => serde_json::Number::from_f64(f64::from(*f))
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::F64(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Object(doc) => serde_json::Value::Object(
                doc.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
            Value::Json(json) => json.clone(),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(Value::from_json)
    }
}

/// Replace embedded JSON with native variants so bound values have one shape
pub fn cast_binding(value: Value) -> Value {
    match value {
        Value::Json(json) => Value::from_json(json),
        Value::Array(items) => Value::Array(items.into_iter().map(cast_binding).collect()),
        Value::Object(doc) => Value::Object(
            doc.into_iter()
                .map(|(key, value)| (key, cast_binding(value)))
                .collect(),
        ),
        other => other,
    }
}

/// Rename an attribute of an object value, optionally descending into nested values
pub fn rename_key(value: Value, from: &str, to: &str, recursive: bool) -> Value {
    match value {
        Value::Object(doc) => Value::Object(
            doc.into_iter()
                .map(|(key, value)| {
                    let value = if recursive {
                        rename_key(value, from, to, true)
                    } else {
                        value
                    };
                    if key == from {
                        (to.to_string(), value)
                    } else {
                        (key, value)
                    }
                })
                .collect(),
        ),
        Value::Array(items) if recursive => Value::Array(
            items
                .into_iter()
                .map(|item| rename_key(item, from, to, true))
                .collect(),
        ),
        Value::Json(json) => rename_key(Value::from_json(json), from, to, recursive),
        other => other,
    }
}

/// Rewrite `id` attributes to `_key` at every depth of outbound data
pub fn convert_id_to_key(value: Value) -> Value {
    rename_key(value, "id", "_key", true)
}

/// Rewrite `_key` attributes of a returned row back to `id` at every depth
pub fn convert_key_to_id(row: serde_json::Value) -> serde_json::Value {
    match row {
        serde_json::Value::Object(map) => serde_json::Value::Object(
            map.into_iter()
                .map(|(key, value)| {
                    let value = convert_key_to_id(value);
                    if key == "_key" {
                        ("id".to_string(), value)
                    } else {
                        (key, value)
                    }
                })
                .collect(),
        ),
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.into_iter().map(convert_key_to_id).collect())
        }
        other => other,
    }
}

/// A trusted AQL fragment that is emitted verbatim, never bound
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression(String);

impl Expression {
    pub fn new(aql: impl Into<String>) -> Self {
        Expression(aql.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Implement From for common types
impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(val: bool) -> Self {
        Value::Bool(val)
    }
}

impl From<i32> for Value {
    fn from(val: i32) -> Self {
        Value::I32(val)
    }
}

impl From<i64> for Value {
    fn from(val: i64) -> Self {
        Value::I64(val)
    }
}

impl From<u32> for Value {
    fn from(val: u32) -> Self {
        Value::I64(i64::from(val))
    }
}

impl From<u64> for Value {
    fn from(val: u64) -> Self {
        match i64::try_from(val) {
            Ok(i) => Value::I64(i),
            Err(_) => Value::F64(val as f64),
        }
    }
}

impl From<f32> for Value {
    fn from(val: f32) -> Self {
        Value::F32(val)
    }
}

impl From<f64> for Value {
    fn from(val: f64) -> Self {
        Value::F64(val)
    }
}

impl From<String> for Value {
    fn from(val: String) -> Self {
        Value::String(val)
    }
}

impl From<&str> for Value {
    fn from(val: &str) -> Self {
        Value::String(val.to_string())
    }
}

impl From<&String> for Value {
    fn from(val: &String) -> Self {
        Value::String(val.clone())
    }
}

impl From<serde_json::Value> for Value {
    fn from(val: serde_json::Value) -> Self {
        Value::Json(val)
    }
}

impl From<Document> for Value {
    fn from(val: Document) -> Self {
        Value::Object(val)
    }
}

impl<T> From<Vec<T>> for Value
where
    T: Into<Value>,
{
    fn from(vals: Vec<T>) -> Self {
        Value::Array(vals.into_iter().map(|v| v.into()).collect())
    }
}

impl<T> From<&[T]> for Value
where
    T: Clone + Into<Value>,
{
    fn from(vals: &[T]) -> Self {
        Value::Array(vals.iter().cloned().map(|v| v.into()).collect())
    }
}

impl<T, const N: usize> From<[T; N]> for Value
where
    T: Into<Value>,
{
    fn from(vals: [T; N]) -> Self {
        Value::Array(vals.into_iter().map(|v| v.into()).collect())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

#[cfg(feature = "uuid-support")]
impl From<uuid::Uuid> for Value {
    fn from(val: uuid::Uuid) -> Self {
        Value::String(val.to_string())
    }
}

#[cfg(feature = "datetime-support")]
mod datetime {
    use super::Value;
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

    fn serialized<T: serde::Serialize>(val: &T) -> Value {
        serde_json::to_value(val)
            .map(Value::from_json)
            .unwrap_or(Value::Null)
    }

    impl From<DateTime<Utc>> for Value {
        fn from(val: DateTime<Utc>) -> Self {
            serialized(&val)
        }
    }

    impl From<NaiveDateTime> for Value {
        fn from(val: NaiveDateTime) -> Self {
            serialized(&val)
        }
    }

    impl From<NaiveDate> for Value {
        fn from(val: NaiveDate) -> Self {
            serialized(&val)
        }
    }
}

#[cfg(feature = "decimal-support")]
impl From<rust_decimal::Decimal> for Value {
    fn from(val: rust_decimal::Decimal) -> Self {
        Value::String(val.to_string())
    }
}
