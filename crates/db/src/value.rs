//! Firestore REST wire values.
//!
//! Every document field is a single-key object naming its type, e.g.
//! `{"stringValue": "hi"}` or `{"arrayValue": {"values": [...]}}`. The enum
//! below is externally tagged so serde maps that shape directly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Field map of a document or of a `mapValue`.
pub type Fields = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    NullValue(()),
    BooleanValue(bool),
    /// int64 travels as a decimal string.
    IntegerValue(String),
    DoubleValue(Double),
    TimestampValue(String),
    StringValue(String),
    BytesValue(String),
    ReferenceValue(String),
    GeoPointValue(serde_json::Value),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

/// A `doubleValue`. Finite numbers are JSON numbers; `NaN` and the
/// infinities arrive as the strings `"NaN"`, `"Infinity"`, `"-Infinity"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Double {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
    #[serde(default)]
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapValue {
    #[serde(default)]
    pub fields: Fields,
}

impl Value {
    pub fn string(text: impl Into<String>) -> Self {
        Value::StringValue(text.into())
    }

    pub fn timestamp(rfc3339: impl Into<String>) -> Self {
        Value::TimestampValue(rfc3339.into())
    }

    pub fn array(values: Vec<Value>) -> Self {
        Value::ArrayValue(ArrayValue { values })
    }

    pub fn map(fields: Fields) -> Self {
        Value::MapValue(MapValue { fields })
    }

    /// Text of a string or timestamp value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::StringValue(text) | Value::TimestampValue(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::ArrayValue(array) => Some(&array.values),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Fields> {
        match self {
            Value::MapValue(map) => Some(&map.fields),
            _ => None,
        }
    }
}

/// Trimmed text of `key` in `fields`; anything that is not text reads as empty.
pub fn text_field<'a>(fields: &'a Fields, key: &str) -> &'a str {
    fields
        .get(key)
        .and_then(Value::as_text)
        .map(str::trim)
        .unwrap_or_default()
}

/// A document as returned by the REST API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full resource name, `projects/../documents/../{id}`.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fields: Fields,
    #[serde(default)]
    pub create_time: Option<String>,
}

impl Document {
    /// Last path segment of the resource name.
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or_default()
    }
}

/// Body of a `GET` on a collection.
#[derive(Debug, Default, Deserialize)]
pub struct ListDocumentsResponse {
    #[serde(default)]
    pub documents: Vec<Document>,
}
