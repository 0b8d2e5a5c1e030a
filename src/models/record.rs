//! The schema-opaque record unit.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::SyncError;

/// One persisted entity instance, as returned by the API.
///
/// The engine treats records as opaque field maps; only the server-assigned
/// identifier is interpreted. The API stores it under `_id`, with `id`
/// accepted as a fallback. A record without either key has never completed a
/// server round-trip and is not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Build a record from a decoded JSON value; only objects qualify.
    pub fn from_value(value: Value) -> Result<Self, SyncError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(SyncError::Decode(format!(
                "expected a record object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// The server-assigned identifier, if this record has one.
    pub fn id(&self) -> Option<&str> {
        self.0
            .get("_id")
            .or_else(|| self.0.get("id"))
            .and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
