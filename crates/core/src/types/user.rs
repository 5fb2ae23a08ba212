//! User records as delivered by the users API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::display_value;

/// A user record returned by the users API, kept exactly as received.
///
/// Register, login, and lookup answer with a record like
/// `{"id": 1, "username": "alice", "created_at": "..."}`, but nothing about
/// that shape is enforced: any JSON value decodes, fields are read only when
/// rendered, and re-encoding reproduces the server's document (key order
/// included).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserRecord(Value);

impl UserRecord {
    /// Build an `{"id", "username"}` record.
    #[must_use]
    pub fn new(id: impl Into<Value>, username: impl Into<String>) -> Self {
        let mut map = Map::new();
        map.insert("id".to_string(), id.into());
        map.insert("username".to_string(), Value::String(username.into()));
        Self(Value::Object(map))
    }

    /// Set the `created_at` field. No-op unless the record is an object.
    #[must_use]
    pub fn with_created_at(mut self, created_at: impl Into<Value>) -> Self {
        if let Value::Object(map) = &mut self.0 {
            map.insert("created_at".to_string(), created_at.into());
        }
        self
    }

    /// A top-level field, if the record is an object that has it.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The `id` field, whatever its JSON type.
    #[must_use]
    pub fn id(&self) -> Option<&Value> {
        self.get("id")
    }

    /// The `username` field, if it is a string.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.get("username").and_then(Value::as_str)
    }

    /// A field as display text: strings unquoted, other values as JSON,
    /// missing or `null` fields empty.
    #[must_use]
    pub fn field_text(&self, key: &str) -> String {
        match self.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(value) => display_value(value),
        }
    }

    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Pretty-print the record as JSON with a two-space indent.
    #[must_use]
    pub fn to_pretty_json(&self) -> String {
        // A `Value` always serializes.
        serde_json::to_string_pretty(&self.0).unwrap_or_default()
    }
}

impl From<Value> for UserRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
