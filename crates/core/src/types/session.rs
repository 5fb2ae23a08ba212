//! Client-held session type.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{UserRecord, display_value};

/// Errors that can occur when building a [`Session`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The value is valid JSON but not an object.
    #[error("session must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// The record identifying the logged-in user.
///
/// A session is an opaque JSON object: whatever the login endpoint returned
/// is stored as-is. Only `id` and `username` are ever read back, and only to
/// render the login status line.
///
/// ## Examples
///
/// ```
/// use userdesk_core::{Session, UserRecord};
///
/// let session = Session::try_from(&UserRecord::new(1, "alice")).unwrap();
/// assert_eq!(session.username(), Some("alice"));
/// assert_eq!(session.status_line(), "Logged in as: alice (id=1)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Session(Map<String, Value>);

impl Session {
    /// Status line rendered when no session is held.
    pub const LOGGED_OUT: &'static str = "Not logged in";

    /// Build a session from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a JSON object.
    pub fn from_value(value: Value) -> Result<Self, SessionError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Err(SessionError::NotAnObject("null")),
            Value::Bool(_) => Err(SessionError::NotAnObject("a boolean")),
            Value::Number(_) => Err(SessionError::NotAnObject("a number")),
            Value::String(_) => Err(SessionError::NotAnObject("a string")),
            Value::Array(_) => Err(SessionError::NotAnObject("an array")),
        }
    }

    /// The stored `username` field, if it is a string.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.0.get("username").and_then(Value::as_str)
    }

    /// The stored `id` field, if present.
    #[must_use]
    pub fn id(&self) -> Option<&Value> {
        self.0.get("id")
    }

    /// Borrow the underlying JSON object.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Convert into a JSON value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Human-readable login status, e.g. `Logged in as: alice (id=1)`.
    ///
    /// Fields that are missing from the stored object render as `unknown`.
    #[must_use]
    pub fn status_line(&self) -> String {
        let username = self.0.get("username").map_or_else(unknown, display_value);
        let id = self.0.get("id").map_or_else(unknown, display_value);
        format!("Logged in as: {username} (id={id})")
    }

    /// Status line for an optional session.
    #[must_use]
    pub fn status_line_for(session: Option<&Self>) -> String {
        session.map_or_else(|| Self::LOGGED_OUT.to_string(), Self::status_line)
    }
}

impl TryFrom<&UserRecord> for Session {
    type Error = SessionError;

    /// Store a login response as-is; it only has to be an object.
    fn try_from(user: &UserRecord) -> Result<Self, Self::Error> {
        Self::from_value(user.as_value().clone())
    }
}

impl TryFrom<Value> for Session {
    type Error = SessionError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

fn unknown() -> String {
    "unknown".to_string()
}
