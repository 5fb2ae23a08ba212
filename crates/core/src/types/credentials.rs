//! Login and registration credentials.

use core::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};

/// A username/password pair as submitted by the register and login forms.
///
/// No client-side validation is applied; the API decides what is acceptable.
/// `Debug` redacts the password.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: SecretString,
}

impl Credentials {
    /// Create credentials from form input.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// The submitted username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The submitted password.
    #[must_use]
    pub const fn password(&self) -> &SecretString {
        &self.password
    }

    /// JSON request body: `{"username": ..., "password": ...}`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "username": self.username,
            "password": self.password.expose_secret(),
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
