//! Core types for userdesk.
//!
//! This module provides the users API domain: records, credentials, and the
//! client-held session. Records and sessions are opaque JSON; only the
//! fields the front end renders are ever read.

pub mod credentials;
pub mod session;
pub mod user;

pub use credentials::Credentials;
pub use session::{Session, SessionError};
pub use user::UserRecord;

use serde_json::Value;

/// Strings render without quotes; everything else in its JSON form.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
