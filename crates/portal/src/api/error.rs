//! Errors returned by the users API client.

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when calling the users API.
///
/// `Display` is what the UI shows after `Error: `, so [`ApiError::Rejected`]
/// renders as the bare server message.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The API answered with a non-2xx status.
    #[error("{message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Server-provided `detail`, or the operation's fallback message.
        message: String,
    },

    /// The request never completed (connection refused, reset, DNS, ...).
    #[error("network error: {0}")]
    Transport(#[source] reqwest::Error),

    /// A 2xx response carried a body that is not the expected JSON.
    #[error("invalid response: {0}")]
    Decode(String),

    /// The configured API base URL cannot be used for requests.
    #[error("invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    /// A URL failed to parse.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// HTTP status of a rejected request, if the server answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Extract a user-facing message from an error response body.
///
/// Understands two shapes of `detail`:
/// - a string: `{"detail": "Username already exists"}`
/// - a list of validation errors: `{"detail": [{"msg": "..."}, ...]}`,
///   whose messages are joined with `; `
///
/// Returns `None` for empty messages, other shapes, and non-JSON bodies.
#[must_use]
pub fn error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;

    let message = match value.get("detail")? {
        Value::String(detail) => detail.clone(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.get("msg").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("; "),
        _ => return None,
    };

    (!message.is_empty()).then_some(message)
}
