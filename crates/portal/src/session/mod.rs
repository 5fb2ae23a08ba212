//! Client session persistence.
//!
//! The front end holds at most one [`Session`] at a time, stored under the
//! fixed key [`SESSION_KEY`]. Persistence is abstracted behind
//! [`SessionStore`] so the UI controller can be handed whichever backing
//! store fits the surface it runs in:
//!
//! - [`TowerSessionStore`] - per-visitor server session (web portal)
//! - [`MemorySessionStore`] - process-local map (tests, embedding)
//!
//! The CLI provides its own file-backed store.

mod server;

pub use server::TowerSessionStore;

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

use userdesk_core::Session;

/// Key under which the session object is stored.
pub const SESSION_KEY: &str = "demoUser";

/// Errors that can occur when reading or writing the session.
#[derive(Debug, Error)]
pub enum SessionStoreError {
    /// The backing store failed.
    #[error("session storage failed: {0}")]
    Backend(String),

    /// The stored value is not a valid session object.
    #[error("stored session is corrupt: {0}")]
    Corrupt(String),
}

/// Persistence for the single client session.
pub trait SessionStore: Send + Sync {
    /// Load the stored session, or `None` when nobody is logged in.
    fn get(&self) -> impl Future<Output = Result<Option<Session>, SessionStoreError>> + Send;

    /// Store `session`, replacing any previous one.
    fn set(&self, session: &Session) -> impl Future<Output = Result<(), SessionStoreError>> + Send;

    /// Remove the stored session. Clearing an empty store is not an error.
    fn clear(&self) -> impl Future<Output = Result<(), SessionStoreError>> + Send;
}

/// In-memory key-value session store.
///
/// Values are kept as serialized JSON strings, the way a browser's local
/// storage would hold them, so a corrupt entry can be planted with
/// [`insert_raw`](Self::insert_raw). Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw string under `key`, bypassing serialization.
    pub fn insert_raw(&self, key: impl Into<String>, raw: impl Into<String>) {
        self.lock().insert(key.into(), raw.into());
    }

    /// The raw string stored under `key`, if any.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // The map holds plain strings, so a poisoned lock is still consistent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for MemorySessionStore {
    async fn get(&self) -> Result<Option<Session>, SessionStoreError> {
        let Some(raw) = self.raw(SESSION_KEY) else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| SessionStoreError::Corrupt(e.to_string()))
    }

    async fn set(&self, session: &Session) -> Result<(), SessionStoreError> {
        let raw = serde_json::to_string(session)
            .map_err(|e| SessionStoreError::Backend(e.to_string()))?;
        self.insert_raw(SESSION_KEY, raw);
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionStoreError> {
        self.lock().remove(SESSION_KEY);
        Ok(())
    }
}
