//! Session store backed by a tower-sessions server session.

use userdesk_core::Session;

use super::{SESSION_KEY, SessionStore, SessionStoreError};

/// Stores the session object in the visitor's tower-sessions session.
///
/// The portal builds one per request from the `Session` extractor, so each
/// browser (cookie) gets its own slot.
#[derive(Debug, Clone)]
pub struct TowerSessionStore {
    session: tower_sessions::Session,
}

impl TowerSessionStore {
    /// Wrap a request's server session.
    #[must_use]
    pub const fn new(session: tower_sessions::Session) -> Self {
        Self { session }
    }
}

impl SessionStore for TowerSessionStore {
    async fn get(&self) -> Result<Option<Session>, SessionStoreError> {
        let value = self
            .session
            .get_value(SESSION_KEY)
            .await
            .map_err(|e| SessionStoreError::Backend(e.to_string()))?;

        value
            .map(Session::from_value)
            .transpose()
            .map_err(|e| SessionStoreError::Corrupt(e.to_string()))
    }

    async fn set(&self, session: &Session) -> Result<(), SessionStoreError> {
        self.session
            .insert(SESSION_KEY, session)
            .await
            .map_err(|e| SessionStoreError::Backend(e.to_string()))
    }

    async fn clear(&self) -> Result<(), SessionStoreError> {
        self.session
            .remove_value(SESSION_KEY)
            .await
            .map_err(|e| SessionStoreError::Backend(e.to_string()))?;
        Ok(())
    }
}
