//! File-backed session store.
//!
//! The file holds one JSON object mapping keys to values, the same shape a
//! browser's local storage has; the session lives under [`SESSION_KEY`].

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use uuid::Uuid;

use userdesk_core::Session;
use userdesk_portal::session::{SESSION_KEY, SessionStore, SessionStoreError};

/// Session store kept in a JSON file between CLI invocations.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole key-value map. A missing file is an empty map.
    async fn load(&self) -> Result<Map<String, Value>, SessionStoreError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(backend(&self.path, &e)),
        };

        match serde_json::from_str(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(SessionStoreError::Corrupt(format!(
                "{} does not hold a JSON object",
                self.path.display()
            ))),
            Err(e) => Err(SessionStoreError::Corrupt(format!(
                "{}: {e}",
                self.path.display()
            ))),
        }
    }

    /// Like [`load`](Self::load), but a corrupt file counts as empty so the
    /// next write replaces it.
    async fn load_or_reset(&self) -> Result<Map<String, Value>, SessionStoreError> {
        match self.load().await {
            Err(SessionStoreError::Corrupt(reason)) => {
                tracing::warn!(%reason, "Replacing corrupt session file");
                Ok(Map::new())
            }
            other => other,
        }
    }

    /// Replace the file contents, writing through a sibling temp file.
    async fn store(&self, map: Map<String, Value>) -> Result<(), SessionStoreError> {
        let raw = serde_json::to_string_pretty(&Value::Object(map))
            .map_err(|e| SessionStoreError::Backend(e.to_string()))?;

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, raw)
            .await
            .map_err(|e| backend(&tmp, &e))?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
                tracing::error!(
                    path = %tmp.display(),
                    error = %cleanup,
                    "Failed to remove temp session file"
                );
            }
            return Err(backend(&self.path, &e));
        }
        Ok(())
    }

    /// A fresh `<file>.<uuid>.tmp` next to the session file.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(format!(".{}.tmp", Uuid::new_v4()));
        self.path.with_file_name(name)
    }
}

fn backend(path: &Path, err: &std::io::Error) -> SessionStoreError {
    SessionStoreError::Backend(format!("{}: {err}", path.display()))
}

impl SessionStore for FileSessionStore {
    async fn get(&self) -> Result<Option<Session>, SessionStoreError> {
        let mut map = self.load().await?;
        match map.remove(SESSION_KEY) {
            Some(value) => Session::try_from(value)
                .map(Some)
                .map_err(|e| SessionStoreError::Corrupt(e.to_string())),
            None => Ok(None),
        }
    }

    async fn set(&self, session: &Session) -> Result<(), SessionStoreError> {
        let mut map = self.load_or_reset().await?;
        map.insert(SESSION_KEY.to_string(), session.clone().into_value());
        self.store(map).await
    }

    async fn clear(&self) -> Result<(), SessionStoreError> {
        let mut map = self.load_or_reset().await?;
        if map.remove(SESSION_KEY).is_none() {
            return Ok(());
        }
        if map.is_empty() {
            return match tokio::fs::remove_file(&self.path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(backend(&self.path, &e)),
            };
        }
        self.store(map).await
    }
}
