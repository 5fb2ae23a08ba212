//! Application state shared across handlers.

use std::sync::Arc;

use crate::api::{ApiError, UsersClient};
use crate::config::PortalConfig;
use crate::session::TowerSessionStore;
use crate::ui::UiController;

/// Controller type used by the web handlers.
pub type WebController = UiController<UsersClient, TowerSessionStore>;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration and the users API client.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: PortalConfig,
    api: UsersClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the API client cannot be built for the configured
    /// base URL.
    pub fn new(config: PortalConfig) -> Result<Self, ApiError> {
        let api = UsersClient::new(config.api_base_url.clone())?;

        Ok(Self {
            inner: Arc::new(AppStateInner { config, api }),
        })
    }

    /// Get a reference to the portal configuration.
    #[must_use]
    pub fn config(&self) -> &PortalConfig {
        &self.inner.config
    }

    /// Get a reference to the users API client.
    #[must_use]
    pub fn api(&self) -> &UsersClient {
        &self.inner.api
    }

    /// Build a UI controller bound to one visitor's session.
    #[must_use]
    pub fn controller(&self, session: tower_sessions::Session) -> WebController {
        UiController::new(self.api().clone(), TowerSessionStore::new(session))
    }
}
