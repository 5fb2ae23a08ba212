//! Page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;

use userdesk_core::Session as UserSession;

use crate::error::AppError;
use crate::session::{SessionStore, SessionStoreError};
use crate::state::AppState;
use crate::ui::{LOADING, LOGGING_IN, REGISTERING, USERS_TABLE_COLUMNS};

/// Page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub session_info: String,
    pub registering: &'static str,
    pub logging_in: &'static str,
    pub loading: &'static str,
    pub colspan: usize,
}

impl IndexTemplate {
    /// Page with the given login status line.
    #[must_use]
    pub fn new(session_info: impl Into<String>) -> Self {
        Self {
            session_info: session_info.into(),
            registering: REGISTERING,
            logging_in: LOGGING_IN,
            loading: LOADING,
            colspan: USERS_TABLE_COLUMNS,
        }
    }
}

/// Display the page, rendering the current login state.
///
/// A corrupt stored session renders as logged out; a failing session backend
/// is a server error.
pub async fn index(
    State(state): State<AppState>,
    session: Session,
) -> Result<IndexTemplate, AppError> {
    let controller = state.controller(session);
    let current = match controller.sessions().get().await {
        Ok(current) => current,
        Err(SessionStoreError::Corrupt(reason)) => {
            tracing::warn!(%reason, "Ignoring unreadable session");
            None
        }
        Err(e) => return Err(e.into()),
    };

    Ok(IndexTemplate::new(UserSession::status_line_for(
        current.as_ref(),
    )))
}
