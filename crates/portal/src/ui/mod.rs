//! UI controller: maps page events to API calls and page updates.
//!
//! # Page contract
//!
//! ```text
//! #sessionInfo        - login status line
//! #registerForm       - username/password, submit → on_register_submit
//! #registerResult     - created user JSON or "Error: ..."
//! #loginForm          - username/password, submit → on_login_submit
//! #loginResult        - logged-in user JSON or "Error: ..."
//! #logoutBtn          - click → on_logout_click
//! #usersTable tbody   - one row per user, or one full-width message row
//! #refreshUsersBtn    - click → on_refresh_users_click
//! ```
//!
//! The controller owns no page state. It writes through a [`Page`], which the
//! web portal implements as HTMX fragments and the CLI as terminal output.
//! Each event handler is independent; two concurrent submissions simply race
//! and the last write to an element wins.

mod fragment;

pub use fragment::FragmentPage;

use thiserror::Error;

use userdesk_core::{Credentials, Session, SessionError, UserRecord};

use crate::api::{ApiError, UsersApi};
use crate::session::{SessionStore, SessionStoreError};

/// Placeholder shown while a registration is in flight.
pub const REGISTERING: &str = "Registering...";

/// Placeholder shown while a login is in flight.
pub const LOGGING_IN: &str = "Logging in...";

/// Placeholder row shown while the user list is loading.
pub const LOADING: &str = "Loading...";

/// Number of columns in the users table (`id`, `username`, `created_at`).
pub const USERS_TABLE_COLUMNS: usize = 3;

/// Page elements the controller writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    /// Login status line.
    SessionInfo,
    /// Output of the registration form.
    RegisterResult,
    /// Output of the login form.
    LoginResult,
    /// Users table (its body is replaced as a whole).
    UsersTable,
}

impl Element {
    /// The element's DOM id.
    #[must_use]
    pub const fn dom_id(self) -> &'static str {
        match self {
            Self::SessionInfo => "sessionInfo",
            Self::RegisterResult => "registerResult",
            Self::LoginResult => "loginResult",
            Self::UsersTable => "usersTable",
        }
    }
}

/// One rendered row of the users table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub created_at: String,
}

impl From<&UserRecord> for UserRow {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.field_text("id"),
            username: user.field_text("username"),
            created_at: user.field_text("created_at"),
        }
    }
}

/// Content of the users table body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsersTableBody {
    /// A single row spanning all [`USERS_TABLE_COLUMNS`] columns.
    Message(String),
    /// One row per user, in the given order.
    Rows(Vec<UserRow>),
}

/// Where the controller renders its output.
pub trait Page: Send {
    /// Replace the text content of `element`.
    fn set_text(&mut self, element: Element, text: String);

    /// Replace the body of the users table.
    fn set_users_table(&mut self, body: UsersTableBody);
}

/// Failure of a UI action, rendered inline as `Error: <display>`.
#[derive(Debug, Error)]
pub enum ActionError {
    /// The API call failed (HTTP rejection or transport).
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The session could not be saved or removed.
    #[error("could not update session: {0}")]
    Session(#[from] SessionStoreError),

    /// The login response cannot be held as a session.
    #[error("login response is not a session: {0}")]
    NotASession(#[from] SessionError),
}

/// Format an error the way every output element shows it.
fn error_text(err: &impl std::fmt::Display) -> String {
    format!("Error: {err}")
}

/// Wires page events to the users API and the session store.
///
/// Both dependencies are injected so tests can run the controller against a
/// stub API and an in-memory session store.
#[derive(Debug, Clone)]
pub struct UiController<A, S> {
    api: A,
    sessions: S,
}

impl<A: UsersApi, S: SessionStore> UiController<A, S> {
    /// Create a controller.
    pub const fn new(api: A, sessions: S) -> Self {
        Self { api, sessions }
    }

    /// The injected session store.
    pub const fn sessions(&self) -> &S {
        &self.sessions
    }

    /// Initial page load: render the current login state.
    pub async fn on_load<P: Page>(&self, page: &mut P) -> Option<Session> {
        self.render_session(page).await
    }

    /// Read the stored session and write the status line.
    ///
    /// A corrupt stored session is logged and rendered as logged out.
    pub async fn render_session<P: Page>(&self, page: &mut P) -> Option<Session> {
        let session = match self.sessions.get().await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable session");
                None
            }
        };

        page.set_text(
            Element::SessionInfo,
            Session::status_line_for(session.as_ref()),
        );
        session
    }

    /// Persist `session` and re-render the status line.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn set_session<P: Page>(
        &self,
        session: &Session,
        page: &mut P,
    ) -> Result<(), SessionStoreError> {
        self.sessions.set(session).await?;
        self.render_session(page).await;
        Ok(())
    }

    /// Remove the stored session and re-render the status line.
    ///
    /// The status line is rendered even if the store fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn clear_session<P: Page>(&self, page: &mut P) -> Result<(), SessionStoreError> {
        let result = self.sessions.clear().await;
        self.render_session(page).await;
        result
    }

    /// Registration form submitted.
    ///
    /// # Errors
    ///
    /// Returns the API error after rendering it into `#registerResult`.
    pub async fn on_register_submit<P: Page>(
        &self,
        credentials: Credentials,
        page: &mut P,
    ) -> Result<UserRecord, ActionError> {
        page.set_text(Element::RegisterResult, REGISTERING.to_string());

        match self.api.register_user(&credentials).await {
            Ok(user) => {
                tracing::info!(user_id = %user.field_text("id"), "User registered");
                page.set_text(Element::RegisterResult, user.to_pretty_json());
                Ok(user)
            }
            Err(e) => Err(Self::fail(page, Element::RegisterResult, e.into())),
        }
    }

    /// Login form submitted.
    ///
    /// On success the returned user becomes the session before the result is
    /// shown.
    ///
    /// # Errors
    ///
    /// Returns the API or session error after rendering it into
    /// `#loginResult`.
    pub async fn on_login_submit<P: Page>(
        &self,
        credentials: Credentials,
        page: &mut P,
    ) -> Result<UserRecord, ActionError> {
        page.set_text(Element::LoginResult, LOGGING_IN.to_string());

        let user = match self.api.login_user(&credentials).await {
            Ok(user) => user,
            Err(e) => return Err(Self::fail(page, Element::LoginResult, e.into())),
        };

        let session = match Session::try_from(&user) {
            Ok(session) => session,
            Err(e) => return Err(Self::fail(page, Element::LoginResult, e.into())),
        };
        if let Err(e) = self.set_session(&session, page).await {
            return Err(Self::fail(page, Element::LoginResult, e.into()));
        }

        tracing::info!(user_id = %user.field_text("id"), "User logged in");
        page.set_text(Element::LoginResult, user.to_pretty_json());
        Ok(user)
    }

    /// Logout button clicked.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn on_logout_click<P: Page>(&self, page: &mut P) -> Result<(), SessionStoreError> {
        self.clear_session(page).await.inspect_err(|e| {
            tracing::error!(error = %e, "Failed to clear session");
        })
    }

    /// Refresh-users button clicked. Returns the number of rows rendered.
    ///
    /// # Errors
    ///
    /// Returns the API error after rendering it as a full-width table row.
    pub async fn on_refresh_users_click<P: Page>(&self, page: &mut P) -> Result<usize, ApiError> {
        page.set_users_table(UsersTableBody::Message(LOADING.to_string()));

        match self.api.list_users().await {
            Ok(users) => {
                let rows: Vec<UserRow> = users.iter().map(UserRow::from).collect();
                let count = rows.len();
                page.set_users_table(UsersTableBody::Rows(rows));
                Ok(count)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to list users");
                page.set_users_table(UsersTableBody::Message(error_text(&e)));
                Err(e)
            }
        }
    }

    /// Render `err` into `element` and hand it back.
    fn fail<P: Page>(page: &mut P, element: Element, err: ActionError) -> ActionError {
        tracing::warn!(error = %err, element = element.dom_id(), "UI action failed");
        page.set_text(element, error_text(&err));
        err
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests;
