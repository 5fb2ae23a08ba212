//! UI event handlers.
//!
//! Each handler runs one controller action against the visitor's session and
//! answers with the resulting element updates as HTMX out-of-band swaps.
//! Failures are part of the fragment (`Error: ...`), so these handlers always
//! return 200.

use axum::{Form, extract::State};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use userdesk_core::Credentials;

use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::state::AppState;
use crate::ui::FragmentPage;

/// Register and login form data.
#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl From<CredentialsForm> for Credentials {
    fn from(form: CredentialsForm) -> Self {
        Self::new(form.username, form.password)
    }
}

/// Handle registration form submission.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> FragmentPage {
    add_breadcrumb("ui", "Registration submitted");

    let mut page = FragmentPage::new();
    // The outcome is already rendered into the page.
    let _ = state
        .controller(session)
        .on_register_submit(form.into(), &mut page)
        .await;
    page
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> FragmentPage {
    add_breadcrumb("ui", "Login submitted");

    let mut page = FragmentPage::new();
    if let Ok(user) = state
        .controller(session)
        .on_login_submit(form.into(), &mut page)
        .await
    {
        set_sentry_user(&user);
    }
    page
}

/// Handle logout.
#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, session: Session) -> FragmentPage {
    add_breadcrumb("ui", "Logout clicked");

    let mut page = FragmentPage::new();
    if state
        .controller(session)
        .on_logout_click(&mut page)
        .await
        .is_ok()
    {
        clear_sentry_user();
    }
    page
}

/// Handle the refresh-users button.
#[instrument(skip_all)]
pub async fn refresh_users(State(state): State<AppState>, session: Session) -> FragmentPage {
    add_breadcrumb("ui", "Users refresh clicked");

    let mut page = FragmentPage::new();
    if let Ok(count) = state
        .controller(session)
        .on_refresh_users_click(&mut page)
        .await
    {
        tracing::debug!(count, "Rendered users");
    }
    page
}
