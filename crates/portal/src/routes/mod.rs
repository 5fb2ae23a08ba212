//! HTTP route handlers for the portal.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                     - Page (session line rendered on load)
//! GET  /health               - Liveness check
//! GET  /health/ready         - Readiness check (users API reachable)
//!
//! # UI events (HTMX fragments)
//! POST /ui/register          - Registration form submitted
//! POST /ui/login             - Login form submitted
//! POST /ui/logout            - Logout button clicked
//! POST /ui/users/refresh     - Refresh-users button clicked
//! ```

pub mod health;
pub mod home;
pub mod ui;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::middleware::{
    RequestSpan, create_session_layer, propagate_request_id_layer, set_request_id_layer,
};
use crate::state::AppState;

/// Create the UI event routes router.
pub fn ui_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(ui::register))
        .route("/login", post(ui::login))
        .route("/logout", post(ui::logout))
        .route("/users/refresh", post(ui::refresh_users))
}

/// Create all routes for the portal.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::index))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/ui", ui_routes())
}

/// Build the complete application: routes, sessions, tracing, request IDs.
///
/// Sentry layers are left to the binary so tests can run without a client.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    routes()
        .layer(session_layer)
        .layer(TraceLayer::new_for_http().make_span_with(RequestSpan))
        .layer(propagate_request_id_layer())
        .layer(set_request_id_layer())
        .with_state(state)
}
