//! Unified error handling with Sentry integration.
//!
//! UI actions render their own failures inline, so `AppError` only covers the
//! requests that cannot: the full-page render and fragment rendering itself.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use userdesk_core::UserRecord;

use crate::session::SessionStoreError;

/// Application-level error type for the portal.
#[derive(Debug, Error)]
pub enum AppError {
    /// Session storage failed.
    #[error("Session error: {0}")]
    Session(#[from] SessionStoreError),

    /// Template rendering failed.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let event_id = sentry::capture_error(&self);
        tracing::error!(
            error = %self,
            sentry_event_id = %event_id,
            "Request error"
        );

        // Don't expose internal error details to clients
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
    }
}

/// Set the Sentry user context after a successful login.
pub fn set_sentry_user(user: &UserRecord) {
    let id = user.field_text("id");
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: (!id.is_empty()).then_some(id),
            username: user.username().map(str::to_string),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context on logout.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for a UI action.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str) {
    sentry::add_breadcrumb(sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Session(SessionStoreError::Backend("store down".to_string()));
        assert_eq!(
            err.to_string(),
            "Session error: session storage failed: store down"
        );
    }

    #[tokio::test]
    async fn test_app_error_hides_details() {
        let response =
            AppError::Session(SessionStoreError::Backend("redis://secret".to_string()))
                .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Internal server error");
    }
}
