//! Session commands: status, register, login, logout.
//!
//! # Usage
//!
//! ```bash
//! udesk status
//! udesk register -u alice -p secret
//! udesk login -u alice -p secret
//! udesk logout
//! ```

use userdesk_core::{Credentials, UserRecord};
use userdesk_portal::api::UsersApi;
use userdesk_portal::session::SessionStore;
use userdesk_portal::ui::{Page, UiController};

use crate::error::CliError;

/// Print the login status line.
pub async fn status<A: UsersApi, S: SessionStore, P: Page>(
    controller: &UiController<A, S>,
    page: &mut P,
) {
    controller.on_load(page).await;
}

/// Register a new account. Does not log in.
///
/// # Errors
///
/// Returns the API error after printing it.
pub async fn register<A: UsersApi, S: SessionStore, P: Page>(
    controller: &UiController<A, S>,
    credentials: Credentials,
    page: &mut P,
) -> Result<UserRecord, CliError> {
    Ok(controller.on_register_submit(credentials, page).await?)
}

/// Log in and store the session.
///
/// # Errors
///
/// Returns the API or session error after printing it.
pub async fn login<A: UsersApi, S: SessionStore, P: Page>(
    controller: &UiController<A, S>,
    credentials: Credentials,
    page: &mut P,
) -> Result<UserRecord, CliError> {
    let user = controller.on_login_submit(credentials, page).await?;
    tracing::debug!(user_id = %user.field_text("id"), "Session saved");
    Ok(user)
}

/// Forget the stored session.
///
/// # Errors
///
/// Returns an error if the session file cannot be removed.
pub async fn logout<A: UsersApi, S: SessionStore, P: Page>(
    controller: &UiController<A, S>,
    page: &mut P,
) -> Result<(), CliError> {
    Ok(controller.on_logout_click(page).await?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use userdesk_core::Session;
    use userdesk_portal::api::ApiError;
    use userdesk_portal::session::MemorySessionStore;

    use super::*;
    use crate::terminal::TerminalPage;

    /// API double answering every login with the same result.
    #[derive(Clone)]
    struct FixedApi {
        login: Arc<Mutex<Option<Result<UserRecord, ApiError>>>>,
    }

    impl FixedApi {
        fn answering(result: Result<UserRecord, ApiError>) -> Self {
            Self {
                login: Arc::new(Mutex::new(Some(result))),
            }
        }

        fn take(&self) -> Result<UserRecord, ApiError> {
            self.login.lock().unwrap().take().unwrap()
        }
    }

    impl UsersApi for FixedApi {
        async fn register_user(&self, _credentials: &Credentials) -> Result<UserRecord, ApiError> {
            self.take()
        }

        async fn login_user(&self, _credentials: &Credentials) -> Result<UserRecord, ApiError> {
            self.take()
        }

        async fn list_users(&self) -> Result<Vec<UserRecord>, ApiError> {
            Ok(Vec::new())
        }
    }

    fn printed(page: TerminalPage<Vec<u8>>) -> String {
        String::from_utf8(page.finish().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_login_prints_status_then_record() {
        let alice = UserRecord::new(1, "alice");
        let controller = UiController::new(
            FixedApi::answering(Ok(alice.clone())),
            MemorySessionStore::new(),
        );
        let mut page = TerminalPage::new(Vec::new());

        login(&controller, Credentials::new("alice", "pw"), &mut page)
            .await
            .unwrap();

        assert_eq!(
            printed(page),
            format!("Logged in as: alice (id=1)\n{}\n", alice.to_pretty_json())
        );
    }

    #[tokio::test]
    async fn test_failed_login_prints_error() {
        let controller = UiController::new(
            FixedApi::answering(Err(ApiError::Rejected {
                status: 401,
                message: "Invalid username or password".to_string(),
            })),
            MemorySessionStore::new(),
        );
        let mut page = TerminalPage::new(Vec::new());

        let err = login(&controller, Credentials::new("alice", "bad"), &mut page)
            .await
            .unwrap_err();

        assert!(matches!(err, CliError::Action(_)));
        assert_eq!(printed(page), "Error: Invalid username or password\n");
    }

    #[tokio::test]
    async fn test_status_and_logout() {
        let bob = UserRecord::new(7, "bob");
        let sessions = MemorySessionStore::new();
        sessions.set(&Session::try_from(&bob).unwrap()).await.unwrap();
        let controller = UiController::new(FixedApi::answering(Ok(bob)), sessions);

        let mut page = TerminalPage::new(Vec::new());
        status(&controller, &mut page).await;
        logout(&controller, &mut page).await.unwrap();
        status(&controller, &mut page).await;

        assert_eq!(
            printed(page),
            "Logged in as: bob (id=7)\nNot logged in\nNot logged in\n"
        );
    }
}
