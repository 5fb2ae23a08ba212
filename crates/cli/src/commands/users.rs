//! User directory commands: list all users, show one.
//!
//! # Usage
//!
//! ```bash
//! udesk users
//! udesk user alice
//! ```

use std::io::Write;

use userdesk_portal::api::{UsersApi, UsersClient};
use userdesk_portal::session::SessionStore;
use userdesk_portal::ui::{Page, UiController};

use crate::error::CliError;

/// Print the users table.
///
/// # Errors
///
/// Returns the API error after printing it.
pub async fn list<A: UsersApi, S: SessionStore, P: Page>(
    controller: &UiController<A, S>,
    page: &mut P,
) -> Result<usize, CliError> {
    Ok(controller.on_refresh_users_click(page).await?)
}

/// Print one user record as pretty JSON.
///
/// # Errors
///
/// Returns the API error (`User not found` for unknown names) or an output
/// error.
pub async fn show(
    client: &UsersClient,
    username: &str,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let user = client.fetch_user(username).await?;
    writeln!(out, "{}", user.to_pretty_json())?;
    Ok(())
}
