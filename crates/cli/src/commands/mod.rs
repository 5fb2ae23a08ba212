//! `udesk` subcommands.
//!
//! Every command except `user` runs a page action through the shared
//! [`UiController`](userdesk_portal::ui::UiController) and prints the result
//! to stdout. Failures are printed the same way the page shows them
//! (`Error: ...`) and also returned so the process exits non-zero.

pub mod account;
pub mod users;

use std::io::Stdout;

use userdesk_portal::api::UsersClient;
use userdesk_portal::ui::UiController;

use crate::session_file::FileSessionStore;
use crate::terminal::TerminalPage;

/// Controller wired to the real API and the session file.
pub type CliController = UiController<UsersClient, FileSessionStore>;

/// Page printing to stdout.
pub fn stdout_page() -> TerminalPage<Stdout> {
    TerminalPage::new(std::io::stdout())
}
