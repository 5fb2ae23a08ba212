//! CLI errors.

use thiserror::Error;

use userdesk_portal::api::ApiError;
use userdesk_portal::session::SessionStoreError;
use userdesk_portal::ui::ActionError;

/// Errors that end a `udesk` command with a failure exit status.
#[derive(Debug, Error)]
pub enum CliError {
    /// A register or login action failed.
    #[error(transparent)]
    Action(#[from] ActionError),

    /// A users API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The session file could not be updated.
    #[error(transparent)]
    Session(#[from] SessionStoreError),

    /// Output could not be written.
    #[error("could not write output: {0}")]
    Output(#[from] std::io::Error),
}
