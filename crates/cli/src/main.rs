//! Userdesk CLI - the portal's actions from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Create an account
//! udesk register -u alice -p secret
//!
//! # Log in (the session is kept in .userdesk-session.json)
//! udesk login -u alice -p secret
//! udesk status
//!
//! # Browse users
//! udesk users
//! udesk user alice
//!
//! udesk logout
//! ```
//!
//! # Environment Variables
//!
//! - `USERDESK_API_BASE_URL` - users API root (default `http://localhost/api`)
//! - `USERDESK_SESSION_FILE` - session file path
//! - `USERDESK_PASSWORD` - password for `register` and `login`

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use url::Url;

use userdesk_core::Credentials;
use userdesk_portal::api::UsersClient;

mod commands;
mod error;
mod session_file;
mod terminal;

use commands::{CliController, account, stdout_page, users};
use error::CliError;
use session_file::FileSessionStore;

#[derive(Parser)]
#[command(name = "udesk")]
#[command(author, version, about = "Userdesk CLI")]
struct Cli {
    /// Users API base URL
    #[arg(
        long,
        global = true,
        env = "USERDESK_API_BASE_URL",
        default_value = "http://localhost/api"
    )]
    api_base_url: Url,

    /// File holding the logged-in session
    #[arg(
        long,
        global = true,
        env = "USERDESK_SESSION_FILE",
        default_value = ".userdesk-session.json"
    )]
    session_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show who is logged in
    Status,
    /// Create a new account
    Register(CredentialArgs),
    /// Log in and remember the session
    Login(CredentialArgs),
    /// Forget the stored session
    Logout,
    /// List all users
    Users,
    /// Show one user
    User {
        /// Username to look up
        username: String,
    },
}

#[derive(Args)]
struct CredentialArgs {
    /// Account username
    #[arg(short, long)]
    username: String,

    /// Account password
    #[arg(short, long, env = "USERDESK_PASSWORD", hide_env_values = true)]
    password: String,
}

impl From<CredentialArgs> for Credentials {
    fn from(args: CredentialArgs) -> Self {
        Self::new(args.username, args.password)
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries command output
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let client = UsersClient::new(cli.api_base_url)?;
    let sessions = FileSessionStore::new(cli.session_file);
    tracing::debug!(path = %sessions.path().display(), "Using session file");

    let controller = CliController::new(client.clone(), sessions);
    let mut page = stdout_page();

    let result = match cli.command {
        Commands::Status => {
            account::status(&controller, &mut page).await;
            Ok(())
        }
        Commands::Register(args) => account::register(&controller, args.into(), &mut page)
            .await
            .map(drop),
        Commands::Login(args) => account::login(&controller, args.into(), &mut page)
            .await
            .map(drop),
        Commands::Logout => account::logout(&controller, &mut page).await,
        Commands::Users => users::list(&controller, &mut page).await.map(drop),
        Commands::User { username } => {
            users::show(&client, &username, &mut std::io::stdout()).await
        }
    };

    page.finish()?;
    result
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["udesk", "status"]).unwrap();
        // Env overrides would make the defaults unobservable.
        if std::env::var_os("USERDESK_API_BASE_URL").is_none() {
            assert_eq!(cli.api_base_url.as_str(), "http://localhost/api");
        }
        if std::env::var_os("USERDESK_SESSION_FILE").is_none() {
            assert_eq!(cli.session_file, PathBuf::from(".userdesk-session.json"));
        }
        assert!(matches!(cli.command, Commands::Status));
    }

    #[test]
    fn test_login_arguments() {
        let cli = Cli::try_parse_from([
            "udesk",
            "--api-base-url",
            "http://example.com:8080/api",
            "login",
            "-u",
            "alice",
            "-p",
            "secret",
        ])
        .unwrap();

        assert_eq!(cli.api_base_url.port(), Some(8080));
        let Commands::Login(args) = cli.command else {
            panic!("expected login");
        };
        let credentials = Credentials::from(args);
        assert_eq!(credentials.username(), "alice");
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        assert!(Cli::try_parse_from(["udesk", "--api-base-url", "not a url", "users"]).is_err());
    }
}
