//! Users API client.
//!
//! # Architecture
//!
//! - One `reqwest` request per call: no retry, no timeout, no backoff
//! - JSON in, JSON out; non-2xx responses become [`ApiError::Rejected`]
//!   carrying the server's `detail` message
//! - [`UsersApi`] is the seam the UI controller depends on, so tests can
//!   substitute a stub for the network
//!
//! # Endpoints
//!
//! ```text
//! POST /users             - Register a user
//! POST /auth/login        - Log in
//! GET  /users             - List users
//! GET  /users/{username}  - Look up one user
//! GET  /healthz           - Upstream liveness ("ok")
//! ```
//!
//! All paths are relative to the API base URL, which defaults to the page
//! origin plus [`API_PREFIX`].

mod error;

pub use error::{ApiError, error_message};

use std::future::Future;

use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use userdesk_core::{Credentials, UserRecord};

/// Path prefix under which the users API is mounted on the page origin.
pub const API_PREFIX: &str = "/api";

/// Fallback message when a failed registration carries no `detail`.
pub const REGISTRATION_FAILED: &str = "Registration failed";

/// Fallback message when a failed login carries no `detail`.
pub const LOGIN_FAILED: &str = "Login failed";

/// Fallback message when a failed user listing carries no `detail`.
pub const FETCH_USERS_FAILED: &str = "Fetch users failed";

/// Fallback message when a failed user lookup carries no `detail`.
pub const FETCH_USER_FAILED: &str = "Fetch user failed";

/// Derive the API base URL from a page URL: its origin plus [`API_PREFIX`].
///
/// # Errors
///
/// Returns an error if the page URL has no usable origin (e.g. `data:` URLs).
pub fn api_base_from_origin(page: &Url) -> Result<Url, ApiError> {
    let origin = page.origin();
    if !origin.is_tuple() {
        return Err(ApiError::InvalidBaseUrl(page.to_string()));
    }
    Ok(Url::parse(&format!(
        "{}{API_PREFIX}",
        origin.ascii_serialization()
    ))?)
}

/// The operations the UI controller needs from the users API.
pub trait UsersApi: Send + Sync {
    /// Create a user. Returns the created record.
    fn register_user(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<UserRecord, ApiError>> + Send;

    /// Check credentials. Returns the authenticated user's record.
    fn login_user(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<UserRecord, ApiError>> + Send;

    /// List all users, in the order the server returns them.
    fn list_users(&self) -> impl Future<Output = Result<Vec<UserRecord>, ApiError>> + Send;
}

/// HTTP client for the users API.
///
/// Cheaply cloneable; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct UsersClient {
    http: reqwest::Client,
    base: Url,
}

impl UsersClient {
    /// Create a client rooted at `base` (e.g. `https://example.com/api`).
    ///
    /// # Errors
    ///
    /// Returns an error if `base` is not an `http`/`https` URL or the HTTP
    /// client fails to build.
    pub fn new(base: Url) -> Result<Self, ApiError> {
        if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base.to_string()));
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("userdesk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Transport)?;

        Ok(Self { http, base })
    }

    /// The API base URL this client talks to.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base
    }

    /// Look up a single user by username.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] with `User not found` (from the server)
    /// when the user does not exist, or a transport/decode error.
    #[instrument(skip(self))]
    pub async fn fetch_user(&self, username: &str) -> Result<UserRecord, ApiError> {
        let url = self.endpoint(&["users", username])?;
        self.send(self.http.get(url), FETCH_USER_FAILED).await
    }

    /// Check that the upstream API answers its liveness probe with `ok`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the status is not 2xx, or the
    /// body is anything other than `ok`.
    #[instrument(skip(self))]
    pub async fn health(&self) -> Result<(), ApiError> {
        let url = self.endpoint(&["healthz"])?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(ApiError::Transport)?;
        let status = response.status();
        let body = response.text().await.map_err(ApiError::Transport)?;

        if !status.is_success() {
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message: error_message(body.as_bytes())
                    .unwrap_or_else(|| "Health check failed".to_string()),
            });
        }
        if body.trim() != "ok" {
            return Err(ApiError::Decode(format!(
                "unexpected health response: {}",
                body.trim()
            )));
        }
        Ok(())
    }

    /// Build an endpoint URL by appending path segments to the base URL.
    ///
    /// Segments are percent-encoded, so usernames cannot escape their slot.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request and decode a JSON body.
    ///
    /// Non-2xx responses are turned into [`ApiError::Rejected`] using the
    /// body's `detail` field, or `fallback` when there is none.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        fallback: &str,
    ) -> Result<T, ApiError> {
        let response = request.send().await.map_err(ApiError::Transport)?;
        let status = response.status();
        let body = response.bytes().await.map_err(ApiError::Transport)?;

        if !status.is_success() {
            let message = error_message(&body).unwrap_or_else(|| fallback.to_string());
            tracing::debug!(status = status.as_u16(), %message, "API rejected request");
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

impl UsersApi for UsersClient {
    #[instrument(skip(self, credentials), fields(username = %credentials.username()))]
    async fn register_user(&self, credentials: &Credentials) -> Result<UserRecord, ApiError> {
        let url = self.endpoint(&["users"])?;
        let request = self.http.post(url).json(&credentials.to_json());
        self.send(request, REGISTRATION_FAILED).await
    }

    #[instrument(skip(self, credentials), fields(username = %credentials.username()))]
    async fn login_user(&self, credentials: &Credentials) -> Result<UserRecord, ApiError> {
        let url = self.endpoint(&["auth", "login"])?;
        let request = self.http.post(url).json(&credentials.to_json());
        self.send(request, LOGIN_FAILED).await
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<UserRecord>, ApiError> {
        let url = self.endpoint(&["users"])?;
        self.send(self.http.get(url), FETCH_USERS_FAILED).await
    }
}
