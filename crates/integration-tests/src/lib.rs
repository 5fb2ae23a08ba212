//! Integration tests for the userdesk portal.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p userdesk-integration-tests
//! ```
//!
//! Everything runs in-process: [`FakeUsersApi`] stands in for the users
//! service and [`TestContext`] serves it next to the portal router, each on
//! an ephemeral port.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use url::Url;

use userdesk_core::UserRecord;
use userdesk_portal::config::PortalConfig;
use userdesk_portal::state::AppState;

/// Timestamp given to every created user.
pub const CREATED_AT: &str = "2024-01-01T00:00:00";

#[derive(Debug)]
struct StoredUser {
    record: UserRecord,
    password: String,
}

#[derive(Debug, Deserialize)]
struct CredentialsBody {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

/// In-memory users service speaking the same JSON as the real one.
///
/// ```text
/// POST /api/users              201 record | 409 | 422 (detail list)
/// POST /api/auth/login         200 record | 401
/// GET  /api/users              200 records in creation order
/// GET  /api/users/{username}   200 record | 404
/// GET  /api/healthz            "ok"
/// ```
#[derive(Debug, Clone, Default)]
pub struct FakeUsersApi {
    users: Arc<Mutex<Vec<StoredUser>>>,
}

impl FakeUsersApi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<StoredUser>> {
        self.users.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Router serving the API under `/api`.
    pub fn router(&self) -> Router {
        let api = Router::new()
            .route("/users", post(create_user).get(list_users))
            .route("/users/{username}", get(get_user))
            .route("/auth/login", post(login))
            .route("/healthz", get(|| async { "ok" }));

        Router::new().nest("/api", api).with_state(self.clone())
    }
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

async fn create_user(
    State(api): State<FakeUsersApi>,
    Json(body): Json<CredentialsBody>,
) -> Response {
    let mut problems = Vec::new();
    if body.username.is_empty() {
        problems.push(json!({ "loc": ["body", "username"], "msg": "username must not be empty" }));
    }
    if body.password.is_empty() {
        problems.push(json!({ "loc": ["body", "password"], "msg": "password must not be empty" }));
    }
    if !problems.is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "detail": problems })),
        )
            .into_response();
    }

    let mut users = api.lock();
    if users.iter().any(|u| u.record.username() == Some(body.username.as_str())) {
        return detail(StatusCode::CONFLICT, "Username already exists");
    }

    let id = i64::try_from(users.len()).unwrap_or(i64::MAX - 1) + 1;
    let record = UserRecord::new(id, body.username.as_str()).with_created_at(CREATED_AT);
    users.push(StoredUser {
        record: record.clone(),
        password: body.password,
    });

    (StatusCode::CREATED, Json(record)).into_response()
}

async fn login(State(api): State<FakeUsersApi>, Json(body): Json<CredentialsBody>) -> Response {
    let users = api.lock();
    users
        .iter()
        .find(|u| u.record.username() == Some(body.username.as_str()) && u.password == body.password)
        .map_or_else(
            || detail(StatusCode::UNAUTHORIZED, "Invalid username or password"),
            |u| Json(u.record.clone()).into_response(),
        )
}

async fn list_users(State(api): State<FakeUsersApi>) -> Json<Vec<UserRecord>> {
    Json(api.lock().iter().map(|u| u.record.clone()).collect())
}

async fn get_user(State(api): State<FakeUsersApi>, Path(username): Path<String>) -> Response {
    let users = api.lock();
    users.iter().find(|u| u.record.username() == Some(username.as_str())).map_or_else(
        || detail(StatusCode::NOT_FOUND, "User not found"),
        |u| Json(u.record.clone()).into_response(),
    )
}

/// Serve `router` on an ephemeral local port.
pub async fn spawn(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local address");

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Test server failed");
    });

    addr
}

/// A running portal wired to a fake users API.
pub struct TestContext {
    /// Cookie-keeping client, like a browser tab.
    pub client: reqwest::Client,
    pub portal_url: Url,
    pub api: FakeUsersApi,
}

impl TestContext {
    /// Start a fake users API and a portal in front of it.
    pub async fn new() -> Self {
        let api = FakeUsersApi::new();
        let api_addr = spawn(api.router()).await;
        Self::with_api_base(api, &format!("http://{api_addr}/api")).await
    }

    /// Start a portal whose users API is not reachable.
    pub async fn without_api() -> Self {
        // Grab a free port, then release it so nothing is listening there.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind probe listener");
        let addr = listener.local_addr().expect("Failed to read local address");
        drop(listener);

        Self::with_api_base(FakeUsersApi::new(), &format!("http://{addr}/api")).await
    }

    async fn with_api_base(api: FakeUsersApi, api_base: &str) -> Self {
        let api_base = api_base.to_string();
        let config = PortalConfig::from_lookup(|key| match key {
            "PORTAL_BASE_URL" => Some("http://127.0.0.1".to_string()),
            "PORTAL_API_BASE_URL" => Some(api_base.clone()),
            _ => None,
        })
        .expect("Failed to build portal config");

        let state = AppState::new(config).expect("Failed to build portal state");
        let portal_addr = spawn(userdesk_portal::routes::app(state)).await;

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            portal_url: Url::parse(&format!("http://{portal_addr}/"))
                .expect("Failed to parse portal URL"),
            api,
        }
    }

    /// Absolute URL of a portal path.
    pub fn url(&self, path: &str) -> Url {
        self.portal_url.join(path).expect("Invalid portal path")
    }

    /// `GET` a portal page and return its body.
    pub async fn get(&self, path: &str) -> (reqwest::StatusCode, String) {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Request failed");
        let status = resp.status();
        (status, resp.text().await.expect("Failed to read body"))
    }

    /// `POST` a UI event with optional form fields and return the fragment.
    pub async fn post(&self, path: &str, form: &[(&str, &str)]) -> (reqwest::StatusCode, String) {
        let resp = self
            .client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("Request failed");
        let status = resp.status();
        (status, resp.text().await.expect("Failed to read body"))
    }

    pub async fn register(&self, username: &str, password: &str) -> String {
        self.post(
            "/ui/register",
            &[("username", username), ("password", password)],
        )
        .await
        .1
    }

    pub async fn login(&self, username: &str, password: &str) -> String {
        self.post("/ui/login", &[("username", username), ("password", password)])
            .await
            .1
    }
}
