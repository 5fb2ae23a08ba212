//! Controller tests with a stub API, an in-memory session store, and a page
//! that records every write.

use std::sync::{Arc, Mutex};

use serde_json::json;

use userdesk_core::UserRecord;

use super::*;
use crate::session::{MemorySessionStore, SESSION_KEY};

/// Canned API responses. Each call takes the next queued result.
#[derive(Default, Clone)]
struct StubApi {
    register: Arc<Mutex<Vec<Result<UserRecord, ApiError>>>>,
    login: Arc<Mutex<Vec<Result<UserRecord, ApiError>>>>,
    list: Arc<Mutex<Vec<Result<Vec<UserRecord>, ApiError>>>>,
    seen_usernames: Arc<Mutex<Vec<String>>>,
}

impl StubApi {
    fn on_register(self, result: Result<UserRecord, ApiError>) -> Self {
        self.register.lock().unwrap().push(result);
        self
    }

    fn on_login(self, result: Result<UserRecord, ApiError>) -> Self {
        self.login.lock().unwrap().push(result);
        self
    }

    fn on_list(self, result: Result<Vec<UserRecord>, ApiError>) -> Self {
        self.list.lock().unwrap().push(result);
        self
    }

    fn next<T>(queue: &Mutex<Vec<Result<T, ApiError>>>) -> Result<T, ApiError> {
        let mut queue = queue.lock().unwrap();
        assert!(!queue.is_empty(), "unexpected API call");
        queue.remove(0)
    }
}

impl UsersApi for StubApi {
    async fn register_user(&self, credentials: &Credentials) -> Result<UserRecord, ApiError> {
        self.seen_usernames
            .lock()
            .unwrap()
            .push(credentials.username().to_string());
        Self::next(&self.register)
    }

    async fn login_user(&self, credentials: &Credentials) -> Result<UserRecord, ApiError> {
        self.seen_usernames
            .lock()
            .unwrap()
            .push(credentials.username().to_string());
        Self::next(&self.login)
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, ApiError> {
        Self::next(&self.list)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Write {
    Text(Element, String),
    Table(UsersTableBody),
}

/// Records every write in order.
#[derive(Debug, Default)]
struct RecordingPage {
    writes: Vec<Write>,
}

impl RecordingPage {
    fn last_text(&self, element: Element) -> Option<&str> {
        self.writes.iter().rev().find_map(|w| match w {
            Write::Text(el, text) if *el == element => Some(text.as_str()),
            _ => None,
        })
    }

    fn texts_for(&self, element: Element) -> Vec<&str> {
        self.writes
            .iter()
            .filter_map(|w| match w {
                Write::Text(el, text) if *el == element => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn tables(&self) -> Vec<&UsersTableBody> {
        self.writes
            .iter()
            .filter_map(|w| match w {
                Write::Table(body) => Some(body),
                Write::Text(..) => None,
            })
            .collect()
    }
}

impl Page for RecordingPage {
    fn set_text(&mut self, element: Element, text: String) {
        self.writes.push(Write::Text(element, text));
    }

    fn set_users_table(&mut self, body: UsersTableBody) {
        self.writes.push(Write::Table(body));
    }
}

fn rejected(status: u16, message: &str) -> ApiError {
    ApiError::Rejected {
        status,
        message: message.to_string(),
    }
}

fn controller(api: StubApi) -> (UiController<StubApi, MemorySessionStore>, MemorySessionStore) {
    let store = MemorySessionStore::new();
    (UiController::new(api, store.clone()), store)
}

#[tokio::test]
async fn test_on_load_renders_logged_out() {
    let (controller, _) = controller(StubApi::default());
    let mut page = RecordingPage::default();

    assert_eq!(controller.on_load(&mut page).await, None);
    assert_eq!(page.last_text(Element::SessionInfo), Some("Not logged in"));
}

#[tokio::test]
async fn test_on_load_renders_stored_session() {
    let (controller, store) = controller(StubApi::default());
    store.insert_raw(SESSION_KEY, r#"{"id":5,"username":"erin"}"#);
    let mut page = RecordingPage::default();

    controller.on_load(&mut page).await;
    assert_eq!(
        page.last_text(Element::SessionInfo),
        Some("Logged in as: erin (id=5)")
    );
}

#[tokio::test]
async fn test_on_load_with_corrupt_session_renders_logged_out() {
    let (controller, store) = controller(StubApi::default());
    store.insert_raw(SESSION_KEY, "{broken");
    let mut page = RecordingPage::default();

    assert_eq!(controller.on_load(&mut page).await, None);
    assert_eq!(page.last_text(Element::SessionInfo), Some("Not logged in"));
}

#[tokio::test]
async fn test_set_and_clear_session_rerender() {
    let (controller, store) = controller(StubApi::default());
    let mut page = RecordingPage::default();
    let session = Session::from_value(json!({"id": 3, "username": "dan"})).unwrap();

    controller.set_session(&session, &mut page).await.unwrap();
    assert_eq!(store.get().await.unwrap(), Some(session));
    assert_eq!(
        page.last_text(Element::SessionInfo),
        Some("Logged in as: dan (id=3)")
    );

    controller.clear_session(&mut page).await.unwrap();
    assert_eq!(store.get().await.unwrap(), None);
    assert_eq!(page.last_text(Element::SessionInfo), Some("Not logged in"));
}

#[tokio::test]
async fn test_register_success_shows_pretty_json() {
    let user = UserRecord::new(1, "alice").with_created_at("2025-01-01 00:00:00");
    let api = StubApi::default().on_register(Ok(user.clone()));
    let (controller, store) = controller(api.clone());
    let mut page = RecordingPage::default();

    let result = controller
        .on_register_submit(Credentials::new("alice", "hunter22"), &mut page)
        .await
        .unwrap();

    assert_eq!(result, user);
    assert_eq!(
        page.texts_for(Element::RegisterResult),
        vec![
            "Registering...",
            "{\n  \"id\": 1,\n  \"username\": \"alice\",\n  \"created_at\": \"2025-01-01 00:00:00\"\n}",
        ]
    );
    assert_eq!(api.seen_usernames.lock().unwrap().as_slice(), ["alice"]);
    // Registering does not log anyone in.
    assert_eq!(store.get().await.unwrap(), None);
}

#[tokio::test]
async fn test_register_rejection_shows_detail() {
    let api = StubApi::default().on_register(Err(rejected(400, "username taken")));
    let (controller, _) = controller(api);
    let mut page = RecordingPage::default();

    let err = controller
        .on_register_submit(Credentials::new("alice", "hunter22"), &mut page)
        .await
        .unwrap_err();

    assert!(matches!(err, ActionError::Api(ApiError::Rejected { status: 400, .. })));
    assert_eq!(
        page.last_text(Element::RegisterResult),
        Some("Error: username taken")
    );
}

#[tokio::test]
async fn test_login_success_commits_session_and_renders() {
    let user: UserRecord = serde_json::from_value(json!({"id": 1, "username": "alice"})).unwrap();
    let api = StubApi::default().on_login(Ok(user));
    let (controller, store) = controller(api);
    let mut page = RecordingPage::default();

    controller
        .on_login_submit(Credentials::new("alice", "hunter22"), &mut page)
        .await
        .unwrap();

    let stored = store.get().await.unwrap().unwrap();
    assert_eq!(stored.into_value(), json!({"id": 1, "username": "alice"}));
    assert_eq!(
        page.last_text(Element::SessionInfo),
        Some("Logged in as: alice (id=1)")
    );
    assert_eq!(
        page.texts_for(Element::LoginResult),
        vec!["Logging in...", "{\n  \"id\": 1,\n  \"username\": \"alice\"\n}"]
    );
}

#[tokio::test]
async fn test_login_overwrites_previous_session() {
    let api = StubApi::default()
        .on_login(Ok(UserRecord::new(1, "alice")))
        .on_login(Ok(UserRecord::new(2, "bob")));
    let (controller, store) = controller(api);
    let mut page = RecordingPage::default();

    controller
        .on_login_submit(Credentials::new("alice", "pw-alice"), &mut page)
        .await
        .unwrap();
    controller
        .on_login_submit(Credentials::new("bob", "pw-bob"), &mut page)
        .await
        .unwrap();

    assert_eq!(
        store.get().await.unwrap().unwrap().username(),
        Some("bob")
    );
    assert_eq!(
        page.last_text(Element::SessionInfo),
        Some("Logged in as: bob (id=2)")
    );
}

#[tokio::test]
async fn test_login_failure_keeps_existing_session() {
    let api = StubApi::default().on_login(Err(rejected(401, "Invalid username or password")));
    let (controller, store) = controller(api);
    store.insert_raw(SESSION_KEY, r#"{"id":9,"username":"zoe"}"#);
    let mut page = RecordingPage::default();

    controller
        .on_login_submit(Credentials::new("zoe", "wrong"), &mut page)
        .await
        .unwrap_err();

    assert_eq!(
        page.last_text(Element::LoginResult),
        Some("Error: Invalid username or password")
    );
    assert_eq!(store.get().await.unwrap().unwrap().username(), Some("zoe"));
    // The status line was not touched by the failed login.
    assert_eq!(page.last_text(Element::SessionInfo), None);
}

#[tokio::test]
async fn test_login_with_string_id_commits_session() {
    let user = UserRecord::from(json!({"id": "u-7", "username": "eve"}));
    let api = StubApi::default().on_login(Ok(user));
    let (controller, store) = controller(api);
    let mut page = RecordingPage::default();

    let returned = controller
        .on_login_submit(Credentials::new("eve", "pw"), &mut page)
        .await
        .unwrap();

    assert_eq!(returned.id(), Some(&json!("u-7")));
    assert_eq!(
        store.get().await.unwrap().unwrap().into_value(),
        json!({"id": "u-7", "username": "eve"})
    );
    assert_eq!(
        page.last_text(Element::SessionInfo),
        Some("Logged in as: eve (id=u-7)")
    );
}

#[tokio::test]
async fn test_login_response_that_is_not_an_object_keeps_session() {
    let api = StubApi::default().on_login(Ok(UserRecord::from(json!("ok"))));
    let (controller, store) = controller(api);
    store.insert_raw(SESSION_KEY, r#"{"id":9,"username":"zoe"}"#);
    let mut page = RecordingPage::default();

    let err = controller
        .on_login_submit(Credentials::new("zoe", "pw"), &mut page)
        .await
        .unwrap_err();

    assert!(matches!(err, ActionError::NotASession(_)));
    assert_eq!(
        page.last_text(Element::LoginResult),
        Some("Error: login response is not a session: session must be a JSON object, got a string")
    );
    assert_eq!(store.get().await.unwrap().unwrap().username(), Some("zoe"));
    assert_eq!(page.last_text(Element::SessionInfo), None);
}

#[tokio::test]
async fn test_logout_clears_session() {
    let (controller, store) = controller(StubApi::default());
    store.insert_raw(SESSION_KEY, r#"{"id":1,"username":"alice"}"#);
    let mut page = RecordingPage::default();

    controller.on_logout_click(&mut page).await.unwrap();

    assert_eq!(store.get().await.unwrap(), None);
    assert_eq!(page.last_text(Element::SessionInfo), Some("Not logged in"));
}

#[tokio::test]
async fn test_refresh_users_renders_rows_in_server_order() {
    let users = vec![
        UserRecord::new(2, "bob").with_created_at("2025-01-02 00:00:00"),
        UserRecord::new(1, "alice").with_created_at("2025-01-01 00:00:00"),
    ];
    let api = StubApi::default().on_list(Ok(users));
    let (controller, _) = controller(api);
    let mut page = RecordingPage::default();

    let count = controller.on_refresh_users_click(&mut page).await.unwrap();

    assert_eq!(count, 2);
    assert_eq!(
        page.tables(),
        vec![
            &UsersTableBody::Message("Loading...".to_string()),
            &UsersTableBody::Rows(vec![
                UserRow {
                    id: "2".to_string(),
                    username: "bob".to_string(),
                    created_at: "2025-01-02 00:00:00".to_string(),
                },
                UserRow {
                    id: "1".to_string(),
                    username: "alice".to_string(),
                    created_at: "2025-01-01 00:00:00".to_string(),
                },
            ]),
        ]
    );
}

#[tokio::test]
async fn test_refresh_users_renders_partial_rows() {
    let users = vec![
        UserRecord::from(json!({"id": 1, "username": "alice", "created_at": null})),
        UserRecord::from(json!({"id": "u-2"})),
    ];
    let api = StubApi::default().on_list(Ok(users));
    let (controller, _) = controller(api);
    let mut page = RecordingPage::default();

    assert_eq!(controller.on_refresh_users_click(&mut page).await.unwrap(), 2);
    assert_eq!(
        page.tables().last(),
        Some(&&UsersTableBody::Rows(vec![
            UserRow {
                id: "1".to_string(),
                username: "alice".to_string(),
                created_at: String::new(),
            },
            UserRow {
                id: "u-2".to_string(),
                username: String::new(),
                created_at: String::new(),
            },
        ]))
    );
}

#[tokio::test]
async fn test_refresh_users_with_empty_list() {
    let api = StubApi::default().on_list(Ok(Vec::new()));
    let (controller, _) = controller(api);
    let mut page = RecordingPage::default();

    assert_eq!(controller.on_refresh_users_click(&mut page).await.unwrap(), 0);
    assert_eq!(
        page.tables().last(),
        Some(&&UsersTableBody::Rows(Vec::new()))
    );
}

#[tokio::test]
async fn test_refresh_users_failure_renders_error_row() {
    let api = StubApi::default().on_list(Err(rejected(500, "Fetch users failed")));
    let (controller, _) = controller(api);
    let mut page = RecordingPage::default();

    controller
        .on_refresh_users_click(&mut page)
        .await
        .unwrap_err();

    assert_eq!(
        page.tables().last(),
        Some(&&UsersTableBody::Message("Error: Fetch users failed".to_string()))
    );
}

#[tokio::test]
async fn test_transport_and_http_errors_share_one_render_path() {
    let api = StubApi::default()
        .on_register(Err(ApiError::Decode("expected value".to_string())))
        .on_register(Err(rejected(409, "Username already exists")));
    let (controller, _) = controller(api);
    let mut page = RecordingPage::default();

    controller
        .on_register_submit(Credentials::new("a", "b"), &mut page)
        .await
        .unwrap_err();
    assert_eq!(
        page.last_text(Element::RegisterResult),
        Some("Error: invalid response: expected value")
    );

    controller
        .on_register_submit(Credentials::new("a", "b"), &mut page)
        .await
        .unwrap_err();
    assert_eq!(
        page.last_text(Element::RegisterResult),
        Some("Error: Username already exists")
    );
}

#[tokio::test]
async fn test_fragment_page_drives_the_same_controller() {
    let api = StubApi::default().on_register(Err(rejected(400, "username taken")));
    let (controller, _) = controller(api);
    let mut page = FragmentPage::new();

    controller
        .on_register_submit(Credentials::new("alice", "hunter22"), &mut page)
        .await
        .unwrap_err();

    assert_eq!(
        page.text(Element::RegisterResult),
        Some("Error: username taken")
    );
}
