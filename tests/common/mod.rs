//! Shared test helpers: an in-process mock of the directory API and
//! store wrappers for simulating storage failures.

#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use contactbook::api::{ApiClient, CredentialProvider};
use contactbook::config::ApiConfig;
use contactbook::error::{Error, Result};
use contactbook::session::{SessionManager, SessionSettings};
use contactbook::storage::{MemoryStore, SecureStore};

pub const PASSWORD: &str = "password123";
pub const DODI: &str = "dodi@stis.ac.id";
/// Login for this account is held for `SLOW_LOGIN` before answering
pub const SLOW: &str = "slow@stis.ac.id";
/// Login for this account succeeds but returns no token
pub const NO_TOKEN: &str = "notoken@stis.ac.id";
pub const TAKEN: &str = "taken@stis.ac.id";
/// Token pre-registered with the mock as valid for Dodi
pub const VALID_TOKEN: &str = "valid-dodi-token";

pub const SLOW_LOGIN: Duration = Duration::from_millis(300);

#[derive(Clone)]
struct Account {
    id: i64,
    name: String,
    email: String,
    role: String,
}

#[derive(Default)]
struct MockState {
    accounts: HashMap<String, Account>,
    /// token -> account email
    tokens: HashMap<String, String>,
    next_id: i64,
}

/// Mock of the remote API, cloneable handle shared with the server task
#[derive(Clone)]
pub struct MockApi {
    state: Arc<Mutex<MockState>>,
    profile_hits: Arc<AtomicUsize>,
}

impl MockApi {
    pub fn new() -> Self {
        let mut state = MockState {
            next_id: 10,
            ..MockState::default()
        };
        for (id, name, email, role) in [
            (1, "Dodi Firmansyah", DODI, "USER"),
            (2, "Slow Sender", SLOW, "USER"),
            (3, "No Token", NO_TOKEN, "USER"),
            (4, "Already Here", TAKEN, "ADMIN"),
        ] {
            state.accounts.insert(
                email.to_string(),
                Account {
                    id,
                    name: name.to_string(),
                    email: email.to_string(),
                    role: role.to_string(),
                },
            );
        }
        state
            .tokens
            .insert(VALID_TOKEN.to_string(), DODI.to_string());

        Self {
            state: Arc::new(Mutex::new(state)),
            profile_hits: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make the server stop accepting `token`
    pub fn revoke(&self, token: &str) {
        self.state.lock().unwrap().tokens.remove(token);
    }

    /// Number of requests that reached the profile endpoint
    pub fn profile_hits(&self) -> usize {
        self.profile_hits.load(Ordering::SeqCst)
    }

    fn account_for(&self, headers: &HeaderMap) -> Option<Account> {
        let token = headers
            .get("Authorization")?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?;
        let state = self.state.lock().unwrap();
        let email = state.tokens.get(token)?;
        state.accounts.get(email).cloned()
    }

    fn issue_token(&self, email: &str) -> String {
        let token = format!("token-{}-{}", email, self.state.lock().unwrap().tokens.len());
        self.state
            .lock()
            .unwrap()
            .tokens
            .insert(token.clone(), email.to_string());
        token
    }

    /// Start serving on an ephemeral port, returning the base URL
    pub async fn spawn(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(self.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{}", addr)
    }
}

fn profile_json(account: &Account) -> Value {
    json!({
        "id": account.id,
        "name": account.name,
        "email": account.email,
        "role": account.role,
    })
}

fn router(api: MockApi) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route(
            "/user-profile",
            get(profile).put(update_profile).delete(delete_profile),
        )
        .route("/api/contacts", get(list_contacts))
        .route("/api/contacts/{id}", delete(delete_contact))
        .route("/api/organizations", get(list_organizations))
        .route("/api/organizations/{id}", delete(delete_organization))
        .route("/api/roles", get(list_roles))
        .with_state(api)
}

async fn login(State(api): State<MockApi>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default();

    if email == SLOW {
        tokio::time::sleep(SLOW_LOGIN).await;
    }

    let known = api.state.lock().unwrap().accounts.contains_key(&email);
    if !known || password != PASSWORD {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid credentials" })),
        );
    }

    if email == NO_TOKEN {
        return (StatusCode::OK, Json(json!({ "message": "ok" })));
    }

    let token = api.issue_token(&email);
    (StatusCode::OK, Json(json!({ "accessToken": token })))
}

async fn register(State(api): State<MockApi>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let name = body["name"].as_str().unwrap_or_default().to_string();

    if api.state.lock().unwrap().accounts.contains_key(&email) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Email already registered" })),
        );
    }

    {
        let mut state = api.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        state.accounts.insert(
            email.clone(),
            Account {
                id,
                name,
                email: email.clone(),
                role: "USER".to_string(),
            },
        );
    }

    // Registration answers with the `token` spelling
    let token = api.issue_token(&email);
    (StatusCode::CREATED, Json(json!({ "token": token })))
}

async fn profile(State(api): State<MockApi>, headers: HeaderMap) -> std::result::Result<Json<Value>, StatusCode> {
    api.profile_hits.fetch_add(1, Ordering::SeqCst);
    let account = api.account_for(&headers).ok_or(StatusCode::UNAUTHORIZED)?;
    Ok(Json(profile_json(&account)))
}

async fn update_profile(
    State(api): State<MockApi>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> std::result::Result<Json<Value>, StatusCode> {
    let account = api.account_for(&headers).ok_or(StatusCode::UNAUTHORIZED)?;
    let mut state = api.state.lock().unwrap();
    let stored = state
        .accounts
        .get_mut(&account.email)
        .ok_or(StatusCode::NOT_FOUND)?;
    if let Some(name) = body["name"].as_str() {
        stored.name = name.to_string();
    }
    Ok(Json(profile_json(stored)))
}

async fn delete_profile(State(api): State<MockApi>, headers: HeaderMap) -> StatusCode {
    match api.account_for(&headers) {
        Some(account) => {
            let mut state = api.state.lock().unwrap();
            state.accounts.remove(&account.email);
            state.tokens.retain(|_, email| *email != account.email);
            StatusCode::NO_CONTENT
        }
        None => StatusCode::UNAUTHORIZED,
    }
}

async fn list_contacts(State(api): State<MockApi>, headers: HeaderMap) -> std::result::Result<Json<Value>, StatusCode> {
    api.account_for(&headers).ok_or(StatusCode::UNAUTHORIZED)?;
    Ok(Json(json!([
        {
            "id": 1,
            "fullName": "Dodi Firmansyah",
            "phone": "08123456789",
            "email": "222212572@stis.ac.id",
            "contactType": "MAHASISWA",
            "contactOrganizations": [
                {"id": 1, "kelas": "3SI1", "jabatan": "KETUA", "periodeJabatan": "2024/2025"}
            ],
            "contactSubject": [
                {"id": 1, "subject": [{"id": 1, "subjectName": "Pemrograman Mobile"}]}
            ]
        },
        {
            "id": 3,
            "fullName": "Siti Nurhaliza",
            "phone": "08155678901",
            "email": "siti.nurhaliza@stis.ac.id",
            "contactType": "STAFF",
            "contactOrganizations": [],
            "contactSubject": []
        }
    ])))
}

async fn delete_contact(
    State(api): State<MockApi>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> StatusCode {
    if api.account_for(&headers).is_none() {
        return StatusCode::UNAUTHORIZED;
    }
    if id == 404 {
        return StatusCode::NOT_FOUND;
    }
    StatusCode::NO_CONTENT
}

async fn list_organizations(State(api): State<MockApi>, headers: HeaderMap) -> std::result::Result<Json<Value>, StatusCode> {
    api.account_for(&headers).ok_or(StatusCode::UNAUTHORIZED)?;
    Ok(Json(json!([
        {
            "id": 1,
            "organizationName": "Bulstik",
            "contacts": [
                {"id": 1, "fullName": "John Doe", "phone": "+1 123-456-7890", "contactType": "KETUA"},
                {"id": 2, "fullName": "Jane Doe", "phone": "+1 123-456-7890", "contactType": "WAKIL KETUA"}
            ]
        },
        {"id": 2, "organizationName": "Bimbel", "contacts": []}
    ])))
}

/// Only ADMIN accounts may delete organizations
async fn delete_organization(
    State(api): State<MockApi>,
    headers: HeaderMap,
    Path(_id): Path<i64>,
) -> (StatusCode, Json<Value>) {
    match api.account_for(&headers) {
        None => (StatusCode::UNAUTHORIZED, Json(json!({}))),
        Some(account) if account.role != "ADMIN" => (
            StatusCode::FORBIDDEN,
            Json(json!({ "message": "Admin role required" })),
        ),
        Some(_) => (StatusCode::OK, Json(json!({}))),
    }
}

async fn list_roles(State(api): State<MockApi>, headers: HeaderMap) -> std::result::Result<Json<Value>, StatusCode> {
    api.account_for(&headers).ok_or(StatusCode::UNAUTHORIZED)?;
    Ok(Json(json!([{"id": 1, "name": "ADMIN"}, {"id": 2, "name": "USER"}])))
}

/// Session manager talking to `base_url` with the given store
pub fn manager(base_url: &str, store: Arc<dyn SecureStore>) -> SessionManager {
    manager_with(base_url, store, SessionSettings::default())
}

pub fn manager_with(
    base_url: &str,
    store: Arc<dyn SecureStore>,
    settings: SessionSettings,
) -> SessionManager {
    let config = ApiConfig {
        base_url: base_url.to_string(),
        ..ApiConfig::default()
    };
    let api = ApiClient::new(&config, CredentialProvider::new()).unwrap();
    SessionManager::new(api, store, settings)
}

/// Store whose deletes always fail
#[derive(Default)]
pub struct FailingDeleteStore {
    pub inner: MemoryStore,
}

impl SecureStore for FailingDeleteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.inner.set(key, value)
    }

    fn delete(&self, _key: &str) -> Result<()> {
        Err(Error::Storage("keystore unavailable".to_string()))
    }
}

/// Store whose writes always fail
#[derive(Default)]
pub struct FailingWriteStore {
    pub inner: MemoryStore,
}

impl SecureStore for FailingWriteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Err(Error::Storage("keystore is read-only".to_string()))
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.inner.delete(key)
    }
}

/// Store whose reads always fail
#[derive(Default)]
pub struct FailingReadStore;

impl SecureStore for FailingReadStore {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(Error::Storage("keystore locked".to_string()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Ok(())
    }

    fn delete(&self, _key: &str) -> Result<()> {
        Ok(())
    }
}
