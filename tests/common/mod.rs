// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use cgm_glance::db::{KeyValueStore, MemoryStore};
use cgm_glance::error::ShareError;
use cgm_glance::models::{Credentials, RawSample};
use cgm_glance::services::share::NULL_SESSION_ID;
use cgm_glance::services::ShareApi;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Fixed "now" used across tests.
#[allow(dead_code)]
pub const T: i64 = 1_700_000_000_000;

/// Build a raw sample at `ts` epoch millis.
#[allow(dead_code)]
pub fn sample(ts: i64, value: i32) -> RawSample {
    RawSample {
        wall_time_raw: format!("Date({ts})"),
        value,
        trend: "Flat".to_string(),
    }
}

#[allow(dead_code)]
pub fn creds(username: &str) -> Credentials {
    Credentials::new("", username, "password")
}

#[allow(dead_code)]
pub fn memory_store() -> Arc<dyn KeyValueStore> {
    Arc::new(MemoryStore::new())
}

// ─── Scripted ShareApi ───────────────────────────────────────────────────────

/// Scripted login response.
#[allow(dead_code)]
pub enum LoginScript {
    Session(String),
    Null,
    Status(u16),
}

/// Scripted readings response.
#[allow(dead_code)]
pub enum ReadScript {
    Batch(Vec<RawSample>),
    SessionExpired,
    Status(u16),
    Malformed,
}

/// In-process fake of the Share service.
///
/// Logins are scripted per username (default: `session-<username>`), reads
/// per session id (default: HTTP 404).
#[allow(dead_code)]
#[derive(Default)]
pub struct FakeShare {
    offline: AtomicBool,
    logins: Mutex<HashMap<String, VecDeque<LoginScript>>>,
    reads: Mutex<HashMap<String, VecDeque<ReadScript>>>,
    pub login_calls: AtomicUsize,
    pub read_calls: AtomicUsize,
    pub probe_calls: AtomicUsize,
}

#[allow(dead_code)]
impl FakeShare {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_online(&self, online: bool) {
        self.offline.store(!online, Ordering::SeqCst);
    }

    pub fn script_login(&self, username: &str, script: LoginScript) {
        self.logins
            .lock()
            .unwrap()
            .entry(username.to_string())
            .or_default()
            .push_back(script);
    }

    pub fn script_read(&self, session_id: &str, script: ReadScript) {
        self.reads
            .lock()
            .unwrap()
            .entry(session_id.to_string())
            .or_default()
            .push_back(script);
    }

    pub fn logins(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }

    pub fn probes(&self) -> usize {
        self.probe_calls.load(Ordering::SeqCst)
    }

    pub fn network_calls(&self) -> usize {
        self.logins() + self.reads() + self.probes()
    }
}

impl ShareApi for FakeShare {
    async fn login(&self, username: &str, _password: &str) -> Result<String, ShareError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        let script = self
            .logins
            .lock()
            .unwrap()
            .get_mut(username)
            .and_then(|q| q.pop_front());

        match script {
            None => Ok(format!("session-{username}")),
            Some(LoginScript::Session(id)) => Ok(id),
            Some(LoginScript::Null) => Ok(NULL_SESSION_ID.to_string()),
            Some(LoginScript::Status(code)) => Err(ShareError::AuthRequestFailed(code)),
        }
    }

    async fn read_latest_glucose(&self, session_id: &str) -> Result<Vec<RawSample>, ShareError> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        let script = self
            .reads
            .lock()
            .unwrap()
            .get_mut(session_id)
            .and_then(|q| q.pop_front());

        match script {
            Some(ReadScript::Batch(batch)) => Ok(batch),
            Some(ReadScript::SessionExpired) => Err(ShareError::SessionExpiredRetry),
            Some(ReadScript::Status(code)) => Err(ShareError::UpstreamRequestFailed(code)),
            Some(ReadScript::Malformed) => {
                Err(ShareError::MalformedResponse("scripted".to_string()))
            }
            None => Err(ShareError::UpstreamRequestFailed(404)),
        }
    }

    async fn is_online(&self) -> bool {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        !self.offline.load(Ordering::SeqCst)
    }
}

// ─── Mock HTTP upstream ──────────────────────────────────────────────────────

/// What the mock server returns and what it saw.
#[allow(dead_code)]
pub struct MockUpstream {
    pub login_status: u16,
    pub login_body: String,
    pub read_status: u16,
    pub read_body: String,
    pub last_login_body: Option<serde_json::Value>,
    pub last_login_headers: Option<HeaderMap>,
    pub last_read_query: Option<HashMap<String, String>>,
}

impl Default for MockUpstream {
    fn default() -> Self {
        Self {
            login_status: 200,
            login_body: "\"5c1b7e4a-9d2f-4e61-8a3b-0f7c6d5e4a31\"".to_string(),
            read_status: 200,
            read_body: "[]".to_string(),
            last_login_body: None,
            last_login_headers: None,
            last_read_query: None,
        }
    }
}

pub type SharedUpstream = Arc<Mutex<MockUpstream>>;

async fn mock_login(
    State(state): State<SharedUpstream>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let mut upstream = state.lock().unwrap();
    upstream.last_login_body = Some(body);
    upstream.last_login_headers = Some(headers);
    json_response(upstream.login_status, upstream.login_body.clone())
}

async fn mock_readings(
    State(state): State<SharedUpstream>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let mut upstream = state.lock().unwrap();
    upstream.last_read_query = Some(query);
    json_response(upstream.read_status, upstream.read_body.clone())
}

fn json_response(status: u16, body: String) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

/// Start a mock Share service on a random local port. Returns its base URL.
#[allow(dead_code)]
pub async fn spawn_upstream() -> (String, SharedUpstream) {
    let state: SharedUpstream = Arc::new(Mutex::new(MockUpstream::default()));

    let app = Router::new()
        .route(
            "/ShareWebServices/Services/General/LoginPublisherAccountByName",
            post(mock_login),
        )
        .route(
            "/ShareWebServices/Services/Publisher/ReadPublisherLatestGlucoseValues",
            post(mock_readings),
        )
        .route("/generate_204", get(|| async { StatusCode::NO_CONTENT }))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock upstream");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), state)
}

/// An address nothing listens on (bound then released).
#[allow(dead_code)]
pub fn dead_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/generate_204", addr)
}
