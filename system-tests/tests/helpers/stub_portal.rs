// system-tests/tests/helpers/stub_portal.rs
// ============================================================================
// Module: Stub Portal
// Description: In-process axum stand-in for the study-portal API.
// Purpose: Give system tests a deterministic deployment speaking the
//   envelope contract.
// Dependencies: axum, gauntlet-suites, serde_json, tokio
// ============================================================================

//! ## Overview
//! A minimal but contract-faithful portal: register/login/me, subjects
//! with document upload/list/download, search, and aggregate health, all
//! wrapped in the `{success, data?, error?, pagination?}` envelope.
//! State is in-memory and dies with the handle. Bearer tokens are derived
//! from the account email so `me` can echo it without a session store.
//! The shared seed accounts are provisioned at spawn with their roles.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    reason = "Test-only helpers may panic on setup failure."
)]

use std::collections::HashMap;
use std::net::TcpListener as StdTcpListener;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::extract::Multipart;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::header;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use gauntlet_suites::ADMIN;
use gauntlet_suites::STUDENT;
use serde_json::Value;
use serde_json::json;
use tokio::sync::oneshot;

/// Upload size limit enforced by the stub, matching the portal contract.
const UPLOAD_LIMIT_BYTES: usize = 50 * 1024 * 1024;
/// Bearer prefix for stub-issued access tokens.
const TOKEN_PREFIX: &str = "token:";
/// MIME types the stub refuses to store.
const DENIED_MIME_TYPES: &[&str] = &["application/x-msdownload", "application/x-sh"];

/// Behavior overrides for misbehaving-deployment tests.
#[derive(Debug, Clone, Copy)]
pub struct StubBehavior {
    /// Status returned by a successful registration.
    pub register_status: StatusCode,
}

impl Default for StubBehavior {
    fn default() -> Self {
        Self {
            register_status: StatusCode::CREATED,
        }
    }
}

/// A stored uploaded document.
#[derive(Debug, Clone)]
struct StoredDocument {
    /// Subject the document was uploaded into.
    subject_id: String,
    /// Original file name as uploaded.
    original_name: String,
    /// MIME type as uploaded.
    mime_type: String,
    /// Raw bytes.
    content: Vec<u8>,
}

/// A registered account.
#[derive(Debug, Clone)]
struct Account {
    /// Account password.
    password: String,
    /// Portal role echoed by `me`.
    role: String,
}

/// Shared in-memory portal state.
#[derive(Debug, Default)]
struct PortalState {
    /// Behavior overrides.
    behavior: StubBehaviorState,
    /// Registered accounts by email.
    accounts: Mutex<HashMap<String, Account>>,
    /// Uploaded documents by id.
    documents: Mutex<HashMap<String, StoredDocument>>,
    /// Monotonic id source.
    serial: AtomicU64,
}

/// Behavior wrapper so `PortalState` can derive `Default`.
#[derive(Debug)]
struct StubBehaviorState {
    /// Configured behavior.
    inner: StubBehavior,
}

impl Default for StubBehaviorState {
    fn default() -> Self {
        Self {
            inner: StubBehavior::default(),
        }
    }
}

/// Handle for a running stub portal.
pub struct StubPortal {
    /// Base URL the stub listens on.
    base_url: String,
    /// Graceful shutdown trigger.
    shutdown: Option<oneshot::Sender<()>>,
}

impl StubPortal {
    /// Spawns a stub portal with default behavior.
    pub async fn spawn() -> Self {
        Self::spawn_with(StubBehavior::default()).await
    }

    /// Spawns a stub portal with explicit behavior overrides.
    pub async fn spawn_with(behavior: StubBehavior) -> Self {
        let state = Arc::new(PortalState {
            behavior: StubBehaviorState {
                inner: behavior,
            },
            ..PortalState::default()
        });
        if let Ok(mut accounts) = state.accounts.lock() {
            for seed in [STUDENT, ADMIN] {
                accounts.insert(
                    seed.email.to_string(),
                    Account {
                        password: seed.password.to_string(),
                        role: seed.role.to_string(),
                    },
                );
            }
        }
        let router = Router::new()
            .route("/health", get(health))
            .route("/api/v1/auth/register", post(register))
            .route("/api/v1/auth/login", post(login))
            .route("/api/v1/auth/me", get(me))
            .route("/api/v1/subjects", get(list_subjects))
            .route(
                "/api/v1/subjects/{subject_id}/documents",
                post(upload_document).get(list_documents),
            )
            .route("/api/v1/documents/{document_id}/download", get(download_document))
            .route("/api/v1/search", get(search))
            .layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES + 1024 * 1024))
            .with_state(state);

        let std_listener = StdTcpListener::bind("127.0.0.1:0").expect("bind stub listener");
        std_listener.set_nonblocking(true).expect("nonblocking listener");
        let addr = std_listener.local_addr().expect("listener addr");
        let listener =
            tokio::net::TcpListener::from_std(std_listener).expect("tokio listener");
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        tokio::spawn(async move {
            let server = axum::serve(listener, router).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            let _ = server.await;
        });
        Self {
            base_url: format!("http://{addr}"),
            shutdown: Some(shutdown_tx),
        }
    }

    /// Returns the base URL the stub listens on.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Drop for StubPortal {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

// ============================================================================
// SECTION: Envelope Helpers
// ============================================================================

/// Wraps a payload in a success envelope.
fn ok(status: StatusCode, data: Value) -> Response {
    (status, axum::Json(json!({ "success": true, "data": data }))).into_response()
}

/// Wraps a payload and a pagination block in a success envelope.
fn ok_paginated(data: Value, page: u64, limit: u64, total: u64) -> Response {
    let total_pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
    let body = json!({
        "success": true,
        "data": data,
        "pagination": {
            "page": page,
            "limit": limit,
            "total": total,
            "total_pages": total_pages,
        },
    });
    (StatusCode::OK, axum::Json(body)).into_response()
}

/// Wraps an error code and message in a failure envelope.
fn fail(status: StatusCode, code: &str, message: &str) -> Response {
    let body = json!({
        "success": false,
        "error": { "code": code, "message": message },
    });
    (status, axum::Json(body)).into_response()
}

/// Resolves the bearer token to an account email, if the token is valid.
fn authed_email(state: &PortalState, headers: &HeaderMap) -> Option<String> {
    let header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?;
    let email = token.strip_prefix(TOKEN_PREFIX)?;
    let accounts = state.accounts.lock().ok()?;
    accounts.contains_key(email).then(|| email.to_string())
}

/// Reads a numeric query parameter with a default.
fn query_number(params: &HashMap<String, String>, key: &str, default: u64) -> u64 {
    params.get(key).and_then(|raw| raw.parse().ok()).unwrap_or(default)
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Aggregate health endpoint.
async fn health() -> Response {
    let body = json!({
        "database": "ok",
        "cache": "ok",
        "storage": "ok",
        "search": "ok",
    });
    (StatusCode::OK, axum::Json(body)).into_response()
}

/// Registers an account.
async fn register(
    State(state): State<Arc<PortalState>>,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    let email = body.get("email").and_then(Value::as_str).unwrap_or_default();
    let password = body.get("password").and_then(Value::as_str).unwrap_or_default();
    let display_name = body.get("display_name").and_then(Value::as_str).unwrap_or("");
    if !is_plausible_email(email) {
        return fail(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", "email is malformed");
    }
    if password.len() < 8 {
        return fail(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", "password is too short");
    }
    let Ok(mut accounts) = state.accounts.lock() else {
        return fail(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", "state lock poisoned");
    };
    if accounts.contains_key(email) {
        return fail(StatusCode::CONFLICT, "EMAIL_EXISTS", "email is already registered");
    }
    accounts.insert(
        email.to_string(),
        Account {
            password: password.to_string(),
            role: "student".to_string(),
        },
    );
    let id = state.serial.fetch_add(1, Ordering::SeqCst);
    let data = json!({
        "user": {
            "id": format!("u{id}"),
            "email": email,
            "display_name": display_name,
            "role": "student",
        },
        "access_token": format!("{TOKEN_PREFIX}{email}"),
        "refresh_token": format!("refresh:{email}"),
    });
    ok(state.behavior.inner.register_status, data)
}

/// Logs an account in.
async fn login(
    State(state): State<Arc<PortalState>>,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    let email = body.get("email").and_then(Value::as_str).unwrap_or_default();
    let password = body.get("password").and_then(Value::as_str).unwrap_or_default();
    let Ok(accounts) = state.accounts.lock() else {
        return fail(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", "state lock poisoned");
    };
    if accounts.get(email).map(|account| account.password.as_str()) != Some(password) {
        return fail(StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS", "credentials rejected");
    }
    let data = json!({
        "access_token": format!("{TOKEN_PREFIX}{email}"),
        "refresh_token": format!("refresh:{email}"),
    });
    ok(StatusCode::OK, data)
}

/// Returns the account behind the bearer token.
async fn me(State(state): State<Arc<PortalState>>, headers: HeaderMap) -> Response {
    let Some(email) = authed_email(&state, &headers) else {
        return fail(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "token missing or invalid");
    };
    let role = state
        .accounts
        .lock()
        .ok()
        .and_then(|accounts| accounts.get(&email).map(|account| account.role.clone()))
        .unwrap_or_else(|| "student".to_string());
    ok(StatusCode::OK, json!({ "email": email, "role": role }))
}

/// Lists the provisioned subjects.
async fn list_subjects(State(state): State<Arc<PortalState>>, headers: HeaderMap) -> Response {
    if authed_email(&state, &headers).is_none() {
        return fail(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "token missing or invalid");
    }
    let data = json!([
        { "id": "s1", "name": "Mathematics" },
        { "id": "s2", "name": "Physics" },
    ]);
    ok(StatusCode::OK, data)
}

/// Accepts a multipart document upload.
async fn upload_document(
    State(state): State<Arc<PortalState>>,
    Path(subject_id): Path<String>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if authed_email(&state, &headers).is_none() {
        return fail(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "token missing or invalid");
    }
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let original_name = field.file_name().unwrap_or("upload.bin").to_string();
        let mime_type =
            field.content_type().unwrap_or("application/octet-stream").to_string();
        if DENIED_MIME_TYPES.contains(&mime_type.as_str()) {
            return fail(
                StatusCode::BAD_REQUEST,
                "INVALID_FILE_TYPE",
                "file type is not allowed",
            );
        }
        let Ok(content) = field.bytes().await else {
            return fail(
                StatusCode::PAYLOAD_TOO_LARGE,
                "FILE_TOO_LARGE",
                "file exceeds the upload limit",
            );
        };
        if content.len() > UPLOAD_LIMIT_BYTES {
            return fail(
                StatusCode::PAYLOAD_TOO_LARGE,
                "FILE_TOO_LARGE",
                "file exceeds the upload limit",
            );
        }
        let id = format!("d{}", state.serial.fetch_add(1, Ordering::SeqCst));
        let Ok(mut documents) = state.documents.lock() else {
            return fail(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", "state lock poisoned");
        };
        documents.insert(
            id.clone(),
            StoredDocument {
                subject_id,
                original_name: original_name.clone(),
                mime_type: mime_type.clone(),
                content: content.to_vec(),
            },
        );
        let data = json!({
            "id": id,
            "original_name": original_name,
            "mime_type": mime_type,
        });
        return ok(StatusCode::CREATED, data);
    }
    fail(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", "multipart field `file` missing")
}

/// Lists a subject's documents with a pagination echo.
async fn list_documents(
    State(state): State<Arc<PortalState>>,
    Path(subject_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if authed_email(&state, &headers).is_none() {
        return fail(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "token missing or invalid");
    }
    let page = query_number(&params, "page", 1);
    let limit = query_number(&params, "limit", 10);
    let Ok(documents) = state.documents.lock() else {
        return fail(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", "state lock poisoned");
    };
    let matching: Vec<Value> = documents
        .iter()
        .filter(|(_, document)| document.subject_id == subject_id)
        .map(|(id, document)| {
            json!({
                "id": id,
                "original_name": document.original_name,
                "mime_type": document.mime_type,
            })
        })
        .collect();
    let total = matching.len() as u64;
    ok_paginated(Value::Array(matching), page, limit, total)
}

/// Serves a stored document's bytes.
async fn download_document(
    State(state): State<Arc<PortalState>>,
    Path(document_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if authed_email(&state, &headers).is_none() {
        return fail(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "token missing or invalid");
    }
    let Ok(documents) = state.documents.lock() else {
        return fail(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", "state lock poisoned");
    };
    let Some(document) = documents.get(&document_id) else {
        return fail(StatusCode::NOT_FOUND, "NOT_FOUND", "document does not exist");
    };
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, document.mime_type.clone()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", document.original_name),
            ),
        ],
        document.content.clone(),
    )
        .into_response()
}

/// Runs a search over stored names.
async fn search(
    State(state): State<Arc<PortalState>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if authed_email(&state, &headers).is_none() {
        return fail(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "token missing or invalid");
    }
    let Some(query) = params.get("q").filter(|value| !value.trim().is_empty()) else {
        return fail(StatusCode::BAD_REQUEST, "MISSING_QUERY", "query parameter `q` is required");
    };
    let page = query_number(&params, "page", 1);
    let limit = query_number(&params, "limit", 10);
    let needle = query.to_ascii_lowercase();
    let Ok(documents) = state.documents.lock() else {
        return fail(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", "state lock poisoned");
    };
    let document_hits: Vec<Value> = documents
        .iter()
        .filter(|(_, document)| document.original_name.to_ascii_lowercase().contains(&needle))
        .map(|(id, document)| json!({ "id": id, "original_name": document.original_name }))
        .collect();
    let subject_hits: Vec<Value> = [("s1", "Mathematics"), ("s2", "Physics")]
        .iter()
        .filter(|(_, name)| name.to_ascii_lowercase().contains(&needle))
        .map(|(id, name)| json!({ "id": id, "name": name }))
        .collect();
    let total = (document_hits.len() + subject_hits.len()) as u64;
    let data = match params.get("type").map(String::as_str) {
        Some("documents") => json!({ "documents": document_hits }),
        Some("subjects") => json!({ "subjects": subject_hits }),
        _ => json!({ "documents": document_hits, "subjects": subject_hits }),
    };
    let body = json!({
        "success": true,
        "data": data,
        "pagination": { "page": page, "limit": limit, "total": total },
    });
    (StatusCode::OK, axum::Json(body)).into_response()
}

/// Rough email shape check used by registration validation.
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
}
