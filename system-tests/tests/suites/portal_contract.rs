// system-tests/tests/suites/portal_contract.rs
// ============================================================================
// Module: Portal Contract Suite
// Description: System tests for the typed portal client against the stub.
// Purpose: Prove the client and envelope layer hold against a live server.
// Dependencies: gauntlet-drivers, gauntlet-suites, tokio
// ============================================================================

//! ## Overview
//! Drives the typed portal client against the in-process stub portal and
//! asserts the envelope contract end to end: registration, credential
//! rejection, bearer enforcement, search validation, and the document
//! upload round trip.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::time::Duration;

use gauntlet_drivers::RequestDriver;
use gauntlet_suites::ADMIN;
use gauntlet_suites::DOCX;
use gauntlet_suites::PDF;
use gauntlet_suites::PortalClient;
use gauntlet_suites::STUDENT;
use gauntlet_suites::TXT;
use gauntlet_suites::TestFile;
use gauntlet_suites::VALID_PASSWORD;
use gauntlet_suites::first_subject_id;
use gauntlet_suites::register_unique;
use gauntlet_suites::unique_email;
use system_tests::config::SystemTestConfig;

use crate::helpers::stub_portal::StubPortal;

/// Baseline per-request timeout for stub traffic.
const BASE_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolves the request timeout, honoring the environment floor.
fn request_timeout() -> Duration {
    SystemTestConfig::load()
        .map(|config| config.effective_timeout(BASE_TIMEOUT))
        .unwrap_or(BASE_TIMEOUT)
}

/// Builds a portal client bound to the stub.
fn client_for(stub: &StubPortal) -> PortalClient {
    let driver = RequestDriver::new(stub.base_url(), request_timeout()).expect("request driver");
    PortalClient::new(driver)
}

#[tokio::test]
async fn registration_creates_a_student_account_with_tokens() {
    let stub = StubPortal::spawn().await;
    let client = client_for(&stub);
    let email = unique_email("contract-register");
    let response = client
        .register(&email, VALID_PASSWORD, "Contract Tester", "en")
        .await
        .expect("register request");
    assert_eq!(response.status(), 201);
    let body = response.json().expect("json body");
    assert_eq!(body.pointer("/success"), Some(&serde_json::Value::Bool(true)));
    assert_eq!(
        body.pointer("/data/user/role").and_then(serde_json::Value::as_str),
        Some("student"),
    );
    let access = body
        .pointer("/data/access_token")
        .and_then(serde_json::Value::as_str)
        .expect("access token");
    let refresh = body
        .pointer("/data/refresh_token")
        .and_then(serde_json::Value::as_str)
        .expect("refresh token");
    assert!(!access.is_empty());
    assert!(!refresh.is_empty());
}

#[tokio::test]
async fn duplicate_registration_is_a_conflict() {
    let stub = StubPortal::spawn().await;
    let client = client_for(&stub);
    let user = register_unique(&client, "contract-duplicate").await.expect("first registration");
    let response = client
        .register(&user.email, VALID_PASSWORD, "Contract Tester", "en")
        .await
        .expect("second register request");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn wrong_password_is_rejected_with_401() {
    let stub = StubPortal::spawn().await;
    let client = client_for(&stub);
    let user = register_unique(&client, "contract-login").await.expect("registration");
    let response = client
        .login(&user.email, "WrongPassword123!")
        .await
        .expect("login request");
    assert_eq!(response.status(), 401);
    let body = response.json().expect("json body");
    assert_eq!(body.pointer("/success"), Some(&serde_json::Value::Bool(false)));
}

#[tokio::test]
async fn seeded_accounts_sign_in_with_their_roles() {
    let stub = StubPortal::spawn().await;
    let client = client_for(&stub);
    for seed in [STUDENT, ADMIN] {
        let login = client.login(seed.email, seed.password).await.expect("login request");
        assert_eq!(login.status(), 200, "seed {} must sign in", seed.email);
        let body = login.json().expect("json body");
        let token = body
            .pointer("/data/access_token")
            .and_then(serde_json::Value::as_str)
            .expect("access token")
            .to_string();

        let me = client.authed(&token).me().await.expect("me request");
        assert_eq!(me.status(), 200);
        let account = me.json().expect("json body");
        assert_eq!(
            account.pointer("/data/email").and_then(serde_json::Value::as_str),
            Some(seed.email),
        );
        assert_eq!(
            account.pointer("/data/role").and_then(serde_json::Value::as_str),
            Some(seed.role),
        );
    }
}

#[tokio::test]
async fn invalid_bearer_token_is_rejected_on_me() {
    let stub = StubPortal::spawn().await;
    let client = client_for(&stub);
    let response = client.authed("invalid-token").me().await.expect("me request");
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn protected_endpoints_require_authentication() {
    let stub = StubPortal::spawn().await;
    let client = client_for(&stub);
    let me = client.me().await.expect("me request");
    assert_eq!(me.status(), 401);
    let subjects = client.list_subjects().await.expect("subjects request");
    assert_eq!(subjects.status(), 401);
    let search = client.search_raw("q=test").await.expect("search request");
    assert_eq!(search.status(), 401);
}

#[tokio::test]
async fn search_without_query_is_a_validation_error() {
    let stub = StubPortal::spawn().await;
    let client = client_for(&stub);
    let user = register_unique(&client, "contract-search").await.expect("registration");
    let authed = client.authed(&user.access_token);
    let response = authed.search_raw("").await.expect("search request");
    assert_eq!(response.status(), 400);
    let body = response.json().expect("json body");
    assert_eq!(body.pointer("/success"), Some(&serde_json::Value::Bool(false)));
}

#[tokio::test]
async fn upload_echoes_metadata_and_round_trips_bytes() {
    let stub = StubPortal::spawn().await;
    let client = client_for(&stub);
    let user = register_unique(&client, "contract-upload").await.expect("registration");
    let authed = client.authed(&user.access_token);
    let subject = first_subject_id(&authed).await.expect("subject id");

    let file = TestFile::text("roundtrip", "Round-trip payload for the contract suite.");
    let upload = authed.upload_document(&subject, &file).await.expect("upload request");
    assert_eq!(upload.status(), 201);
    let body = upload.json().expect("json body");
    assert_eq!(
        body.pointer("/data/original_name").and_then(serde_json::Value::as_str),
        Some(file.name.as_str()),
    );
    assert_eq!(
        body.pointer("/data/mime_type").and_then(serde_json::Value::as_str),
        Some(file.mime_type.as_str()),
    );
    let document_id = body
        .pointer("/data/id")
        .and_then(serde_json::Value::as_str)
        .expect("document id")
        .to_string();

    let download = authed.download_document(&document_id).await.expect("download request");
    assert_eq!(download.status(), 200);
    assert_eq!(download.bytes(), file.content.as_slice());
}

#[tokio::test]
async fn common_lecture_formats_are_accepted() {
    let stub = StubPortal::spawn().await;
    let client = client_for(&stub);
    let user = register_unique(&client, "contract-formats").await.expect("registration");
    let authed = client.authed(&user.access_token);
    let subject = first_subject_id(&authed).await.expect("subject id");
    for sample in [PDF, DOCX, TXT] {
        let file = TestFile::with_type(sample.name, sample.mime_type, sample.content.as_bytes());
        let response = authed.upload_document(&subject, &file).await.expect("upload request");
        assert_eq!(response.status(), 201, "{} must be accepted", sample.name);
        let body = response.json().expect("json body");
        assert_eq!(
            body.pointer("/data/mime_type").and_then(serde_json::Value::as_str),
            Some(sample.mime_type),
        );
    }
}

#[tokio::test]
async fn disallowed_mime_type_is_rejected() {
    let stub = StubPortal::spawn().await;
    let client = client_for(&stub);
    let user = register_unique(&client, "contract-exe").await.expect("registration");
    let authed = client.authed(&user.access_token);
    let subject = first_subject_id(&authed).await.expect("subject id");
    let file = TestFile::with_type("malicious.exe", "application/x-msdownload", b"MZ");
    let response = authed.upload_document(&subject, &file).await.expect("upload request");
    assert_eq!(response.status(), 400);
    let body = response.json().expect("json body");
    assert_eq!(
        body.pointer("/error/code").and_then(serde_json::Value::as_str),
        Some("INVALID_FILE_TYPE"),
    );
}

#[tokio::test]
async fn document_list_echoes_pagination() {
    let stub = StubPortal::spawn().await;
    let client = client_for(&stub);
    let user = register_unique(&client, "contract-list").await.expect("registration");
    let authed = client.authed(&user.access_token);
    let subject = first_subject_id(&authed).await.expect("subject id");
    let file = TestFile::text("listing", "Listing fodder.");
    let upload = authed.upload_document(&subject, &file).await.expect("upload request");
    assert_eq!(upload.status(), 201);

    let list = authed.list_documents(&subject, Some((1, 5))).await.expect("list request");
    assert_eq!(list.status(), 200);
    let body = list.json().expect("json body");
    assert!(body.pointer("/data").map(serde_json::Value::is_array).unwrap_or(false));
    assert_eq!(
        body.pointer("/pagination/page").and_then(serde_json::Value::as_u64),
        Some(1),
    );
    assert_eq!(
        body.pointer("/pagination/limit").and_then(serde_json::Value::as_u64),
        Some(5),
    );
}
