// crates/gauntlet-suites/src/portal.rs
// ============================================================================
// Module: Portal Client
// Description: Typed client for the study-portal API.
// Purpose: Wrap the request driver with endpoint knowledge and setup flows.
// Dependencies: gauntlet-core, gauntlet-drivers, serde_json
// ============================================================================

//! ## Overview
//! Thin typed layer over the request driver: one method per portal
//! endpoint, plus the register-unique setup flow shared by suites that
//! need an authenticated account. The client never asserts beyond what
//! setup requires; contract assertions belong to the cases.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use gauntlet_core::Abort;
use gauntlet_core::Failure;
use gauntlet_core::check;
use gauntlet_drivers::ApiResponse;
use gauntlet_drivers::DriverError;
use gauntlet_drivers::RequestDriver;
use gauntlet_drivers::UploadPart;
use serde_json::Value;
use serde_json::json;

use crate::contract::Envelope;
use crate::contract::string_at;
use crate::fixtures::TestFile;
use crate::fixtures::VALID_PASSWORD;
use crate::fixtures::unique_email;
use crate::guard;

// ============================================================================
// SECTION: Portal Client
// ============================================================================

/// Typed client bound to one portal deployment.
#[derive(Debug, Clone)]
pub struct PortalClient {
    /// Underlying request driver.
    api: RequestDriver,
}

impl PortalClient {
    /// Wraps a request driver targeting the portal API.
    #[must_use]
    pub fn new(api: RequestDriver) -> Self {
        Self {
            api,
        }
    }

    /// Returns the underlying driver, for transcript capture.
    #[must_use]
    pub fn driver(&self) -> &RequestDriver {
        &self.api
    }

    /// Returns a client carrying a bearer token.
    #[must_use]
    pub fn authed(&self, token: &str) -> Self {
        Self {
            api: self.api.with_bearer_token(token),
        }
    }

    /// Fetches the aggregate health endpoint.
    ///
    /// # Errors
    ///
    /// Returns a [`DriverError`] on transport failure.
    pub async fn health(&self) -> Result<ApiResponse, DriverError> {
        self.api.get("/health").await
    }

    /// Registers an account.
    ///
    /// # Errors
    ///
    /// Returns a [`DriverError`] on transport failure.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
        language: &str,
    ) -> Result<ApiResponse, DriverError> {
        let body = json!({
            "email": email,
            "password": password,
            "display_name": display_name,
            "language": language,
        });
        self.api.post_json("/api/v1/auth/register", &body).await
    }

    /// Logs in with credentials.
    ///
    /// # Errors
    ///
    /// Returns a [`DriverError`] on transport failure.
    pub async fn login(&self, email: &str, password: &str) -> Result<ApiResponse, DriverError> {
        let body = json!({
            "email": email,
            "password": password,
        });
        self.api.post_json("/api/v1/auth/login", &body).await
    }

    /// Fetches the current account for the carried token.
    ///
    /// # Errors
    ///
    /// Returns a [`DriverError`] on transport failure.
    pub async fn me(&self) -> Result<ApiResponse, DriverError> {
        self.api.get("/api/v1/auth/me").await
    }

    /// Lists subjects visible to the carried token.
    ///
    /// # Errors
    ///
    /// Returns a [`DriverError`] on transport failure.
    pub async fn list_subjects(&self) -> Result<ApiResponse, DriverError> {
        self.api.get("/api/v1/subjects").await
    }

    /// Uploads a document into a subject.
    ///
    /// # Errors
    ///
    /// Returns a [`DriverError`] on transport failure.
    pub async fn upload_document(
        &self,
        subject_id: &str,
        file: &TestFile,
    ) -> Result<ApiResponse, DriverError> {
        let parts = [UploadPart::file("file", &file.name, &file.mime_type, file.content.clone())];
        self.api.post_multipart(&format!("/api/v1/subjects/{subject_id}/documents"), &parts).await
    }

    /// Uploads a document with an extended per-call timeout, for bodies
    /// that legitimately take longer than the client default.
    ///
    /// # Errors
    ///
    /// Returns a [`DriverError`] on transport failure.
    pub async fn upload_document_with_timeout(
        &self,
        subject_id: &str,
        file: &TestFile,
        timeout: Duration,
    ) -> Result<ApiResponse, DriverError> {
        let parts = [UploadPart::file("file", &file.name, &file.mime_type, file.content.clone())];
        self.api
            .post_multipart_with_timeout(
                &format!("/api/v1/subjects/{subject_id}/documents"),
                &parts,
                timeout,
            )
            .await
    }

    /// Lists a subject's documents, optionally paginated.
    ///
    /// # Errors
    ///
    /// Returns a [`DriverError`] on transport failure.
    pub async fn list_documents(
        &self,
        subject_id: &str,
        page_limit: Option<(u64, u64)>,
    ) -> Result<ApiResponse, DriverError> {
        let path = match page_limit {
            Some((page, limit)) => {
                format!("/api/v1/subjects/{subject_id}/documents?page={page}&limit={limit}")
            }
            None => format!("/api/v1/subjects/{subject_id}/documents"),
        };
        self.api.get(&path).await
    }

    /// Downloads a document by id.
    ///
    /// # Errors
    ///
    /// Returns a [`DriverError`] on transport failure.
    pub async fn download_document(&self, document_id: &str) -> Result<ApiResponse, DriverError> {
        self.api.get(&format!("/api/v1/documents/{document_id}/download")).await
    }

    /// Runs a search with an already-assembled query string.
    ///
    /// # Errors
    ///
    /// Returns a [`DriverError`] on transport failure.
    pub async fn search_raw(&self, query: &str) -> Result<ApiResponse, DriverError> {
        let path = if query.is_empty() {
            "/api/v1/search".to_string()
        } else {
            format!("/api/v1/search?{query}")
        };
        self.api.get(&path).await
    }
}

// ============================================================================
// SECTION: Setup Flows
// ============================================================================

/// A freshly registered account with its tokens.
#[derive(Debug, Clone)]
pub struct RegisteredUser {
    /// Generated unique email.
    pub email: String,
    /// Access token from the registration response.
    pub access_token: String,
}

/// Registers a unique account as a setup step.
///
/// # Errors
///
/// Returns `Abort::Skip` when the API is unreachable or not running and
/// `Abort::Fail` when registration violates the contract.
pub async fn register_unique(
    client: &PortalClient,
    prefix: &str,
) -> Result<RegisteredUser, Abort> {
    let email = unique_email(prefix);
    let response = guard::reachable(
        client.register(&email, VALID_PASSWORD, "Test User", "en").await,
        "portal api",
    )?;
    let response = guard::provisioned(response, "portal api")?;
    check::status("register", 201, response.status())?;
    let envelope = Envelope::parse(&response)?;
    let data = envelope.data()?;
    let access_token = string_at(data, "/access_token")?.to_string();
    Ok(RegisteredUser {
        email,
        access_token,
    })
}

/// Finds a subject to upload into, skipping when none are provisioned.
///
/// # Errors
///
/// Returns `Abort::Skip` when the API is down or no subject exists.
pub async fn first_subject_id(client: &PortalClient) -> Result<String, Abort> {
    let response =
        guard::reachable(client.list_subjects().await, "portal api")?;
    let response = guard::provisioned(response, "portal api")?;
    check::status("list subjects", 200, response.status())?;
    let envelope = Envelope::parse(&response)?;
    let subjects = envelope.data()?.as_array().cloned().unwrap_or_default();
    let Some(first) = subjects.first() else {
        return Err(Abort::Skip("no subjects provisioned".to_string()));
    };
    match first.get("id") {
        Some(Value::String(id)) => Ok(id.clone()),
        Some(other) => Ok(other.to_string()),
        None => Err(Abort::Fail(Failure::contract(
            "subject carries an id",
            "id present",
            "id absent",
        ))),
    }
}
