// crates/gauntlet-drivers/src/request.rs
// ============================================================================
// Module: Request Driver
// Description: HTTP client with transcript capture and bounded send retries.
// Purpose: Issue API requests against a base URL for request-driver suites.
// Dependencies: gauntlet-core, reqwest, serde, tokio
// ============================================================================

//! ## Overview
//! The request driver wraps a shared HTTP client bound to one base URL.
//! Every exchange is appended to an in-memory transcript for artifact
//! capture. Transient send failures (refused, reset, timed out) are
//! retried with bounded linear backoff before the error is surfaced;
//! responses are returned whole, whatever their status code, so suites
//! can assert on failure responses as first-class contract surfaces.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use reqwest::Client;
use reqwest::Method;
use reqwest::multipart::Form;
use reqwest::multipart::Part;
use serde::Serialize;
use serde_json::Value;
use tokio::time::sleep;

use crate::error::DriverError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum attempts for transient HTTP send failures.
const MAX_HTTP_SEND_ATTEMPTS: u32 = 3;
/// Base backoff delay for transient HTTP send retries.
const BASE_HTTP_SEND_RETRY_DELAY_MS: u64 = 50;
/// Maximum response bytes echoed into the transcript.
const TRANSCRIPT_BODY_CAP: usize = 2048;

// ============================================================================
// SECTION: Transcript
// ============================================================================

/// One recorded request/response exchange.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptEntry {
    /// Monotonic sequence number within the driver, starting at 1.
    pub sequence: u64,
    /// HTTP method.
    pub method: String,
    /// Full request URL.
    pub url: String,
    /// Response status, absent when the send itself failed.
    pub status: Option<u16>,
    /// JSON request body, when one was sent.
    pub request_body: Option<Value>,
    /// Response body echo, parsed as JSON when possible.
    pub response_body: Option<Value>,
    /// Transport or decode error, when one occurred.
    pub error: Option<String>,
}

// ============================================================================
// SECTION: Responses
// ============================================================================

/// A complete HTTP response captured for assertion.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// Request URL the response belongs to.
    url: String,
    /// HTTP status code.
    status: u16,
    /// Content-Type header, when present.
    content_type: Option<String>,
    /// Content-Disposition header, when present.
    content_disposition: Option<String>,
    /// Raw response body.
    bytes: Vec<u8>,
}

impl ApiResponse {
    /// Returns the HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Returns the Content-Type header, when present.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Returns the Content-Disposition header, when present.
    #[must_use]
    pub fn content_disposition(&self) -> Option<&str> {
        self.content_disposition.as_deref()
    }

    /// Returns the raw response body.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the response body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    /// Parses the response body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Protocol`] when the body is not valid JSON.
    pub fn json(&self) -> Result<Value, DriverError> {
        serde_json::from_slice(&self.bytes).map_err(|err| DriverError::Protocol {
            target: self.url.clone(),
            reason: format!("response body is not json: {err}"),
        })
    }
}

// ============================================================================
// SECTION: Upload Parts
// ============================================================================

/// One field of a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadPart {
    /// Form field name.
    name: String,
    /// File name for file parts; text parts carry none.
    file_name: Option<String>,
    /// MIME type for file parts.
    content_type: Option<String>,
    /// Field payload.
    data: Vec<u8>,
}

impl UploadPart {
    /// Builds a plain text form field.
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file_name: None,
            content_type: None,
            data: value.into().into_bytes(),
        }
    }

    /// Builds a file form field with an explicit MIME type.
    #[must_use]
    pub fn file(
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            file_name: Some(file_name.into()),
            content_type: Some(content_type.into()),
            data,
        }
    }

    /// Converts the part into a reqwest multipart part.
    fn to_part(&self) -> Result<Part, DriverError> {
        let mut part = Part::bytes(self.data.clone());
        if let Some(file_name) = &self.file_name {
            part = part.file_name(file_name.clone());
        }
        if let Some(content_type) = &self.content_type {
            part = part.mime_str(content_type).map_err(|err| {
                DriverError::Protocol {
                    target: self.name.clone(),
                    reason: format!("invalid part mime type: {err}"),
                }
            })?;
        }
        Ok(part)
    }
}

// ============================================================================
// SECTION: Payloads
// ============================================================================

/// Request payload variants, rebuilt per send attempt.
enum Payload<'a> {
    /// No request body.
    Empty,
    /// JSON request body.
    Json(&'a Value),
    /// Multipart form body.
    Multipart(&'a [UploadPart]),
    /// Raw bytes with an explicit content type.
    Bytes {
        /// MIME type for the body.
        content_type: &'a str,
        /// Body bytes.
        data: &'a [u8],
    },
}

// ============================================================================
// SECTION: Request Driver
// ============================================================================

/// HTTP driver bound to one base URL with transcript capture.
#[derive(Clone)]
pub struct RequestDriver {
    /// Base URL without a trailing slash.
    base_url: String,
    /// Shared HTTP client.
    client: Client,
    /// Recorded exchanges, shared across clones.
    transcript: Arc<Mutex<Vec<TranscriptEntry>>>,
    /// Bearer token applied to every request, when set.
    bearer_token: Option<String>,
}

impl std::fmt::Debug for RequestDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestDriver").field("base_url", &self.base_url).finish_non_exhaustive()
    }
}

impl RequestDriver {
    /// Creates a driver for a base URL with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Protocol`] when the client fails to build.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DriverError> {
        let base_url = base_url.into();
        let client = Client::builder().timeout(timeout).build().map_err(|err| {
            DriverError::Protocol {
                target: base_url.clone(),
                reason: format!("failed to build http client: {err}"),
            }
        })?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            transcript: Arc::new(Mutex::new(Vec::new())),
            bearer_token: None,
        })
    }

    /// Returns a clone of the driver with a bearer token attached.
    #[must_use]
    pub fn with_bearer_token(&self, token: impl Into<String>) -> Self {
        let mut driver = self.clone();
        driver.bearer_token = Some(token.into());
        driver
    }

    /// Returns the base URL the driver targets.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns a snapshot of the transcript entries.
    #[must_use]
    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        self.transcript.lock().map_or_else(|_| Vec::new(), |entries| entries.clone())
    }

    /// Issues a GET request against a path under the base URL.
    ///
    /// # Errors
    ///
    /// Returns a [`DriverError`] when the target is unreachable or the
    /// exchange fails at the transport level.
    pub async fn get(&self, path: &str) -> Result<ApiResponse, DriverError> {
        self.send(Method::GET, path, &Payload::Empty, None).await
    }

    /// Issues a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns a [`DriverError`] when the target is unreachable or the
    /// exchange fails at the transport level.
    pub async fn post_json(&self, path: &str, body: &Value) -> Result<ApiResponse, DriverError> {
        self.send(Method::POST, path, &Payload::Json(body), None).await
    }

    /// Issues a POST request with a multipart form body.
    ///
    /// # Errors
    ///
    /// Returns a [`DriverError`] when the target is unreachable or the
    /// exchange fails at the transport level.
    pub async fn post_multipart(
        &self,
        path: &str,
        parts: &[UploadPart],
    ) -> Result<ApiResponse, DriverError> {
        self.send(Method::POST, path, &Payload::Multipart(parts), None).await
    }

    /// Issues a multipart POST with a per-call timeout override, for
    /// payloads that legitimately exceed the client default.
    ///
    /// # Errors
    ///
    /// Returns a [`DriverError`] when the target is unreachable or the
    /// exchange fails at the transport level.
    pub async fn post_multipart_with_timeout(
        &self,
        path: &str,
        parts: &[UploadPart],
        timeout: Duration,
    ) -> Result<ApiResponse, DriverError> {
        self.send(Method::POST, path, &Payload::Multipart(parts), Some(timeout)).await
    }

    /// Issues a PUT request with raw bytes and an explicit content type.
    ///
    /// # Errors
    ///
    /// Returns a [`DriverError`] when the target is unreachable or the
    /// exchange fails at the transport level.
    pub async fn put_bytes(
        &self,
        path: &str,
        content_type: &str,
        data: &[u8],
    ) -> Result<ApiResponse, DriverError> {
        self.send(
            Method::PUT,
            path,
            &Payload::Bytes {
                content_type,
                data,
            },
            None,
        )
        .await
    }

    /// Sends one request, retrying transient transport failures.
    async fn send(
        &self,
        method: Method,
        path: &str,
        payload: &Payload<'_>,
        timeout: Option<Duration>,
    ) -> Result<ApiResponse, DriverError> {
        let url = format!("{}{}", self.base_url, path);
        let request_body = match payload {
            Payload::Json(body) => Some((*body).clone()),
            Payload::Empty | Payload::Multipart(_) | Payload::Bytes { .. } => None,
        };

        let mut last_error: Option<DriverError> = None;
        for attempt in 1..=MAX_HTTP_SEND_ATTEMPTS {
            let mut builder = self.client.request(method.clone(), &url);
            if let Some(timeout) = timeout {
                builder = builder.timeout(timeout);
            }
            if let Some(token) = &self.bearer_token {
                builder = builder.bearer_auth(token);
            }
            builder = match payload {
                Payload::Empty => builder,
                Payload::Json(body) => builder.json(body),
                Payload::Multipart(parts) => {
                    let mut form = Form::new();
                    for part in *parts {
                        form = form.part(part.name.clone(), part.to_part()?);
                    }
                    builder.multipart(form)
                }
                Payload::Bytes {
                    content_type,
                    data,
                } => builder.header("content-type", *content_type).body(data.to_vec()),
            };

            match builder.send().await {
                Ok(response) => {
                    let captured = capture_response(&url, response).await?;
                    self.record(
                        method.as_str(),
                        &url,
                        Some(captured.status),
                        request_body,
                        Some(transcript_echo(&captured)),
                        None,
                    );
                    return Ok(captured);
                }
                Err(err) => {
                    let classified = DriverError::from_send(&url, &err);
                    if should_retry_send(&err, attempt) {
                        last_error = Some(classified);
                        sleep(retry_delay_for_attempt(attempt)).await;
                        continue;
                    }
                    self.record(
                        method.as_str(),
                        &url,
                        None,
                        request_body,
                        None,
                        Some(classified.to_string()),
                    );
                    return Err(classified);
                }
            }
        }

        let classified = last_error.unwrap_or_else(|| DriverError::Unreachable {
            target: url.clone(),
            reason: "exhausted retry attempts".to_string(),
        });
        self.record(method.as_str(), &url, None, request_body, None, Some(classified.to_string()));
        Err(classified)
    }

    /// Appends one exchange to the transcript.
    fn record(
        &self,
        method: &str,
        url: &str,
        status: Option<u16>,
        request_body: Option<Value>,
        response_body: Option<Value>,
        error: Option<String>,
    ) {
        let Ok(mut guard) = self.transcript.lock() else {
            return;
        };
        let sequence = u64::try_from(guard.len()).unwrap_or(u64::MAX).saturating_add(1);
        guard.push(TranscriptEntry {
            sequence,
            method: method.to_string(),
            url: url.to_string(),
            status,
            request_body,
            response_body,
            error,
        });
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Drains a reqwest response into an owned [`ApiResponse`].
async fn capture_response(
    url: &str,
    response: reqwest::Response,
) -> Result<ApiResponse, DriverError> {
    let status = response.status().as_u16();
    let content_type = header_value(&response, "content-type");
    let content_disposition = header_value(&response, "content-disposition");
    let bytes = response.bytes().await.map_err(|err| DriverError::Protocol {
        target: url.to_string(),
        reason: format!("failed to read response body: {err}"),
    })?;
    Ok(ApiResponse {
        url: url.to_string(),
        status,
        content_type,
        content_disposition,
        bytes: bytes.to_vec(),
    })
}

/// Reads one response header as a string.
fn header_value(response: &reqwest::Response, name: &str) -> Option<String> {
    response.headers().get(name).and_then(|value| value.to_str().ok()).map(str::to_string)
}

/// Builds the transcript echo of a response body, parsed as JSON when
/// possible and truncated otherwise.
fn transcript_echo(response: &ApiResponse) -> Value {
    if let Ok(json) = response.json() {
        return json;
    }
    let text = response.text();
    let capped: String = text.chars().take(TRANSCRIPT_BODY_CAP).collect();
    Value::String(capped)
}

/// Returns true when an HTTP send failure should be retried.
fn should_retry_send(err: &reqwest::Error, attempt: u32) -> bool {
    if attempt >= MAX_HTTP_SEND_ATTEMPTS {
        return false;
    }
    if err.is_connect() || err.is_timeout() {
        return true;
    }
    if !err.is_request() {
        return false;
    }
    let msg = err.to_string().to_ascii_lowercase();
    msg.contains("connection reset")
        || msg.contains("connection refused")
        || msg.contains("connection closed")
        || msg.contains("broken pipe")
        || msg.contains("connection aborted")
        || msg.contains("timed out")
        || msg.contains("eof")
}

/// Returns bounded linear backoff for HTTP send retries.
fn retry_delay_for_attempt(attempt: u32) -> Duration {
    Duration::from_millis(u64::from(attempt) * BASE_HTTP_SEND_RETRY_DELAY_MS)
}
