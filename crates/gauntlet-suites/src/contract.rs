// crates/gauntlet-suites/src/contract.rs
// ============================================================================
// Module: Portal Wire Contract
// Description: JSON envelope the portal API wraps every response in.
// Purpose: Decode and assert the success/error/pagination envelope.
// Dependencies: gauntlet-core, gauntlet-drivers, serde, serde_json
// ============================================================================

//! ## Overview
//! Every portal API response is an envelope: `success` plus exactly one
//! of `data` or `error`, and an optional `pagination` block on list
//! endpoints. A body that fails to decode as an envelope is itself a
//! contract violation, reported with the offending payload.

// ============================================================================
// SECTION: Imports
// ============================================================================

use gauntlet_core::Abort;
use gauntlet_core::Failure;
use gauntlet_drivers::ApiResponse;
use serde::Deserialize;
use serde_json::Value;

// ============================================================================
// SECTION: Envelope
// ============================================================================

/// Structured error block carried on failure envelopes.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    /// Stable machine-readable code, e.g. `VALIDATION_ERROR`.
    pub code: String,
    /// Human-readable description.
    #[serde(default)]
    pub message: Option<String>,
}

/// Pagination block echoed on list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    /// 1-based page number.
    pub page: u64,
    /// Page size.
    pub limit: u64,
    /// Total matching items, when the endpoint reports it.
    #[serde(default)]
    pub total: Option<u64>,
    /// Total pages, when the endpoint reports it.
    #[serde(default)]
    pub total_pages: Option<u64>,
}

/// Response envelope wrapping every portal API payload.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    /// Whether the request succeeded.
    pub success: bool,
    /// Payload on success.
    #[serde(default)]
    pub data: Option<Value>,
    /// Error block on failure.
    #[serde(default)]
    pub error: Option<ApiError>,
    /// Pagination block on list endpoints.
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl Envelope {
    /// Decodes a response body as an envelope.
    ///
    /// # Errors
    ///
    /// Returns `Abort::Fail` with a contract failure when the body is
    /// not a valid envelope.
    pub fn parse(response: &ApiResponse) -> Result<Self, Abort> {
        let body = response.json().map_err(|err| {
            Abort::Fail(Failure::contract(
                "response body decodes as a json envelope",
                "json object with `success`",
                err.to_string(),
            ))
        })?;
        serde_json::from_value(body).map_err(|err| {
            Abort::Fail(Failure::contract(
                "response body matches the envelope shape",
                "{success, data?, error?, pagination?}",
                err.to_string(),
            ))
        })
    }

    /// Returns the `data` payload, failing when it is absent.
    ///
    /// # Errors
    ///
    /// Returns `Abort::Fail` when the envelope carries no data block.
    pub fn data(&self) -> Result<&Value, Abort> {
        self.data.as_ref().ok_or_else(|| {
            Abort::Fail(Failure::contract(
                "envelope carries a data block",
                "data present",
                "data absent",
            ))
        })
    }

    /// Returns the error code, when the envelope carries one.
    #[must_use]
    pub fn error_code(&self) -> Option<&str> {
        self.error.as_ref().map(|error| error.code.as_str())
    }

    /// Returns the pagination block, failing when it is absent.
    ///
    /// # Errors
    ///
    /// Returns `Abort::Fail` when the envelope carries no pagination.
    pub fn pagination(&self) -> Result<&Pagination, Abort> {
        self.pagination.as_ref().ok_or_else(|| {
            Abort::Fail(Failure::contract(
                "list envelope carries pagination",
                "pagination present",
                "pagination absent",
            ))
        })
    }
}

/// Reads a string field from a JSON payload by pointer.
///
/// # Errors
///
/// Returns `Abort::Fail` when the pointer is absent or not a string.
pub fn string_at<'a>(payload: &'a Value, pointer: &str) -> Result<&'a str, Abort> {
    payload.pointer(pointer).and_then(Value::as_str).ok_or_else(|| {
        Abort::Fail(Failure::contract(
            format!("payload field {pointer} is a string"),
            "string present",
            payload
                .pointer(pointer)
                .map_or_else(|| "absent".to_string(), ToString::to_string),
        ))
    })
}
