// crates/gauntlet-core/src/check.rs
// ============================================================================
// Module: Assertions
// Description: Assertion helpers producing classified contract failures.
// Purpose: Keep expected-vs-actual context attached to every failed check.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Each helper returns `Result<(), Abort>` so case bodies compose checks
//! with `?`. A failed check aborts the body at the failing assertion; the
//! remaining checks are not evaluated.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Debug;

use crate::outcome::Abort;
use crate::outcome::Failure;

// ============================================================================
// SECTION: Checks
// ============================================================================

/// Asserts an HTTP status code.
///
/// # Errors
///
/// Returns a contract-violation abort when the status differs.
pub fn status(label: &str, expected: u16, actual: u16) -> Result<(), Abort> {
    if expected == actual {
        return Ok(());
    }
    Err(Failure::contract(
        format!("{label}: unexpected status"),
        expected.to_string(),
        actual.to_string(),
    )
    .into())
}

/// Asserts equality of two values.
///
/// # Errors
///
/// Returns a contract-violation abort when the values differ.
pub fn eq<T: PartialEq + Debug>(label: &str, expected: &T, actual: &T) -> Result<(), Abort> {
    if expected == actual {
        return Ok(());
    }
    Err(Failure::contract(
        format!("{label}: values differ"),
        format!("{expected:?}"),
        format!("{actual:?}"),
    )
    .into())
}

/// Asserts that `haystack` contains `needle`.
///
/// # Errors
///
/// Returns a contract-violation abort when the needle is absent.
pub fn contains(label: &str, haystack: &str, needle: &str) -> Result<(), Abort> {
    if haystack.contains(needle) {
        return Ok(());
    }
    Err(Failure::contract(
        format!("{label}: substring missing"),
        format!("contains {needle:?}"),
        truncated(haystack),
    )
    .into())
}

/// Asserts that a condition holds.
///
/// # Errors
///
/// Returns a contract-violation abort when the condition is false.
pub fn truthy(label: &str, condition: bool) -> Result<(), Abort> {
    if condition {
        return Ok(());
    }
    Err(Failure::contract(label, "true", "false").into())
}

/// Asserts that an optional field is present and returns it.
///
/// # Errors
///
/// Returns a contract-violation abort when the field is absent.
pub fn present<T>(label: &str, value: Option<T>) -> Result<T, Abort> {
    value.ok_or_else(|| Failure::contract(label, "present", "absent").into())
}

/// Converts the case into a skip with the given reason.
///
/// # Errors
///
/// Always returns the skip abort; callers propagate it with `?`.
pub fn skip<T>(reason: impl Into<String>) -> Result<T, Abort> {
    Err(Abort::Skip(reason.into()))
}

/// Bounds actual-value renderings so reports stay readable.
fn truncated(value: &str) -> String {
    const MAX: usize = 200;
    if value.len() <= MAX {
        return value.to_string();
    }
    let mut cut = MAX;
    while !value.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…", &value[..cut])
}
