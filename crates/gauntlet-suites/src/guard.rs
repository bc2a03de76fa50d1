// crates/gauntlet-suites/src/guard.rs
// ============================================================================
// Module: Reachability Guard
// Description: Skip policy for targets that are not deployed.
// Purpose: Map unreachable services to skips and real faults to failures.
// Dependencies: gauntlet-core, gauntlet-drivers
// ============================================================================

//! ## Overview
//! Suites run against a deployment that may be partially up. An unreachable
//! service or a 404 at a known route means the environment is not
//! provisioned: the case skips. A reachable service that misbehaves is a
//! genuine failure. These helpers sit between driver calls and
//! assertions so every case applies the same policy.

// ============================================================================
// SECTION: Imports
// ============================================================================

use gauntlet_core::Abort;
use gauntlet_core::Failure;
use gauntlet_drivers::ApiResponse;
use gauntlet_drivers::DriverError;

// ============================================================================
// SECTION: Guards
// ============================================================================

/// Applies the skip policy to a driver result.
///
/// # Errors
///
/// Returns `Abort::Skip` when the target is unreachable, a timeout
/// failure when the deadline expired, and a driver failure otherwise.
pub fn reachable<T>(result: Result<T, DriverError>, service: &str) -> Result<T, Abort> {
    match result {
        Ok(value) => Ok(value),
        Err(err) if err.is_unreachable() => {
            Err(Abort::Skip(format!("{service} not reachable: {err}")))
        }
        Err(err @ DriverError::Timeout { .. }) => {
            Err(Abort::Fail(Failure::timeout(format!("{service}: {err}"))))
        }
        Err(err) => Err(Abort::Fail(Failure::driver(format!("{service}: {err}")))),
    }
}

/// Skips when a known route answers 404, meaning the API is not running.
///
/// # Errors
///
/// Returns `Abort::Skip` for a 404 response.
pub fn provisioned(response: ApiResponse, service: &str) -> Result<ApiResponse, Abort> {
    if response.status() == 404 {
        return Err(Abort::Skip(format!("{service} not running (404 at a known route)")));
    }
    Ok(response)
}
