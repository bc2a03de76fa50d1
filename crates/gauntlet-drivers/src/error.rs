// crates/gauntlet-drivers/src/error.rs
// ============================================================================
// Module: Driver Errors
// Description: Failure classification for network drivers.
// Purpose: Separate unreachable deployments from protocol violations.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Drivers classify failures so suites can apply the skip policy: an
//! unreachable or absent service skips its cases, while a reachable
//! service that misbehaves fails them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by the request and page drivers.
///
/// # Invariants
/// - `Unreachable` covers refused connections and DNS failures only;
///   reachable services that misbehave map to other variants.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The target refused the connection or could not be resolved.
    #[error("{target} is unreachable: {reason}")]
    Unreachable {
        /// Endpoint the driver attempted to reach.
        target: String,
        /// Transport-level reason.
        reason: String,
    },
    /// The request exceeded its deadline.
    #[error("request to {target} timed out")]
    Timeout {
        /// Endpoint the driver attempted to reach.
        target: String,
    },
    /// The target responded with a payload the driver could not decode.
    #[error("protocol error from {target}: {reason}")]
    Protocol {
        /// Endpoint that produced the payload.
        target: String,
        /// Decoder-reported reason.
        reason: String,
    },
    /// A WebDriver command failed inside an established session.
    #[error("webdriver command failed: {0}")]
    Session(String),
}

impl DriverError {
    /// Returns true when the failure means the target is not deployed.
    #[must_use]
    pub const fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }

    /// Classifies a reqwest transport error against a target endpoint.
    #[must_use]
    pub fn from_send(target: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout {
                target: target.to_string(),
            };
        }
        if err.is_connect() {
            return Self::Unreachable {
                target: target.to_string(),
                reason: err.to_string(),
            };
        }
        Self::Protocol {
            target: target.to_string(),
            reason: err.to_string(),
        }
    }
}
