// crates/gauntlet-core/src/outcome.rs
// ============================================================================
// Module: Case Outcomes
// Description: Three-state outcome model and the early-exit abort channel.
// Purpose: Distinguish "environment not provisioned" from "behavior incorrect".
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A case body returns `Result<(), Abort>`. `Ok(())` is a pass. An
//! [`Abort::Skip`] raised by a precondition guard converts the remainder of
//! the body into a skipped outcome; no further assertions run once it is
//! raised. An [`Abort::Fail`] carries a classified [`Failure`].
//! Invariants:
//! - Failure kinds are stable for programmatic handling by reporters.
//! - Timeouts are reported distinctly from contract violations.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Failure Taxonomy
// ============================================================================

/// Classification of a case failure.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Response status or body shape mismatched the expected contract.
    Contract,
    /// No response arrived within the configured bound.
    Timeout,
    /// A driver could not be built or an operation failed below the contract
    /// layer (connection reset mid-exchange, protocol decode failure, panic).
    Driver,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contract => f.write_str("contract"),
            Self::Timeout => f.write_str("timeout"),
            Self::Driver => f.write_str("driver"),
        }
    }
}

/// A classified case failure with expected/actual context where available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    /// Failure classification for triage.
    pub kind: FailureKind,
    /// Human-readable description of what went wrong.
    pub message: String,
    /// Expected value rendering, when the failure is a comparison.
    pub expected: Option<String>,
    /// Actual value rendering, when the failure is a comparison.
    pub actual: Option<String>,
}

impl Failure {
    /// Creates a contract-violation failure with expected/actual context.
    #[must_use]
    pub fn contract(
        message: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            kind: FailureKind::Contract,
            message: message.into(),
            expected: Some(expected.into()),
            actual: Some(actual.into()),
        }
    }

    /// Creates a timeout failure.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Timeout,
            message: message.into(),
            expected: None,
            actual: None,
        }
    }

    /// Creates a driver-level failure.
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Driver,
            message: message.into(),
            expected: None,
            actual: None,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.expected, &self.actual) {
            (Some(expected), Some(actual)) => {
                write!(f, "{}: {} (expected {expected}, got {actual})", self.kind, self.message)
            }
            _ => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

// ============================================================================
// SECTION: Abort Channel
// ============================================================================

/// Early exit raised inside a case body.
///
/// # Invariants
/// - Once raised, no further assertions in the body are evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Abort {
    /// Precondition not met; the case is skipped, not failed.
    #[error("skipped: {0}")]
    Skip(String),
    /// Assertion or driver operation failed.
    #[error("{0}")]
    Fail(Failure),
}

impl From<Failure> for Abort {
    fn from(failure: Failure) -> Self {
        Self::Fail(failure)
    }
}

// ============================================================================
// SECTION: Outcome
// ============================================================================

/// Final outcome of one case attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// All assertions held.
    Passed,
    /// An assertion or operation failed.
    Failed {
        /// The classified failure.
        failure: Failure,
    },
    /// A precondition guard converted the case into a skip.
    Skipped {
        /// Why the case was skipped.
        reason: String,
    },
}

impl Outcome {
    /// Returns true when the outcome is a pass.
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Returns true when the outcome is a failure.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Returns true when the outcome is a skip.
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    /// Maps a case body result into an outcome.
    #[must_use]
    pub fn from_body(result: Result<(), Abort>) -> Self {
        match result {
            Ok(()) => Self::Passed,
            Err(Abort::Skip(reason)) => Self::Skipped {
                reason,
            },
            Err(Abort::Fail(failure)) => Self::Failed {
                failure,
            },
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => f.write_str("passed"),
            Self::Failed {
                failure,
            } => write!(f, "failed ({failure})"),
            Self::Skipped {
                reason,
            } => write!(f, "skipped ({reason})"),
        }
    }
}
