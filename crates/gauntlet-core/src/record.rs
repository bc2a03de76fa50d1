// crates/gauntlet-core/src/record.rs
// ============================================================================
// Module: Result Records
// Description: Per-case records with every attempt plus run-level counts.
// Purpose: Give reporters one authoritative, serializable result shape.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The scheduler emits one [`CaseRecord`] per case. The final attempt is
//! authoritative for the outcome, but earlier attempts stay recorded so
//! retried failures keep their artifacts and error text for triage.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::outcome::Outcome;

// ============================================================================
// SECTION: Attempt Record
// ============================================================================

/// One execution attempt of a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// 1-based attempt index.
    pub index: u32,
    /// Outcome of this attempt.
    pub outcome: Outcome,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
    /// Paths of artifacts captured during this attempt.
    pub artifacts: Vec<String>,
}

// ============================================================================
// SECTION: Case Record
// ============================================================================

/// Authoritative record of one case across all attempts.
///
/// # Invariants
/// - `outcome` equals the outcome of the last attempt.
/// - `flaky` is true only for a pass preceded by at least one failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    /// Owning suite name.
    pub suite: String,
    /// Case name.
    pub case: String,
    /// Project the case executed under.
    pub project: String,
    /// Case tags.
    pub tags: Vec<String>,
    /// Final, authoritative outcome.
    pub outcome: Outcome,
    /// Every attempt in execution order.
    pub attempts: Vec<AttemptRecord>,
    /// True when the case passed only after retries.
    pub flaky: bool,
    /// Total wall-clock duration across attempts, in milliseconds.
    pub duration_ms: u64,
}

impl CaseRecord {
    /// Builds a record from attempts; the last attempt is authoritative.
    ///
    /// Returns `None` when no attempt was recorded.
    #[must_use]
    pub fn from_attempts(
        suite: impl Into<String>,
        case: impl Into<String>,
        project: impl Into<String>,
        tags: Vec<String>,
        attempts: Vec<AttemptRecord>,
    ) -> Option<Self> {
        let last = attempts.last()?;
        let flaky = last.outcome.is_passed() && attempts.len() > 1;
        let outcome = last.outcome.clone();
        let duration_ms = attempts.iter().map(|attempt| attempt.duration_ms).sum();
        Some(Self {
            suite: suite.into(),
            case: case.into(),
            project: project.into(),
            tags,
            outcome,
            attempts,
            flaky,
            duration_ms,
        })
    }
}

// ============================================================================
// SECTION: Run Summary
// ============================================================================

/// Aggregated counts for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Cases whose final outcome was a pass.
    pub passed: u64,
    /// Cases whose final outcome was a failure.
    pub failed: u64,
    /// Cases whose final outcome was a skip.
    pub skipped: u64,
    /// Cases that passed only after retries.
    pub flaky: u64,
    /// Suites that matched no project and were excluded from the plan.
    pub unmatched_suites: Vec<String>,
    /// Total run duration in milliseconds.
    pub duration_ms: u64,
}

impl RunSummary {
    /// Folds one case record into the counts.
    pub fn absorb(&mut self, record: &CaseRecord) {
        match &record.outcome {
            Outcome::Passed => self.passed += 1,
            Outcome::Failed {
                ..
            } => self.failed += 1,
            Outcome::Skipped {
                ..
            } => self.skipped += 1,
        }
        if record.flaky {
            self.flaky += 1;
        }
    }

    /// Returns the total number of recorded cases.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.passed + self.failed + self.skipped
    }
}
