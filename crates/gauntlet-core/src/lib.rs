// crates/gauntlet-core/src/lib.rs
// ============================================================================
// Module: Gauntlet Core
// Description: Outcome model, case/suite model, project binding, scheduler.
// Purpose: Provide the runner core shared by drivers, reporters, and the CLI.
// Dependencies: serde, thiserror, tokio
// ============================================================================

//! ## Overview
//! Core model for the Gauntlet contract-test runner. Test cases are generic
//! over an injected context type so driver construction stays outside this
//! crate. Outcomes are an explicit three-state enum; skips are an early-exit
//! channel, never an error misused for control flow.
//! Invariants:
//! - A case executes once per run plus at most `retries` re-runs on failure.
//! - Within one worker, cases execute in discovery order.
//! - A failing case never halts sibling cases; only misuse aborts the run.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod case;
pub mod check;
pub mod outcome;
pub mod project;
pub mod record;
pub mod scheduler;
pub mod suite;

pub use case::TestCase;
pub use outcome::Abort;
pub use outcome::Failure;
pub use outcome::FailureKind;
pub use outcome::Outcome;
pub use project::BoundSuite;
pub use project::Plan;
pub use project::Project;
pub use project::ProjectSet;
pub use record::AttemptRecord;
pub use record::CaseRecord;
pub use record::RunSummary;
pub use scheduler::AttemptArtifacts;
pub use scheduler::ContextFactory;
pub use scheduler::FatalError;
pub use scheduler::ResultSink;
pub use scheduler::RunOptions;
pub use scheduler::Scheduler;
pub use suite::Suite;
