// crates/gauntlet-report/src/lib.rs
// ============================================================================
// Module: Gauntlet Report
// Description: Artifact capture and run reporting.
// Purpose: Persist per-case evidence and render run results for humans and CI.
// Dependencies: gauntlet-core, serde, serde_jcs, serde_json
// ============================================================================

//! ## Overview
//! Reporting is crash-safe by construction: every case record is appended
//! to a JSONL stream the moment its final attempt completes, so a run
//! that dies mid-flight still leaves a usable partial record. The final
//! summary, the HTML report, and CI annotations are derived views over
//! the same records.
//! Invariants:
//! - Case records are flushed to disk before the next case is reported.
//! - The canonical `run.json` uses JCS serialization for stable diffs.
//! - Reporter failures never fail the run; they surface on stderr.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod artifacts;
mod console;
mod html;
mod sink;

pub use artifacts::RunArtifacts;
pub use console::AnnotationReporter;
pub use console::ListReporter;
pub use console::write_stderr_line;
pub use console::write_stdout_line;
pub use html::HtmlReporter;
pub use sink::JsonlReporter;
pub use sink::MultiReporter;
pub use sink::RunJsonReporter;
