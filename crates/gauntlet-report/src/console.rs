// crates/gauntlet-report/src/console.rs
// ============================================================================
// Module: Console Reporters
// Description: Per-case list output and CI log annotations.
// Purpose: Stream human-readable and machine-parsable lines as cases finish.
// Dependencies: gauntlet-core
// ============================================================================

//! ## Overview
//! The list reporter prints one line per case as its final attempt
//! completes, then a totals line at the end of the run. The annotation
//! reporter emits GitHub workflow `::error` commands for failed cases so
//! CI logs link failures without parsing the JSONL stream.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;

use gauntlet_core::CaseRecord;
use gauntlet_core::Outcome;
use gauntlet_core::ResultSink;
use gauntlet_core::RunSummary;

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes one line to stdout, ignoring stream errors.
pub fn write_stdout_line(message: &str) {
    let mut stdout = std::io::stdout();
    let _ = writeln!(&mut stdout, "{message}");
}

/// Writes one line to stderr, ignoring stream errors.
pub fn write_stderr_line(message: &str) {
    let mut stderr = std::io::stderr();
    let _ = writeln!(&mut stderr, "{message}");
}

// ============================================================================
// SECTION: List Reporter
// ============================================================================

/// Streams one stdout line per finished case plus a totals line.
#[derive(Debug, Default, Clone, Copy)]
pub struct ListReporter;

impl ResultSink for ListReporter {
    fn on_case(&self, record: &CaseRecord) {
        let marker = match &record.outcome {
            Outcome::Passed if record.flaky => "flaky",
            Outcome::Passed => "pass",
            Outcome::Failed {
                ..
            } => "FAIL",
            Outcome::Skipped {
                ..
            } => "skip",
        };
        let mut line = format!(
            "  [{marker}] {} > {} [{}] ({} ms)",
            record.suite, record.case, record.project, record.duration_ms
        );
        match &record.outcome {
            Outcome::Failed {
                failure,
            } => {
                line.push_str(&format!("\n         {failure}"));
            }
            Outcome::Skipped {
                reason,
            } => {
                line.push_str(&format!(" - {reason}"));
            }
            Outcome::Passed => {}
        }
        write_stdout_line(&line);
    }

    fn on_run_end(&self, summary: &RunSummary) {
        write_stdout_line("");
        write_stdout_line(&format!(
            "  {} passed, {} failed, {} skipped, {} flaky ({} ms)",
            summary.passed, summary.failed, summary.skipped, summary.flaky, summary.duration_ms
        ));
        for suite in &summary.unmatched_suites {
            write_stdout_line(&format!("  [unmatched] {suite} bound no project"));
        }
    }
}

// ============================================================================
// SECTION: Annotation Reporter
// ============================================================================

/// Emits GitHub workflow commands for failed cases.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnnotationReporter;

impl ResultSink for AnnotationReporter {
    fn on_case(&self, record: &CaseRecord) {
        let Outcome::Failed {
            failure,
        } = &record.outcome
        else {
            return;
        };
        let title = escape_property(&format!("{} > {}", record.suite, record.case));
        let message = escape_data(&failure.to_string());
        write_stdout_line(&format!("::error title={title}::{message}"));
    }

    fn on_run_end(&self, _summary: &RunSummary) {}
}

/// Escapes a workflow command property value.
fn escape_property(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
        .replace(':', "%3A")
        .replace(',', "%2C")
}

/// Escapes a workflow command data value.
fn escape_data(value: &str) -> String {
    value.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}
