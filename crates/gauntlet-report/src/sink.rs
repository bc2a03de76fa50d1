// crates/gauntlet-report/src/sink.rs
// ============================================================================
// Module: Result Sinks
// Description: JSONL case stream, canonical run summary, and sink fan-out.
// Purpose: Persist results incrementally so interrupted runs keep evidence.
// Dependencies: gauntlet-core, serde, serde_jcs, serde_json
// ============================================================================

//! ## Overview
//! The JSONL reporter appends and flushes one line per finished case, so
//! partial runs remain inspectable. The run-JSON reporter collects every
//! record and writes one canonical `run.json` at the end, embedding the
//! resolved configuration echo for reproducibility. `MultiReporter` fans
//! a single scheduler stream out to any number of sinks.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use gauntlet_core::CaseRecord;
use gauntlet_core::ResultSink;
use gauntlet_core::RunSummary;
use serde::Serialize;
use serde_json::Value;

use crate::console::write_stderr_line;

// ============================================================================
// SECTION: JSONL Reporter
// ============================================================================

/// Appends one JSON line per finished case, flushed immediately.
#[derive(Debug)]
pub struct JsonlReporter {
    /// Open stream, shared across workers.
    file: Mutex<File>,
    /// Stream path, used in error reporting.
    path: PathBuf,
}

impl JsonlReporter {
    /// Creates `cases.jsonl` under the run root.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be created.
    pub fn create(run_root: &Path) -> io::Result<Self> {
        let path = run_root.join("cases.jsonl");
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            file: Mutex::new(file),
            path,
        })
    }

    /// Returns the stream path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serializes and appends one record, flushing before returning.
    fn append(&self, record: &CaseRecord) -> io::Result<()> {
        let line = serde_json::to_string(record).map_err(io::Error::other)?;
        let Ok(mut file) = self.file.lock() else {
            return Err(io::Error::other("jsonl stream lock poisoned"));
        };
        writeln!(file, "{line}")?;
        file.flush()
    }
}

impl ResultSink for JsonlReporter {
    fn on_case(&self, record: &CaseRecord) {
        if let Err(err) = self.append(record) {
            write_stderr_line(&format!(
                "warning: failed to append {}: {err}",
                self.path.display()
            ));
        }
    }

    fn on_run_end(&self, _summary: &RunSummary) {}
}

// ============================================================================
// SECTION: Run JSON Reporter
// ============================================================================

/// Canonical run summary document written at the end of a run.
#[derive(Debug, Serialize)]
struct RunDocument<'a> {
    /// Resolved configuration echo.
    config: &'a Value,
    /// Aggregate counts.
    summary: &'a RunSummary,
    /// Every case record in completion order.
    cases: &'a [CaseRecord],
}

/// Collects case records and writes one canonical `run.json`.
#[derive(Debug)]
pub struct RunJsonReporter {
    /// Destination path.
    path: PathBuf,
    /// Resolved configuration echo embedded in the document.
    config: Value,
    /// Records collected in completion order.
    cases: Mutex<Vec<CaseRecord>>,
}

impl RunJsonReporter {
    /// Creates a reporter targeting `run.json` under the run root.
    #[must_use]
    pub fn new(run_root: &Path, config: Value) -> Self {
        Self {
            path: run_root.join("run.json"),
            config,
            cases: Mutex::new(Vec::new()),
        }
    }

    /// Returns the destination path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serializes the collected records canonically and writes the file.
    fn write_document(&self, summary: &RunSummary) -> io::Result<()> {
        let Ok(cases) = self.cases.lock() else {
            return Err(io::Error::other("run.json record lock poisoned"));
        };
        let document = RunDocument {
            config: &self.config,
            summary,
            cases: &cases,
        };
        let bytes = serde_jcs::to_vec(&document).map_err(io::Error::other)?;
        std::fs::write(&self.path, bytes)
    }
}

impl ResultSink for RunJsonReporter {
    fn on_case(&self, record: &CaseRecord) {
        if let Ok(mut cases) = self.cases.lock() {
            cases.push(record.clone());
        }
    }

    fn on_run_end(&self, summary: &RunSummary) {
        if let Err(err) = self.write_document(summary) {
            write_stderr_line(&format!(
                "warning: failed to write {}: {err}",
                self.path.display()
            ));
        }
    }
}

// ============================================================================
// SECTION: Fan-Out
// ============================================================================

/// Fans one scheduler stream out to several sinks in order.
pub struct MultiReporter {
    /// Sinks invoked in registration order.
    sinks: Vec<Arc<dyn ResultSink>>,
}

impl std::fmt::Debug for MultiReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiReporter").field("sinks", &self.sinks.len()).finish()
    }
}

impl MultiReporter {
    /// Builds a fan-out over the given sinks.
    #[must_use]
    pub fn new(sinks: Vec<Arc<dyn ResultSink>>) -> Self {
        Self {
            sinks,
        }
    }
}

impl ResultSink for MultiReporter {
    fn on_case(&self, record: &CaseRecord) {
        for sink in &self.sinks {
            sink.on_case(record);
        }
    }

    fn on_run_end(&self, summary: &RunSummary) {
        for sink in &self.sinks {
            sink.on_run_end(summary);
        }
    }
}
