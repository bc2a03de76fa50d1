// crates/gauntlet-report/src/html.rs
// ============================================================================
// Module: HTML Reporter
// Description: Self-contained HTML run report.
// Purpose: Render collected case records into a browsable single page.
// Dependencies: gauntlet-core
// ============================================================================

//! ## Overview
//! The HTML reporter collects case records during the run and renders a
//! single self-contained page at the end: a totals banner, one table row
//! per case, and expandable failure detail. No external assets, so the
//! file can be archived or attached to CI runs as-is.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;

use gauntlet_core::CaseRecord;
use gauntlet_core::Outcome;
use gauntlet_core::ResultSink;
use gauntlet_core::RunSummary;

use crate::console::write_stderr_line;

// ============================================================================
// SECTION: HTML Reporter
// ============================================================================

/// Collects case records and renders `index.html` when the run ends.
#[derive(Debug)]
pub struct HtmlReporter {
    /// Destination path.
    path: PathBuf,
    /// Records collected in completion order.
    cases: Mutex<Vec<CaseRecord>>,
}

impl HtmlReporter {
    /// Creates a reporter targeting `index.html` under the report root.
    #[must_use]
    pub fn new(report_dir: &Path) -> Self {
        Self {
            path: report_dir.join("index.html"),
            cases: Mutex::new(Vec::new()),
        }
    }

    /// Returns the destination path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Renders and writes the report.
    fn write_report(&self, summary: &RunSummary) -> io::Result<()> {
        let Ok(cases) = self.cases.lock() else {
            return Err(io::Error::other("html record lock poisoned"));
        };
        let page = render_page(summary, &cases);
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, page)
    }
}

impl ResultSink for HtmlReporter {
    fn on_case(&self, record: &CaseRecord) {
        if let Ok(mut cases) = self.cases.lock() {
            cases.push(record.clone());
        }
    }

    fn on_run_end(&self, summary: &RunSummary) {
        if let Err(err) = self.write_report(summary) {
            write_stderr_line(&format!(
                "warning: failed to write {}: {err}",
                self.path.display()
            ));
        }
    }
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders the full report page.
fn render_page(summary: &RunSummary, cases: &[CaseRecord]) -> String {
    let mut out = String::new();
    out.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("<meta charset=\"utf-8\">\n<title>Gauntlet Run Report</title>\n");
    out.push_str("<style>\n");
    out.push_str("body { font-family: sans-serif; margin: 2rem; }\n");
    out.push_str("table { border-collapse: collapse; width: 100%; }\n");
    out.push_str("th, td { border: 1px solid #ccc; padding: 0.4rem 0.6rem; text-align: left; }\n");
    out.push_str(".pass { color: #1a7f37; }\n.fail { color: #cf222e; }\n");
    out.push_str(".skip { color: #9a6700; }\n.flaky { color: #8250df; }\n");
    out.push_str("details { margin: 0; }\npre { white-space: pre-wrap; margin: 0.3rem 0 0; }\n");
    out.push_str("</style>\n</head>\n<body>\n");
    out.push_str("<h1>Gauntlet Run Report</h1>\n");

    let _ = writeln!(
        out,
        "<p><span class=\"pass\">{} passed</span>, <span class=\"fail\">{} failed</span>, \
         <span class=\"skip\">{} skipped</span>, <span class=\"flaky\">{} flaky</span> \
         in {} ms</p>",
        summary.passed, summary.failed, summary.skipped, summary.flaky, summary.duration_ms
    );
    if !summary.unmatched_suites.is_empty() {
        out.push_str("<p>Unmatched suites: ");
        out.push_str(&escape_html(&summary.unmatched_suites.join(", ")));
        out.push_str("</p>\n");
    }

    out.push_str("<table>\n<tr><th>Status</th><th>Suite</th><th>Case</th>");
    out.push_str("<th>Project</th><th>Attempts</th><th>Duration</th></tr>\n");
    for record in cases {
        render_row(&mut out, record);
    }
    out.push_str("</table>\n</body>\n</html>\n");
    out
}

/// Renders one table row for a case record.
fn render_row(out: &mut String, record: &CaseRecord) {
    let (class, label, detail) = match &record.outcome {
        Outcome::Passed if record.flaky => ("flaky", "flaky", None),
        Outcome::Passed => ("pass", "pass", None),
        Outcome::Failed {
            failure,
        } => ("fail", "fail", Some(failure.to_string())),
        Outcome::Skipped {
            reason,
        } => ("skip", "skip", Some(reason.clone())),
    };
    let _ = writeln!(
        out,
        "<tr><td class=\"{class}\">{label}</td><td>{}</td><td>{}</td><td>{}</td>\
         <td>{}</td><td>{} ms</td></tr>",
        escape_html(&record.suite),
        escape_html(&record.case),
        escape_html(&record.project),
        record.attempts.len(),
        record.duration_ms
    );
    if let Some(detail) = detail {
        let _ = writeln!(
            out,
            "<tr><td colspan=\"6\"><details><summary>detail</summary><pre>{}</pre>\
             </details></td></tr>",
            escape_html(&detail)
        );
    }
    render_artifacts(out, record);
}

/// Renders the artifacts captured by each attempt as links.
fn render_artifacts(out: &mut String, record: &CaseRecord) {
    if record.attempts.iter().all(|attempt| attempt.artifacts.is_empty()) {
        return;
    }
    out.push_str("<tr><td colspan=\"6\"><details><summary>artifacts</summary><ul>\n");
    for attempt in &record.attempts {
        for path in &attempt.artifacts {
            let name = Path::new(path)
                .file_name()
                .map_or_else(|| path.clone(), |name| name.to_string_lossy().into_owned());
            let _ = writeln!(
                out,
                "<li>attempt {}: <a href=\"{}\">{}</a></li>",
                attempt.index,
                escape_html(path),
                escape_html(&name)
            );
        }
    }
    out.push_str("</ul></details></td></tr>\n");
}

/// Escapes text for embedding in HTML.
fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
