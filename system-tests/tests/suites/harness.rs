// system-tests/tests/suites/harness.rs
// ============================================================================
// Module: Harness Suite
// Description: End-to-end runs of the scheduler against the stub portal.
// Purpose: Prove suites, projects, scheduler, and reporters compose.
// Dependencies: gauntlet-config, gauntlet-core, gauntlet-report,
//   gauntlet-suites, tempfile, tokio
// ============================================================================

//! ## Overview
//! Runs real suites through the full pipeline: config resolution, project
//! binding, the worker-pool scheduler, and the file reporters, with the
//! in-process stub portal standing in for a deployment. Covers the happy
//! path, the unreachable-deployment skip path, a contract violation
//! surfacing as a failure, and the reporter file formats.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::print_stdout,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::sync::Arc;
use std::sync::Mutex;

use axum::http::StatusCode;
use gauntlet_config::EnvSnapshot;
use gauntlet_config::RunConfig;
use gauntlet_config::default_projects;
use gauntlet_core::CaseRecord;
use gauntlet_core::FailureKind;
use gauntlet_core::Outcome;
use gauntlet_core::ResultSink;
use gauntlet_core::RunOptions;
use gauntlet_core::RunSummary;
use gauntlet_core::Scheduler;
use gauntlet_core::Suite;
use gauntlet_report::JsonlReporter;
use gauntlet_report::MultiReporter;
use gauntlet_report::RunArtifacts;
use gauntlet_report::RunJsonReporter;
use gauntlet_suites::PortalContext;
use gauntlet_suites::PortalFactory;
use gauntlet_suites::all_suites;
use system_tests::config::SystemTestConfig;
use tempfile::TempDir;

use crate::helpers::stub_portal::StubBehavior;
use crate::helpers::stub_portal::StubPortal;

/// Result sink that records everything it sees, for assertions.
#[derive(Default)]
struct TraceSink {
    /// Case records in arrival order.
    cases: Mutex<Vec<CaseRecord>>,
    /// Final run summary, once delivered.
    summary: Mutex<Option<RunSummary>>,
}

impl TraceSink {
    /// Returns a copy of the recorded case records.
    fn cases(&self) -> Vec<CaseRecord> {
        self.cases.lock().expect("cases lock").clone()
    }
}

impl ResultSink for TraceSink {
    fn on_case(&self, record: &CaseRecord) {
        self.cases.lock().expect("cases lock").push(record.clone());
    }

    fn on_run_end(&self, summary: &RunSummary) {
        *self.summary.lock().expect("summary lock") = Some(summary.clone());
    }
}

/// Resolves a run configuration pointed at the given API base URL.
fn config_for(api_url: &str) -> RunConfig {
    let snapshot = EnvSnapshot::from_pairs([
        ("GAUNTLET_API_URL", api_url),
        ("GAUNTLET_WORKERS", "2"),
        ("GAUNTLET_RETRIES", "0"),
    ]);
    RunConfig::from_snapshot(&snapshot).expect("config")
}

/// Returns the registered suites whose names are listed.
fn suites_named(names: &[&str]) -> Vec<Suite<PortalContext>> {
    all_suites().into_iter().filter(|suite| names.contains(&suite.name())).collect()
}

/// Runs the given suites against a configuration and traces the results.
async fn run_suites(
    config: &RunConfig,
    suites: Vec<Suite<PortalContext>>,
    capture_root: &TempDir,
) -> (Arc<TraceSink>, RunSummary) {
    let plan = default_projects(config).plan(suites);
    let factory = Arc::new(PortalFactory::new(
        config.clone(),
        capture_root.path().join("captures"),
    ));
    let sink = Arc::new(TraceSink::default());
    let scheduler: Scheduler<PortalContext> = Scheduler::new(factory, sink.clone());
    let options = RunOptions::new(config.workers, config.retries, config.timeout);
    let summary = scheduler.run(plan, options).await.expect("run");
    (sink, summary)
}

/// Releases a workdir, persisting it when the keep switch is set.
fn finish_workdir(workdir: TempDir) {
    let keep = SystemTestConfig::load().map(|config| config.keep_artifacts).unwrap_or(false);
    if keep {
        let kept = workdir.keep();
        println!("run artifacts kept at {}", kept.display());
    }
}

#[tokio::test]
async fn auth_and_search_suites_pass_against_the_stub() {
    let stub = StubPortal::spawn().await;
    let config = config_for(stub.base_url());
    let workdir = TempDir::new().expect("tempdir");
    let (sink, summary) =
        run_suites(&config, suites_named(&["auth.api", "search.api"]), &workdir).await;

    assert_eq!(summary.failed, 0);
    assert_eq!(summary.skipped, 0);
    assert!(summary.passed > 0);
    assert_eq!(summary.total(), sink.cases().len() as u64);
    for record in sink.cases() {
        assert_eq!(record.outcome, Outcome::Passed, "case failed: {}", record.case);
        assert_eq!(record.project, "api");
    }
    finish_workdir(workdir);
}

#[tokio::test]
async fn unreachable_deployment_skips_every_case() {
    // Discard port; nothing listens there.
    let config = config_for("http://127.0.0.1:9");
    let workdir = TempDir::new().expect("tempdir");
    let (sink, summary) = run_suites(&config, suites_named(&["auth.api"]), &workdir).await;

    assert_eq!(summary.failed, 0);
    assert_eq!(summary.passed, 0);
    assert!(summary.skipped > 0);
    for record in sink.cases() {
        match record.outcome {
            Outcome::Skipped {
                ref reason,
            } => assert!(reason.contains("not reachable"), "unexpected reason: {reason}"),
            ref other => panic!("expected a skip, got {other:?} for {}", record.case),
        }
    }
    finish_workdir(workdir);
}

#[tokio::test]
async fn contract_violation_surfaces_as_a_failure() {
    let stub = StubPortal::spawn_with(StubBehavior {
        register_status: StatusCode::OK,
    })
    .await;
    let config = config_for(stub.base_url());
    let workdir = TempDir::new().expect("tempdir");
    let suites: Vec<Suite<PortalContext>> = suites_named(&["auth.api"])
        .into_iter()
        .map(|suite| {
            suite.filter(|case| case.name() == "register creates a student account with tokens")
        })
        .collect();
    let (sink, summary) = run_suites(&config, suites, &workdir).await;

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.passed, 0);
    let cases = sink.cases();
    assert_eq!(cases.len(), 1);
    match &cases[0].outcome {
        Outcome::Failed {
            failure,
        } => assert_eq!(failure.kind, FailureKind::Contract),
        other => panic!("expected a contract failure, got {other:?}"),
    }
    finish_workdir(workdir);
}

#[tokio::test]
async fn reporters_write_parseable_run_artifacts() {
    let stub = StubPortal::spawn().await;
    let config = config_for(stub.base_url());
    let workdir = TempDir::new().expect("tempdir");
    let artifacts = RunArtifacts::create(workdir.path()).expect("artifacts root");

    let jsonl = Arc::new(JsonlReporter::create(artifacts.root()).expect("jsonl reporter"));
    let run_json = Arc::new(RunJsonReporter::new(
        artifacts.root(),
        serde_json::to_value(&config).expect("config echo"),
    ));
    let sink = Arc::new(MultiReporter::new(vec![jsonl, run_json]));

    let plan = default_projects(&config).plan(suites_named(&["auth.api"]));
    let factory = Arc::new(PortalFactory::new(
        config.clone(),
        artifacts.root().join("captures"),
    ));
    let scheduler: Scheduler<PortalContext> = Scheduler::new(factory, sink);
    let options = RunOptions::new(config.workers, config.retries, config.timeout);
    let summary = scheduler.run(plan, options).await.expect("run");
    assert_eq!(summary.failed, 0);

    let jsonl_body =
        std::fs::read_to_string(artifacts.root().join("cases.jsonl")).expect("cases.jsonl");
    let lines: Vec<&str> = jsonl_body.lines().filter(|line| !line.is_empty()).collect();
    assert_eq!(lines.len() as u64, summary.total());
    for line in lines {
        let record: CaseRecord = serde_json::from_str(line).expect("case line parses");
        assert_eq!(record.suite, "auth.api");
    }

    let run_body = std::fs::read_to_string(artifacts.root().join("run.json")).expect("run.json");
    let document: serde_json::Value = serde_json::from_str(&run_body).expect("run.json parses");
    assert!(document.get("config").is_some());
    assert!(document.get("summary").is_some());
    assert_eq!(
        document
            .pointer("/summary/passed")
            .and_then(serde_json::Value::as_u64),
        Some(summary.passed),
    );
    finish_workdir(workdir);
}
