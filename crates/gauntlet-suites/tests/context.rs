// crates/gauntlet-suites/tests/context.rs
// ============================================================================
// Module: Context Tests
// Description: Capture placement checks for attempt contexts.
// Purpose: Keep captures browsable by suite, case, and attempt.
// Dependencies: gauntlet-config, gauntlet-core, gauntlet-suites, tempfile,
//   tokio
// ============================================================================

//! ## Overview
//! Builds attempt contexts through the factory and checks that captures
//! land in per-case attempt directories and register on the attempt's
//! artifact slot.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use gauntlet_config::EnvSnapshot;
use gauntlet_config::RunConfig;
use gauntlet_core::AttemptArtifacts;
use gauntlet_core::ContextFactory;
use gauntlet_core::Project;
use gauntlet_suites::PortalFactory;

fn config() -> RunConfig {
    let snapshot = EnvSnapshot::from_pairs([("GAUNTLET_API_URL", "http://127.0.0.1:9")]);
    RunConfig::from_snapshot(&snapshot).expect("config")
}

fn api_project() -> Project {
    Project {
        name: "api".to_string(),
        suffix: ".api".to_string(),
        base_url: "http://127.0.0.1:9".to_string(),
        browser: false,
    }
}

#[tokio::test]
async fn captures_land_in_the_labeled_attempt_directory() {
    let temp = tempfile::tempdir().expect("tempdir");
    let factory = PortalFactory::new(config(), temp.path().join("captures"));
    let slot = AttemptArtifacts::labeled("frontend.e2e", "login renders the form", 2);
    let ctx = factory.build(&api_project(), slot.clone()).await.expect("context");

    let path = ctx.save_capture("01-login.png", b"PNG!").expect("capture");
    assert!(path.is_file());
    let rendered = path.to_string_lossy().into_owned();
    assert!(rendered.contains("frontend.e2e"), "suite segment missing: {rendered}");
    assert!(rendered.contains("login-renders-the-form"), "case segment missing: {rendered}");
    assert!(rendered.contains("attempt_2"), "attempt segment missing: {rendered}");
    assert_eq!(slot.drain(), vec![rendered]);
}

#[tokio::test]
async fn retried_attempts_keep_their_captures_apart() {
    let temp = tempfile::tempdir().expect("tempdir");
    let factory = PortalFactory::new(config(), temp.path().join("captures"));

    let mut paths = Vec::new();
    for attempt in [1, 2] {
        let slot = AttemptArtifacts::labeled("auth.api", "login succeeds", attempt);
        let ctx = factory.build(&api_project(), slot).await.expect("context");
        paths.push(ctx.save_capture("transcript.json", b"[]").expect("capture"));
    }
    assert_ne!(paths[0], paths[1], "attempts must not share a capture directory");
    assert!(paths[0].is_file());
    assert!(paths[1].is_file());
}
