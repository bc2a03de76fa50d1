// system-tests/tests/harness.rs
// ============================================================================
// Module: Harness Test Binary
// Description: Aggregates the end-to-end harness system-test suite.
// Purpose: Compile the stub portal helpers and harness cases together.
// Dependencies: gauntlet-core, gauntlet-report, gauntlet-suites, tokio
// ============================================================================

//! ## Overview
//! Test binary wrapper. The cases live in `suites/harness.rs` and the
//! stub portal in `helpers/`.

mod helpers;

#[path = "suites/harness.rs"]
mod harness;
