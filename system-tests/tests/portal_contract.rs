// system-tests/tests/portal_contract.rs
// ============================================================================
// Module: Portal Contract Test Binary
// Description: Aggregates the portal contract system-test suite.
// Purpose: Compile the stub portal helpers and contract cases together.
// Dependencies: gauntlet-drivers, gauntlet-suites, tokio
// ============================================================================

//! ## Overview
//! Test binary wrapper. The cases live in `suites/portal_contract.rs` and
//! the stub portal in `helpers/`.

mod helpers;

#[path = "suites/portal_contract.rs"]
mod portal_contract;
