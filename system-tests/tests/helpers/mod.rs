// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for the system-test binaries.
// Purpose: Host the in-process stub portal used across test suites.
// Dependencies: axum, tokio
// ============================================================================

//! ## Overview
//! Shared helpers for the system-test binaries. Each test binary includes
//! this module alongside its suite module.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod stub_portal;
