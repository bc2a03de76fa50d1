// system-tests/src/lib.rs
// ============================================================================
// Module: Gauntlet System Tests Library
// Description: Shared configuration for the system-test binaries.
// Purpose: Provide typed environment settings reused across test suites.
// Dependencies: std
// ============================================================================

//! ## Overview
//! This crate hosts shared configuration used by the system-test binaries
//! in `system-tests/tests`. The tests themselves run the harness against
//! an in-process stub of the portal API.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
