// crates/gauntlet-suites/src/suites/mod.rs
// ============================================================================
// Module: Suite Registry
// Description: The five suites run against a portal deployment.
// Purpose: Expose the full suite list in discovery order.
// Dependencies: gauntlet-core
// ============================================================================

//! ## Overview
//! Suite names end with the suffix that binds them to a project:
//! `.services` and `.api` run against the API base URL, `.e2e` against
//! the front end with a browser session.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod auth;
mod documents;
mod frontend;
mod infrastructure;
mod search;

use gauntlet_core::Suite;

use crate::context::PortalContext;

/// Returns every suite in discovery order.
#[must_use]
pub fn all_suites() -> Vec<Suite<PortalContext>> {
    vec![
        infrastructure::suite(),
        auth::suite(),
        documents::suite(),
        search::suite(),
        frontend::suite(),
    ]
}
