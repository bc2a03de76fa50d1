// crates/gauntlet-suites/src/lib.rs
// ============================================================================
// Module: Gauntlet Suites
// Description: Test content for the study-portal deployment.
// Purpose: Define the wire contract, fixtures, and the five suites.
// Dependencies: gauntlet-config, gauntlet-core, gauntlet-drivers, rand, serde
// ============================================================================

//! ## Overview
//! Everything the harness knows about the system under test lives here:
//! the JSON envelope the portal API speaks, sample and generated
//! fixtures, a typed client over the request driver, the reachability
//! guard implementing the skip policy, and the suites themselves.
//! Invariants:
//! - Suites treat the deployment as a black box; assertions go through
//!   the wire contract only.
//! - Isolation on shared backends relies on generated unique
//!   identifiers, never on cleanup.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod context;
mod contract;
mod fixtures;
mod guard;
mod portal;
mod suites;

pub use context::PortalContext;
pub use context::PortalFactory;
pub use contract::ApiError;
pub use contract::Envelope;
pub use contract::Pagination;
pub use contract::string_at;
pub use fixtures::ADMIN;
pub use fixtures::DOCX;
pub use fixtures::PDF;
pub use fixtures::STUDENT;
pub use fixtures::SampleDocument;
pub use fixtures::SampleUser;
pub use fixtures::TXT;
pub use fixtures::TestFile;
pub use fixtures::UPLOAD_LIMIT_BYTES;
pub use fixtures::VALID_PASSWORD;
pub use fixtures::unique_email;
pub use guard::provisioned;
pub use guard::reachable;
pub use portal::PortalClient;
pub use portal::RegisteredUser;
pub use portal::first_subject_id;
pub use portal::register_unique;
pub use suites::all_suites;
