// crates/gauntlet-config/src/lib.rs
// ============================================================================
// Module: Gauntlet Configuration
// Description: Run configuration resolved from environment snapshots.
// Purpose: Centralize env parsing with strict validation and pure resolution.
// Dependencies: gauntlet-core, serde, thiserror, url
// ============================================================================

//! ## Overview
//! All run parameters come from environment variables overlaid on documented
//! defaults. Resolution is pure given a captured snapshot: `load` reads the
//! process environment exactly once and hands the snapshot to the resolver.
//! Invalid UTF-8 and empty values fail closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;
mod model;

pub use env::EnvKey;
pub use env::EnvSnapshot;
pub use model::ConfigError;
pub use model::Reporters;
pub use model::RunConfig;
pub use model::default_projects;
