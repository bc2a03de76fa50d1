// crates/gauntlet-config/src/env.rs
// ============================================================================
// Module: Environment Keys
// Description: Canonical environment variables and snapshot capture.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid
//! silent misconfiguration. Invalid UTF-8 fails closed. A captured
//! [`EnvSnapshot`] keeps configuration resolution pure and testable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

// ============================================================================
// SECTION: Environment Keys
// ============================================================================

/// Environment keys for run configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvKey {
    /// API base URL for request-driver projects.
    ApiUrl,
    /// Front-end base URL for browser projects.
    AppUrl,
    /// WebDriver endpoint the page driver connects to.
    WebDriverUrl,
    /// CI mode toggle (`true`/`false` or `1`/`0`).
    Ci,
    /// Worker-count override (positive integer).
    Workers,
    /// Retry-count override (non-negative integer).
    Retries,
    /// Per-case timeout override in seconds (positive integer).
    TimeoutSeconds,
    /// Artifact output directory.
    OutputDir,
    /// Report output directory.
    ReportDir,
}

impl EnvKey {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ApiUrl => "GAUNTLET_API_URL",
            Self::AppUrl => "GAUNTLET_APP_URL",
            Self::WebDriverUrl => "GAUNTLET_WEBDRIVER_URL",
            Self::Ci => "GAUNTLET_CI",
            Self::Workers => "GAUNTLET_WORKERS",
            Self::Retries => "GAUNTLET_RETRIES",
            Self::TimeoutSeconds => "GAUNTLET_TIMEOUT_SEC",
            Self::OutputDir => "GAUNTLET_OUTPUT_DIR",
            Self::ReportDir => "GAUNTLET_REPORT_DIR",
        }
    }

    /// Returns the compatibility fallback honored for this key, if any.
    ///
    /// The original harness configured base URLs and CI mode through
    /// `API_URL`, `APP_URL`, and `CI`; those spellings keep working.
    #[must_use]
    pub const fn fallback(self) -> Option<&'static str> {
        match self {
            Self::ApiUrl => Some("API_URL"),
            Self::AppUrl => Some("APP_URL"),
            Self::Ci => Some("CI"),
            _ => None,
        }
    }
}

// ============================================================================
// SECTION: Snapshot
// ============================================================================

/// Immutable snapshot of the process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    /// Captured variables, name to value.
    values: BTreeMap<String, String>,
}

impl EnvSnapshot {
    /// Builds a snapshot from explicit pairs (used by tests and overlays).
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// Captures the current process environment.
    ///
    /// Variables with invalid UTF-8 names or values are dropped here and
    /// rejected later only if a canonical key is affected.
    #[must_use]
    pub fn capture() -> Self {
        Self {
            values: std::env::vars().collect(),
        }
    }

    /// Reads a key honoring its compatibility fallback, rejecting empties.
    ///
    /// # Errors
    ///
    /// Returns an error when the variable is set but empty or whitespace.
    pub fn get(&self, key: EnvKey) -> Result<Option<&str>, String> {
        let raw = self
            .values
            .get(key.as_str())
            .or_else(|| key.fallback().and_then(|name| self.values.get(name)));
        match raw {
            Some(value) if value.trim().is_empty() => {
                Err(format!("{} must not be empty", key.as_str()))
            }
            Some(value) => Ok(Some(value.as_str())),
            None => Ok(None),
        }
    }
}
