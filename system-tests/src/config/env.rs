// system-tests/src/config/env.rs
// ============================================================================
// Module: System Test Environment
// Description: Environment-backed configuration for system tests.
// Purpose: Centralize env parsing with strict validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid
//! silent misconfiguration. Invalid UTF-8 fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for system-test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemTestEnv {
    /// Optional timeout override in seconds (positive integer).
    TimeoutSeconds,
    /// Keep run artifacts after a passing test (`true`/`false` or `1`/`0`).
    KeepArtifacts,
}

impl SystemTestEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TimeoutSeconds => "GAUNTLET_SYSTEM_TEST_TIMEOUT_SEC",
            Self::KeepArtifacts => "GAUNTLET_SYSTEM_TEST_KEEP_ARTIFACTS",
        }
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed system-test configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemTestConfig {
    /// Optional timeout override; acts as a minimum on requested timeouts.
    pub timeout: Option<Duration>,
    /// Keep run artifacts after a passing test.
    pub keep_artifacts: bool,
}

impl SystemTestConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when an environment value is not valid UTF-8, is
    /// empty, or fails validation.
    pub fn load() -> Result<Self, String> {
        let timeout = match read_env_nonempty(SystemTestEnv::TimeoutSeconds.as_str())? {
            Some(raw) => Some(parse_timeout_secs(SystemTestEnv::TimeoutSeconds.as_str(), &raw)?),
            None => None,
        };
        let keep_artifacts = match read_env_nonempty(SystemTestEnv::KeepArtifacts.as_str())? {
            Some(raw) => parse_bool(SystemTestEnv::KeepArtifacts.as_str(), &raw)?,
            None => false,
        };
        Ok(Self {
            timeout,
            keep_artifacts,
        })
    }

    /// Returns the effective timeout for a requested duration; the
    /// environment override acts as a minimum, never a shortening.
    #[must_use]
    pub fn effective_timeout(&self, requested: Duration) -> Duration {
        self.timeout.map_or(requested, |floor| requested.max(floor))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable, rejecting invalid UTF-8 and empties.
fn read_env_nonempty(name: &str) -> Result<Option<String>, String> {
    match std::env::var(name) {
        Ok(value) if value.trim().is_empty() => Err(format!("{name} must not be empty")),
        Ok(value) => Ok(Some(value)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => Err(format!("{name} is not valid UTF-8")),
    }
}

/// Parses a positive timeout in whole seconds.
fn parse_timeout_secs(name: &str, raw: &str) -> Result<Duration, String> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("{name} must be a positive integer number of seconds"))?;
    if secs == 0 {
        return Err(format!("{name} must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}

/// Parses a boolean with permissive literals.
fn parse_bool(name: &str, raw: &str) -> Result<bool, String> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        return Ok(true);
    }
    if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        return Ok(false);
    }
    Err(format!("{name} must be 1, 0, true, or false"))
}
