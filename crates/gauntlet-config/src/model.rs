// crates/gauntlet-config/src/model.rs
// ============================================================================
// Module: Run Configuration
// Description: Resolved run parameters with documented, CI-sensitive defaults.
// Purpose: Produce one immutable RunConfig per run from a snapshot overlay.
// Dependencies: gauntlet-core, serde, thiserror, url
// ============================================================================

//! ## Overview
//! Defaults mirror the deployment the suites were written against: API on
//! port 8000, front end on 5173, WebDriver on 4444, a 30 second case
//! timeout and a 5 second expectation timeout. CI mode tightens the run to
//! one worker with two retries and adds the annotation reporter.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use gauntlet_core::Project;
use gauntlet_core::ProjectSet;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::env::EnvKey;
use crate::env::EnvSnapshot;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default API base URL.
const DEFAULT_API_URL: &str = "http://localhost:8000";
/// Default front-end base URL.
const DEFAULT_APP_URL: &str = "http://localhost:5173";
/// Default WebDriver endpoint.
const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";
/// Default per-case timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default per-expectation timeout used by polling waits.
const DEFAULT_EXPECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default artifact output directory.
const DEFAULT_OUTPUT_DIR: &str = "test-results";
/// Default report directory.
const DEFAULT_REPORT_DIR: &str = "gauntlet-report";
/// Retries applied in CI mode.
const CI_RETRIES: u32 = 2;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while resolving run configuration.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment value was empty or otherwise malformed.
    #[error("invalid environment value: {0}")]
    InvalidValue(String),
    /// A base URL failed to parse.
    #[error("{key} is not a valid url: {reason}")]
    InvalidUrl {
        /// Environment key holding the URL.
        key: &'static str,
        /// Parser-reported reason.
        reason: String,
    },
}

// ============================================================================
// SECTION: Reporter Selection
// ============================================================================

/// Reporter set enabled for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reporters {
    /// Human-readable per-case list on stdout.
    pub list: bool,
    /// Browsable HTML report linking artifacts.
    pub html: bool,
    /// Machine-readable annotations for CI logs.
    pub annotations: bool,
}

// ============================================================================
// SECTION: Run Configuration
// ============================================================================

/// Resolved, immutable run parameters.
///
/// # Invariants
/// - Created once at startup; resolution is pure given a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunConfig {
    /// API base URL for request-driver projects.
    pub api_url: String,
    /// Front-end base URL for browser projects.
    pub app_url: String,
    /// WebDriver endpoint for the page driver.
    pub webdriver_url: String,
    /// Whether the run executes in CI mode.
    pub ci: bool,
    /// Parallel worker count; 1 serializes the run.
    pub workers: usize,
    /// Additional attempts after a failure.
    pub retries: u32,
    /// Per-case timeout.
    #[serde(with = "seconds")]
    pub timeout: Duration,
    /// Per-expectation timeout for polling waits.
    #[serde(with = "seconds")]
    pub expect_timeout: Duration,
    /// Artifact output directory.
    pub output_dir: PathBuf,
    /// Report directory.
    pub report_dir: PathBuf,
    /// Enabled reporters.
    pub reporters: Reporters,
}

/// Serializes durations as whole seconds in the config echo artifact.
mod seconds {
    use std::time::Duration;

    use serde::Serializer;

    /// Serializes a duration as its whole-second count.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }
}

impl RunConfig {
    /// Resolves configuration from the current process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a value fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_snapshot(&EnvSnapshot::capture())
    }

    /// Resolves configuration from a captured snapshot. Pure and
    /// deterministic: equal snapshots produce equal configurations.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a value fails validation.
    pub fn from_snapshot(snapshot: &EnvSnapshot) -> Result<Self, ConfigError> {
        let api_url = resolve_url(snapshot, EnvKey::ApiUrl, DEFAULT_API_URL)?;
        let app_url = resolve_url(snapshot, EnvKey::AppUrl, DEFAULT_APP_URL)?;
        let webdriver_url = resolve_url(snapshot, EnvKey::WebDriverUrl, DEFAULT_WEBDRIVER_URL)?;
        let ci = parse_bool(snapshot, EnvKey::Ci)?;

        let workers = match read(snapshot, EnvKey::Workers)? {
            Some(raw) => parse_positive(EnvKey::Workers, raw)?,
            None if ci => 1,
            None => default_workers(),
        };
        let retries = match read(snapshot, EnvKey::Retries)? {
            Some(raw) => parse_non_negative(EnvKey::Retries, raw)?,
            None if ci => CI_RETRIES,
            None => 0,
        };
        let timeout = match read(snapshot, EnvKey::TimeoutSeconds)? {
            Some(raw) => parse_timeout_seconds(EnvKey::TimeoutSeconds, raw)?,
            None => DEFAULT_TIMEOUT,
        };
        let output_dir =
            read(snapshot, EnvKey::OutputDir)?.map_or_else(|| DEFAULT_OUTPUT_DIR.into(), PathBuf::from);
        let report_dir =
            read(snapshot, EnvKey::ReportDir)?.map_or_else(|| DEFAULT_REPORT_DIR.into(), PathBuf::from);

        Ok(Self {
            api_url,
            app_url,
            webdriver_url,
            ci,
            workers,
            retries,
            timeout,
            expect_timeout: DEFAULT_EXPECT_TIMEOUT,
            output_dir,
            report_dir,
            reporters: Reporters {
                list: true,
                html: true,
                annotations: ci,
            },
        })
    }
}

/// Builds the default project set for a resolved configuration.
///
/// Suites bind by suffix: `.services` and `.api` run against the API base
/// URL with the request driver; `.e2e` runs against the front end with a
/// browser session.
#[must_use]
pub fn default_projects(config: &RunConfig) -> ProjectSet {
    ProjectSet::new(vec![
        Project {
            name: "services".to_string(),
            suffix: ".services".to_string(),
            base_url: config.api_url.clone(),
            browser: false,
        },
        Project {
            name: "api".to_string(),
            suffix: ".api".to_string(),
            base_url: config.api_url.clone(),
            browser: false,
        },
        Project {
            name: "e2e".to_string(),
            suffix: ".e2e".to_string(),
            base_url: config.app_url.clone(),
            browser: true,
        },
    ])
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads a key from the snapshot, mapping empties into [`ConfigError`].
fn read(snapshot: &EnvSnapshot, key: EnvKey) -> Result<Option<&str>, ConfigError> {
    snapshot.get(key).map_err(ConfigError::InvalidValue)
}

/// Resolves and validates a base URL, trimming any trailing slash.
fn resolve_url(
    snapshot: &EnvSnapshot,
    key: EnvKey,
    default: &str,
) -> Result<String, ConfigError> {
    let raw = read(snapshot, key)?.unwrap_or(default);
    let parsed = Url::parse(raw).map_err(|err| ConfigError::InvalidUrl {
        key: key.as_str(),
        reason: err.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            key: key.as_str(),
            reason: format!("unsupported scheme {}", parsed.scheme()),
        });
    }
    Ok(raw.trim_end_matches('/').to_string())
}

/// Parses a boolean value with permissive literals.
fn parse_bool(snapshot: &EnvSnapshot, key: EnvKey) -> Result<bool, ConfigError> {
    let Some(raw) = read(snapshot, key)? else {
        return Ok(false);
    };
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        return Ok(true);
    }
    if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        return Ok(false);
    }
    Err(ConfigError::InvalidValue(format!(
        "{} must be 1, 0, true, or false",
        key.as_str()
    )))
}

/// Parses a positive integer.
fn parse_positive(key: EnvKey, raw: &str) -> Result<usize, ConfigError> {
    let value: usize = raw.trim().parse().map_err(|_| {
        ConfigError::InvalidValue(format!("{} must be a positive integer", key.as_str()))
    })?;
    if value == 0 {
        return Err(ConfigError::InvalidValue(format!(
            "{} must be greater than zero",
            key.as_str()
        )));
    }
    Ok(value)
}

/// Parses a positive timeout in whole seconds.
fn parse_timeout_seconds(key: EnvKey, raw: &str) -> Result<Duration, ConfigError> {
    let secs: u64 = raw.trim().parse().map_err(|_| {
        ConfigError::InvalidValue(format!(
            "{} must be a positive integer number of seconds",
            key.as_str()
        ))
    })?;
    if secs == 0 {
        return Err(ConfigError::InvalidValue(format!(
            "{} must be greater than zero",
            key.as_str()
        )));
    }
    Ok(Duration::from_secs(secs))
}

/// Parses a non-negative integer.
fn parse_non_negative(key: EnvKey, raw: &str) -> Result<u32, ConfigError> {
    raw.trim().parse().map_err(|_| {
        ConfigError::InvalidValue(format!("{} must be a non-negative integer", key.as_str()))
    })
}

/// Returns the default worker count outside CI.
fn default_workers() -> usize {
    std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
}
