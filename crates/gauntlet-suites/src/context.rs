// crates/gauntlet-suites/src/context.rs
// ============================================================================
// Module: Portal Context
// Description: Per-attempt context and its factory.
// Purpose: Give each case fresh drivers and an isolated capture directory.
// Dependencies: gauntlet-config, gauntlet-core, gauntlet-drivers,
//   gauntlet-report, url
// ============================================================================

//! ## Overview
//! One context per case attempt: a request driver bound to the project's
//! base URL, lazy access to a browser session for e2e cases, and a
//! capture directory wired to the attempt's artifact slot. Captures land
//! under `<root>/<suite>/<case>/attempt_N`, so retries never overwrite
//! each other and the tree stays browsable by case name. Nothing is
//! shared between attempts, so a retried case starts clean.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use gauntlet_config::RunConfig;
use gauntlet_core::Abort;
use gauntlet_core::AttemptArtifacts;
use gauntlet_core::ContextFactory;
use gauntlet_core::Failure;
use gauntlet_core::Project;
use gauntlet_core::scheduler::BoxFuture;
use gauntlet_drivers::PageDriver;
use gauntlet_drivers::PageSession;
use gauntlet_drivers::RequestDriver;
use gauntlet_report::RunArtifacts;
use url::Url;

use crate::guard;
use crate::portal::PortalClient;

// ============================================================================
// SECTION: Portal Context
// ============================================================================

/// Context injected into every case attempt.
#[derive(Debug, Clone)]
pub struct PortalContext {
    /// Resolved run configuration.
    pub config: RunConfig,
    /// Project the case executes under.
    pub project: Project,
    /// Artifact slot for this attempt.
    pub artifacts: AttemptArtifacts,
    /// Root under which per-case capture directories are created.
    capture_root: PathBuf,
    /// Request driver bound to the portal API.
    api: RequestDriver,
}

impl PortalContext {
    /// Returns a typed portal client.
    #[must_use]
    pub fn portal(&self) -> PortalClient {
        PortalClient::new(self.api.clone())
    }

    /// Returns a driver for an infrastructure service reached at a
    /// well-known port on the API host.
    ///
    /// # Errors
    ///
    /// Returns `Abort::Fail` when the API base URL cannot be rebased.
    pub fn service_driver(&self, port: u16) -> Result<RequestDriver, Abort> {
        let mut url = Url::parse(&self.config.api_url).map_err(|err| {
            Abort::Fail(Failure::driver(format!("api url unparseable: {err}")))
        })?;
        url.set_port(Some(port)).map_err(|()| {
            Abort::Fail(Failure::driver("api url does not accept a port".to_string()))
        })?;
        let base = url.as_str().trim_end_matches('/').to_string();
        RequestDriver::new(base, self.config.expect_timeout)
            .map_err(|err| Abort::Fail(Failure::driver(err.to_string())))
    }

    /// Opens a fresh browser session against the WebDriver endpoint,
    /// skipping when no browser service is deployed.
    ///
    /// # Errors
    ///
    /// Returns `Abort::Skip` when the endpoint is unreachable and
    /// `Abort::Fail` when the session cannot be established.
    pub async fn browser(&self) -> Result<PageSession, Abort> {
        let driver = PageDriver::new(
            &self.config.webdriver_url,
            self.config.timeout,
            self.config.expect_timeout,
        )
        .map_err(|err| Abort::Fail(Failure::driver(err.to_string())))?;
        guard::reachable(driver.connect().await, "webdriver")
    }

    /// Persists a capture into the attempt's per-case directory and
    /// registers it on the attempt's artifact slot.
    ///
    /// # Errors
    ///
    /// Returns `Abort::Fail` when the file cannot be written.
    pub fn save_capture(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, Abort> {
        let captures = RunArtifacts::at(self.capture_root.clone()).map_err(|err| {
            Abort::Fail(Failure::driver(format!("capture root unavailable: {err}")))
        })?;
        let dir = captures
            .case_dir(
                self.artifacts.suite(),
                self.artifacts.case_name(),
                self.artifacts.attempt(),
            )
            .map_err(|err| {
                Abort::Fail(Failure::driver(format!("capture dir unavailable: {err}")))
            })?;
        let path = dir.join(name);
        std::fs::write(&path, bytes).map_err(|err| {
            Abort::Fail(Failure::driver(format!("capture write failed: {err}")))
        })?;
        self.artifacts.record(path.to_string_lossy().into_owned());
        Ok(path)
    }

    /// Persists the API transcript for this attempt.
    ///
    /// # Errors
    ///
    /// Returns `Abort::Fail` when serialization or the write fails.
    pub fn save_transcript(&self, client: &PortalClient) -> Result<PathBuf, Abort> {
        let transcript = client.driver().transcript();
        let body = serde_json::to_vec_pretty(&transcript).map_err(|err| {
            Abort::Fail(Failure::driver(format!("transcript serialization failed: {err}")))
        })?;
        self.save_capture("transcript.json", &body)
    }
}

// ============================================================================
// SECTION: Factory
// ============================================================================

/// Builds one [`PortalContext`] per case attempt.
#[derive(Debug)]
pub struct PortalFactory {
    /// Resolved run configuration shared by every context.
    config: RunConfig,
    /// Root for per-case capture directories.
    capture_root: PathBuf,
}

impl PortalFactory {
    /// Creates a factory writing captures under the given root.
    #[must_use]
    pub fn new(config: RunConfig, capture_root: PathBuf) -> Self {
        Self {
            config,
            capture_root,
        }
    }
}

impl ContextFactory<PortalContext> for PortalFactory {
    fn build(
        &self,
        project: &Project,
        artifacts: AttemptArtifacts,
    ) -> BoxFuture<Result<PortalContext, String>> {
        let config = self.config.clone();
        let project = project.clone();
        let capture_root = self.capture_root.clone();
        Box::pin(async move {
            let api = build_api_driver(&config, config.timeout)?;
            Ok(PortalContext {
                config,
                project,
                artifacts,
                capture_root,
                api,
            })
        })
    }
}

/// Builds the request driver for the portal API.
fn build_api_driver(config: &RunConfig, timeout: Duration) -> Result<RequestDriver, String> {
    RequestDriver::new(config.api_url.clone(), timeout).map_err(|err| err.to_string())
}
