// crates/gauntlet-suites/src/suites/infrastructure.rs
// ============================================================================
// Module: Infrastructure Suite
// Description: Smoke checks for the deployment's backing services.
// Purpose: Verify health endpoints before the functional suites run.
// Dependencies: gauntlet-core, gauntlet-drivers, serde_json
// ============================================================================

//! ## Overview
//! Checks each backing service at its well-known port on the API host:
//! aggregate API health, object-storage liveness, search-engine health
//! and version, and the text-extraction service. Services that are not
//! deployed skip their checks instead of failing them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use gauntlet_core::Abort;
use gauntlet_core::Suite;
use gauntlet_core::TestCase;
use gauntlet_core::check;
use serde_json::Value;

use crate::context::PortalContext;
use crate::guard;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Object-storage service port on the API host.
const OBJECT_STORAGE_PORT: u16 = 9000;
/// Search-engine service port on the API host.
const SEARCH_ENGINE_PORT: u16 = 7700;
/// Text-extraction service port on the API host.
const TEXT_EXTRACTION_PORT: u16 = 9998;
/// Sample text for the extraction round-trip.
const EXTRACTION_SAMPLE: &str = "Hello, this is a test document.";

// ============================================================================
// SECTION: Suite
// ============================================================================

/// Builds the infrastructure smoke suite.
pub fn suite() -> Suite<PortalContext> {
    Suite::new("infrastructure.services")
        .case(
            TestCase::new("api health endpoint answers", |ctx: PortalContext| async move {
                let response =
                    guard::reachable(ctx.portal().health().await, "portal api")?;
                if response.status() != 200 {
                    return Err(Abort::Skip("api not running".to_string()));
                }
                Ok(())
            })
            .tag("smoke"),
        )
        .case(
            TestCase::new("object storage reports liveness", |ctx: PortalContext| async move {
                let storage = ctx.service_driver(OBJECT_STORAGE_PORT)?;
                let response =
                    guard::reachable(storage.get("/minio/health/live").await, "object storage")?;
                check::truthy(
                    "object storage liveness",
                    (200..300).contains(&response.status()),
                )?;
                Ok(())
            })
            .tag("smoke"),
        )
        .case(
            TestCase::new("search engine reports available", |ctx: PortalContext| async move {
                let search = ctx.service_driver(SEARCH_ENGINE_PORT)?;
                let response =
                    guard::reachable(search.get("/health").await, "search engine")?;
                check::status("search engine health", 200, response.status())?;
                let body = response.json().map_err(|err| {
                    Abort::Skip(format!("search engine health unreadable: {err}"))
                })?;
                check::eq(
                    "search engine status",
                    &Value::String("available".to_string()),
                    body.get("status").unwrap_or(&Value::Null),
                )?;
                Ok(())
            })
            .tag("smoke"),
        )
        .case(
            TestCase::new("search engine reports a version", |ctx: PortalContext| async move {
                let search = ctx.service_driver(SEARCH_ENGINE_PORT)?;
                let response =
                    guard::reachable(search.get("/version").await, "search engine")?;
                check::status("search engine version", 200, response.status())?;
                let body = response.json().map_err(|err| {
                    Abort::Skip(format!("search engine version unreadable: {err}"))
                })?;
                check::truthy("pkgVersion present", body.get("pkgVersion").is_some())?;
                Ok(())
            })
            .tag("smoke"),
        )
        .case(
            TestCase::new("text extraction endpoint answers", |ctx: PortalContext| async move {
                let tika = ctx.service_driver(TEXT_EXTRACTION_PORT)?;
                let response = guard::reachable(tika.get("/tika").await, "text extraction")?;
                check::truthy(
                    "text extraction check",
                    (200..300).contains(&response.status()),
                )?;
                Ok(())
            })
            .tag("smoke"),
        )
        .case(
            TestCase::new(
                "text extraction round-trips plain text",
                |ctx: PortalContext| async move {
                    let tika = ctx.service_driver(TEXT_EXTRACTION_PORT)?;
                    let response = guard::reachable(
                        tika.put_bytes("/tika", "text/plain", EXTRACTION_SAMPLE.as_bytes())
                            .await,
                        "text extraction",
                    )?;
                    check::truthy(
                        "text extraction accepted the body",
                        (200..300).contains(&response.status()),
                    )?;
                    check::contains("extracted text", &response.text(), "Hello")?;
                    Ok(())
                },
            )
            .tag("smoke"),
        )
        .case(
            TestCase::new(
                "api reports every dependency healthy",
                |ctx: PortalContext| async move {
                    let response =
                        guard::reachable(ctx.portal().health().await, "portal api")?;
                    if response.status() != 200 {
                        return Err(Abort::Skip("api not running".to_string()));
                    }
                    let body = response.json().map_err(|err| {
                        Abort::Skip(format!("api health unreadable: {err}"))
                    })?;
                    for dependency in ["database", "cache", "storage", "search"] {
                        check::eq(
                            &format!("health key {dependency}"),
                            &Value::String("ok".to_string()),
                            body.get(dependency).unwrap_or(&Value::Null),
                        )?;
                    }
                    Ok(())
                },
            )
            .tag("smoke"),
        )
}
