// crates/gauntlet-suites/src/suites/search.rs
// ============================================================================
// Module: Search Suite
// Description: Contract cases for the full-text search endpoint.
// Purpose: Pin typed result shapes, fuzzy matching, and the auth gate.
// Dependencies: gauntlet-core, serde_json
// ============================================================================

//! ## Overview
//! Search runs against whatever the shared backend has indexed, so the
//! cases assert response shape rather than specific hits. Typed queries
//! must nest their results under the matching key in `data`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use gauntlet_core::Abort;
use gauntlet_core::Suite;
use gauntlet_core::TestCase;
use gauntlet_core::check;

use crate::context::PortalContext;
use crate::contract::Envelope;
use crate::guard;
use crate::portal::PortalClient;
use crate::portal::register_unique;

// ============================================================================
// SECTION: Setup
// ============================================================================

/// Registers an account and returns an authenticated client.
async fn authed_client(ctx: &PortalContext, prefix: &str) -> Result<PortalClient, Abort> {
    let client = ctx.portal();
    let user = register_unique(&client, prefix).await?;
    Ok(client.authed(&user.access_token))
}

// ============================================================================
// SECTION: Suite
// ============================================================================

/// Builds the search API suite.
pub fn suite() -> Suite<PortalContext> {
    Suite::new("search.api")
        .case(TestCase::new(
            "plain query returns a success envelope",
            |ctx: PortalContext| async move {
                let client = authed_client(&ctx, "search").await?;
                let response =
                    guard::reachable(client.search_raw("q=test").await, "portal api")?;
                check::status("search", 200, response.status())?;
                let envelope = Envelope::parse(&response)?;
                check::truthy("search succeeded", envelope.success)?;
                envelope.data()?;
                Ok(())
            },
        ))
        .case(TestCase::new(
            "document-typed query nests results under documents",
            |ctx: PortalContext| async move {
                let client = authed_client(&ctx, "searchdocs").await?;
                let response = guard::reachable(
                    client.search_raw("q=test&type=documents").await,
                    "portal api",
                )?;
                check::status("typed search", 200, response.status())?;
                let envelope = Envelope::parse(&response)?;
                let data = envelope.data()?;
                check::truthy("documents key present", data.get("documents").is_some())?;
                Ok(())
            },
        ))
        .case(TestCase::new(
            "subject-typed query nests results under subjects",
            |ctx: PortalContext| async move {
                let client = authed_client(&ctx, "searchsubj").await?;
                let response = guard::reachable(
                    client.search_raw("q=test&type=subjects").await,
                    "portal api",
                )?;
                check::status("typed search", 200, response.status())?;
                let envelope = Envelope::parse(&response)?;
                let data = envelope.data()?;
                check::truthy("subjects key present", data.get("subjects").is_some())?;
                Ok(())
            },
        ))
        .case(TestCase::new(
            "misspelled query still answers successfully",
            |ctx: PortalContext| async move {
                let client = authed_client(&ctx, "fuzzy").await?;
                let response =
                    guard::reachable(client.search_raw("q=documnet").await, "portal api")?;
                check::status("fuzzy search", 200, response.status())?;
                let envelope = Envelope::parse(&response)?;
                check::truthy("fuzzy search succeeded", envelope.success)?;
                Ok(())
            },
        ))
        .case(TestCase::new(
            "query results carry a pagination block",
            |ctx: PortalContext| async move {
                let client = authed_client(&ctx, "searchpage").await?;
                let response = guard::reachable(
                    client.search_raw("q=test&page=1&limit=5").await,
                    "portal api",
                )?;
                check::status("paginated search", 200, response.status())?;
                let envelope = Envelope::parse(&response)?;
                let pagination = envelope.pagination()?;
                check::eq("page echo", &1, &pagination.page)?;
                check::eq("limit echo", &5, &pagination.limit)?;
                Ok(())
            },
        ))
        .case(TestCase::new(
            "query without a token is rejected",
            |ctx: PortalContext| async move {
                let client = ctx.portal();
                let response =
                    guard::reachable(client.search_raw("q=test").await, "portal api")?;
                let response = guard::provisioned(response, "portal api")?;
                check::status("unauthenticated search", 401, response.status())?;
                Ok(())
            },
        ))
        .case(TestCase::new(
            "query without a term is rejected",
            |ctx: PortalContext| async move {
                let client = authed_client(&ctx, "noterm").await?;
                let response = guard::reachable(client.search_raw("").await, "portal api")?;
                check::status("missing query term", 400, response.status())?;
                let envelope = Envelope::parse(&response)?;
                check::truthy("rejection envelope", !envelope.success)?;
                Ok(())
            },
        ))
}
