// crates/gauntlet-suites/src/suites/frontend.rs
// ============================================================================
// Module: Frontend Suite
// Description: Browser cases for the portal's login and register pages.
// Purpose: Verify the deployed front end renders its auth flows end to end.
// Dependencies: gauntlet-core, gauntlet-drivers
// ============================================================================

//! ## Overview
//! Each case opens a fresh browser session against the app base URL,
//! captures a viewport screenshot into the attempt's artifact slot, and
//! closes the session before returning. When no WebDriver endpoint is
//! deployed the whole suite skips.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use gauntlet_core::Suite;
use gauntlet_core::TestCase;
use gauntlet_core::check;

use crate::context::PortalContext;
use crate::fixtures::VALID_PASSWORD;
use crate::fixtures::unique_email;
use crate::guard;
use crate::portal::register_unique;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Settle time after submitting a form, before the page is inspected.
const FORM_SETTLE: Duration = Duration::from_millis(1500);

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Captures a screenshot and records it as an attempt artifact.
///
/// The W3C protocol captures the viewport only; content below the fold
/// is not included in the image.
async fn capture(
    ctx: &PortalContext,
    session: &gauntlet_drivers::PageSession,
    name: &str,
) -> Result<(), gauntlet_core::Abort> {
    let shot = guard::reachable(session.screenshot().await, "webdriver")?;
    ctx.save_capture(name, &shot)?;
    Ok(())
}

// ============================================================================
// SECTION: Suite
// ============================================================================

/// Builds the frontend e2e suite.
pub fn suite() -> Suite<PortalContext> {
    Suite::new("frontend.e2e")
        .case(TestCase::new(
            "home redirects an anonymous visitor to login",
            |ctx: PortalContext| async move {
                let mut session = ctx.browser().await?;
                guard::reachable(session.goto(&ctx.config.app_url).await, "webdriver")?;
                let current = guard::reachable(session.current_url().await, "webdriver")?;
                check::contains("post-redirect url", &current, "/login")?;
                capture(&ctx, &session, "01-homepage.png").await?;
                guard::reachable(session.close().await, "webdriver")?;
                Ok(())
            },
        ))
        .case(TestCase::new(
            "login page renders its credential form",
            |ctx: PortalContext| async move {
                let mut session = ctx.browser().await?;
                let url = format!("{}/login", ctx.config.app_url);
                guard::reachable(session.goto(&url).await, "webdriver")?;
                guard::reachable(session.find_css("input[type=email]").await, "webdriver")?;
                guard::reachable(session.find_css("input[type=password]").await, "webdriver")?;
                guard::reachable(session.find_css("button[type=submit]").await, "webdriver")?;
                capture(&ctx, &session, "02-login-page.png").await?;
                guard::reachable(session.close().await, "webdriver")?;
                Ok(())
            },
        ))
        .case(TestCase::new(
            "register page renders its signup form",
            |ctx: PortalContext| async move {
                let mut session = ctx.browser().await?;
                let url = format!("{}/register", ctx.config.app_url);
                guard::reachable(session.goto(&url).await, "webdriver")?;
                guard::reachable(session.find_css("input[type=email]").await, "webdriver")?;
                guard::reachable(session.find_css("input[type=password]").await, "webdriver")?;
                guard::reachable(session.find_css("button[type=submit]").await, "webdriver")?;
                capture(&ctx, &session, "03-register-page.png").await?;
                guard::reachable(session.close().await, "webdriver")?;
                Ok(())
            },
        ))
        .case(TestCase::new(
            "register form creates an account and leaves the page",
            |ctx: PortalContext| async move {
                let mut session = ctx.browser().await?;
                let url = format!("{}/register", ctx.config.app_url);
                guard::reachable(session.goto(&url).await, "webdriver")?;
                let email_field =
                    guard::reachable(session.find_css("input[type=email]").await, "webdriver")?;
                let password_field =
                    guard::reachable(session.find_css("input[type=password]").await, "webdriver")?;
                let submit =
                    guard::reachable(session.find_css("button[type=submit]").await, "webdriver")?;
                let email = unique_email("ui-register");
                guard::reachable(session.fill(&email_field, &email).await, "webdriver")?;
                guard::reachable(
                    session.fill(&password_field, VALID_PASSWORD).await,
                    "webdriver",
                )?;
                guard::reachable(session.click(&submit).await, "webdriver")?;
                session.pause(FORM_SETTLE).await;
                let current = guard::reachable(session.current_url().await, "webdriver")?;
                check::truthy("left the register page", !current.contains("/register"))?;
                capture(&ctx, &session, "04-after-register.png").await?;
                guard::reachable(session.close().await, "webdriver")?;
                Ok(())
            },
        ))
        .case(TestCase::new(
            "login form signs an existing account in",
            |ctx: PortalContext| async move {
                let user = register_unique(&ctx.portal(), "ui-login").await?;
                let mut session = ctx.browser().await?;
                let url = format!("{}/login", ctx.config.app_url);
                guard::reachable(session.goto(&url).await, "webdriver")?;
                let email_field =
                    guard::reachable(session.find_css("input[type=email]").await, "webdriver")?;
                let password_field =
                    guard::reachable(session.find_css("input[type=password]").await, "webdriver")?;
                let submit =
                    guard::reachable(session.find_css("button[type=submit]").await, "webdriver")?;
                guard::reachable(session.fill(&email_field, &user.email).await, "webdriver")?;
                guard::reachable(
                    session.fill(&password_field, VALID_PASSWORD).await,
                    "webdriver",
                )?;
                guard::reachable(session.click(&submit).await, "webdriver")?;
                session.pause(FORM_SETTLE).await;
                let current = guard::reachable(session.current_url().await, "webdriver")?;
                check::truthy("left the login page", !current.contains("/login"))?;
                capture(&ctx, &session, "05-after-login.png").await?;
                guard::reachable(session.close().await, "webdriver")?;
                Ok(())
            },
        ))
}
