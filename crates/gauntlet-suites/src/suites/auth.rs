// crates/gauntlet-suites/src/suites/auth.rs
// ============================================================================
// Module: Auth Suite
// Description: Contract cases for registration, login, and the session lookup.
// Purpose: Pin the auth API's success shapes and its rejection codes.
// Dependencies: gauntlet-core, serde_json
// ============================================================================

//! ## Overview
//! Every case registers its own unique account where one is needed, so
//! cases stay independent on a shared backend. Rejection cases assert
//! both the HTTP status and the envelope's error block. The seeded
//! student and admin cases skip when the deployment was provisioned
//! without the seed accounts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use gauntlet_core::Abort;
use gauntlet_core::Suite;
use gauntlet_core::TestCase;
use gauntlet_core::check;

use crate::context::PortalContext;
use crate::contract::Envelope;
use crate::contract::string_at;
use crate::fixtures::ADMIN;
use crate::fixtures::STUDENT;
use crate::fixtures::SampleUser;
use crate::fixtures::VALID_PASSWORD;
use crate::fixtures::unique_email;
use crate::guard;
use crate::portal::register_unique;

// ============================================================================
// SECTION: Setup
// ============================================================================

/// Signs a seeded account in and checks its session lookup echo.
///
/// Skips when the deployment rejects the credentials, since seed
/// accounts are provisioned out of band and may be absent.
async fn verify_seeded_account(ctx: &PortalContext, seed: SampleUser) -> Result<(), Abort> {
    let client = ctx.portal();
    let response =
        guard::reachable(client.login(seed.email, seed.password).await, "portal api")?;
    if response.status() == 401 {
        return Err(Abort::Skip(format!(
            "seed account {} is not provisioned",
            seed.email
        )));
    }
    check::status("seeded login", 200, response.status())?;
    let envelope = Envelope::parse(&response)?;
    let token = string_at(envelope.data()?, "/access_token")?;
    let lookup = guard::reachable(client.authed(&token).me().await, "portal api")?;
    check::status("me", 200, lookup.status())?;
    let lookup_envelope = Envelope::parse(&lookup)?;
    let account = lookup_envelope.data()?;
    check::eq("email echo", &seed.email, &string_at(account, "/email")?)?;
    check::eq("role echo", &seed.role, &string_at(account, "/role")?)?;
    Ok(())
}

// ============================================================================
// SECTION: Suite
// ============================================================================

/// Builds the auth API suite.
pub fn suite() -> Suite<PortalContext> {
    Suite::new("auth.api")
        .case(TestCase::new(
            "register creates a student account with tokens",
            |ctx: PortalContext| async move {
                let client = ctx.portal();
                let email = unique_email("register");
                let response = guard::reachable(
                    client.register(&email, VALID_PASSWORD, "Test User", "en").await,
                    "portal api",
                )?;
                let response = guard::provisioned(response, "portal api")?;
                check::status("register", 201, response.status())?;
                let envelope = Envelope::parse(&response)?;
                check::truthy("register succeeded", envelope.success)?;
                let data = envelope.data()?;
                check::eq("role", &"student", &string_at(data, "/user/role")?)?;
                check::truthy(
                    "access token non-empty",
                    !string_at(data, "/access_token")?.is_empty(),
                )?;
                check::truthy(
                    "refresh token non-empty",
                    !string_at(data, "/refresh_token")?.is_empty(),
                )?;
                ctx.save_transcript(&client)?;
                Ok(())
            },
        ))
        .case(TestCase::new(
            "register rejects a malformed email",
            |ctx: PortalContext| async move {
                let client = ctx.portal();
                let response = guard::reachable(
                    client.register("not-an-email", VALID_PASSWORD, "Test User", "en").await,
                    "portal api",
                )?;
                let response = guard::provisioned(response, "portal api")?;
                check::status("register invalid email", 400, response.status())?;
                let envelope = Envelope::parse(&response)?;
                check::truthy("rejection envelope", !envelope.success)?;
                check::eq(
                    "error code",
                    &Some("VALIDATION_ERROR"),
                    &envelope.error_code(),
                )?;
                Ok(())
            },
        ))
        .case(TestCase::new(
            "register rejects a short password",
            |ctx: PortalContext| async move {
                let client = ctx.portal();
                let email = unique_email("shortpw");
                let response = guard::reachable(
                    client.register(&email, "short", "Test User", "en").await,
                    "portal api",
                )?;
                let response = guard::provisioned(response, "portal api")?;
                check::status("register short password", 400, response.status())?;
                let envelope = Envelope::parse(&response)?;
                check::truthy("rejection envelope", !envelope.success)?;
                Ok(())
            },
        ))
        .case(TestCase::new(
            "register rejects a duplicate email",
            |ctx: PortalContext| async move {
                let client = ctx.portal();
                let user = register_unique(&client, "duplicate").await?;
                let response = guard::reachable(
                    client.register(&user.email, VALID_PASSWORD, "Test User", "en").await,
                    "portal api",
                )?;
                check::status("register duplicate", 409, response.status())?;
                let envelope = Envelope::parse(&response)?;
                check::truthy("rejection envelope", !envelope.success)?;
                Ok(())
            },
        ))
        .case(TestCase::new(
            "login succeeds with valid credentials",
            |ctx: PortalContext| async move {
                let client = ctx.portal();
                let user = register_unique(&client, "login").await?;
                let response = guard::reachable(
                    client.login(&user.email, VALID_PASSWORD).await,
                    "portal api",
                )?;
                check::status("login", 200, response.status())?;
                let envelope = Envelope::parse(&response)?;
                check::truthy("login succeeded", envelope.success)?;
                let data = envelope.data()?;
                check::truthy(
                    "access token non-empty",
                    !string_at(data, "/access_token")?.is_empty(),
                )?;
                Ok(())
            },
        ))
        .case(TestCase::new(
            "login rejects a wrong password",
            |ctx: PortalContext| async move {
                let client = ctx.portal();
                let user = register_unique(&client, "wrongpw").await?;
                let response = guard::reachable(
                    client.login(&user.email, "WrongPassword123!").await,
                    "portal api",
                )?;
                check::status("login wrong password", 401, response.status())?;
                let envelope = Envelope::parse(&response)?;
                check::truthy("rejection envelope", !envelope.success)?;
                Ok(())
            },
        ))
        .case(TestCase::new(
            "seeded student account signs in with the student role",
            |ctx: PortalContext| async move { verify_seeded_account(&ctx, STUDENT).await },
        ))
        .case(TestCase::new(
            "seeded admin account signs in with the admin role",
            |ctx: PortalContext| async move { verify_seeded_account(&ctx, ADMIN).await },
        ))
        .case(TestCase::new(
            "session lookup echoes the account email",
            |ctx: PortalContext| async move {
                let client = ctx.portal();
                let user = register_unique(&client, "me").await?;
                let response = guard::reachable(
                    client.authed(&user.access_token).me().await,
                    "portal api",
                )?;
                check::status("me", 200, response.status())?;
                let envelope = Envelope::parse(&response)?;
                let data = envelope.data()?;
                check::eq("email echo", &user.email.as_str(), &string_at(data, "/email")?)?;
                Ok(())
            },
        ))
        .case(TestCase::new(
            "session lookup rejects a missing token",
            |ctx: PortalContext| async move {
                let client = ctx.portal();
                let response = guard::reachable(client.me().await, "portal api")?;
                let response = guard::provisioned(response, "portal api")?;
                check::status("me without token", 401, response.status())?;
                Ok(())
            },
        ))
        .case(TestCase::new(
            "session lookup rejects an invalid token",
            |ctx: PortalContext| async move {
                let client = ctx.portal();
                let response = guard::reachable(
                    client.authed("invalid-token").me().await,
                    "portal api",
                )?;
                let response = guard::provisioned(response, "portal api")?;
                check::status("me invalid token", 401, response.status())?;
                Ok(())
            },
        ))
}
