// crates/gauntlet-suites/src/suites/documents.rs
// ============================================================================
// Module: Documents Suite
// Description: Contract cases for document upload, listing, and download.
// Purpose: Pin the multipart upload rules and the byte-exact download path.
// Dependencies: gauntlet-core, serde_json
// ============================================================================

//! ## Overview
//! Each case registers its own account and picks the first provisioned
//! subject; when no subject exists the case skips rather than fails.
//! Uploaded files carry generated unique names so repeated runs against
//! a shared backend never collide; the static format samples are the
//! exception, since the portal keys documents by id rather than name.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use gauntlet_core::Suite;
use gauntlet_core::TestCase;
use gauntlet_core::check;
use serde_json::Value;

use crate::context::PortalContext;
use crate::contract::Envelope;
use crate::contract::string_at;
use crate::fixtures::DOCX;
use crate::fixtures::PDF;
use crate::fixtures::TXT;
use crate::fixtures::TestFile;
use crate::guard;
use crate::portal::PortalClient;
use crate::portal::RegisteredUser;
use crate::portal::first_subject_id;
use crate::portal::register_unique;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Per-call timeout for the oversize upload, which streams just past
/// the server's limit before the rejection arrives.
const OVERSIZE_UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);
/// Case timeout for the oversize upload: the request allowance plus
/// headroom for registration and subject lookup.
const OVERSIZE_CASE_TIMEOUT: Duration = Duration::from_secs(90);

// ============================================================================
// SECTION: Setup
// ============================================================================

/// Registers an account and resolves a subject to work in.
async fn authed_with_subject(
    ctx: &PortalContext,
    prefix: &str,
) -> Result<(PortalClient, RegisteredUser, String), gauntlet_core::Abort> {
    let client = ctx.portal();
    let user = register_unique(&client, prefix).await?;
    let authed = client.authed(&user.access_token);
    let subject_id = first_subject_id(&authed).await?;
    Ok((authed, user, subject_id))
}

// ============================================================================
// SECTION: Suite
// ============================================================================

/// Builds the documents API suite.
pub fn suite() -> Suite<PortalContext> {
    Suite::new("documents.api")
        .case(TestCase::new(
            "upload echoes the file name and mime type",
            |ctx: PortalContext| async move {
                let (client, _user, subject_id) = authed_with_subject(&ctx, "upload").await?;
                let file = TestFile::text("notes", "Lecture notes for the upload contract.");
                let response = guard::reachable(
                    client.upload_document(&subject_id, &file).await,
                    "portal api",
                )?;
                check::status("upload", 201, response.status())?;
                let envelope = Envelope::parse(&response)?;
                check::truthy("upload succeeded", envelope.success)?;
                let data = envelope.data()?;
                check::eq(
                    "original name echo",
                    &file.name.as_str(),
                    &string_at(data, "/original_name")?,
                )?;
                check::eq(
                    "mime type echo",
                    &file.mime_type.as_str(),
                    &string_at(data, "/mime_type")?,
                )?;
                Ok(())
            },
        ))
        .case(TestCase::new(
            "upload rejects a file over the size limit",
            |ctx: PortalContext| async move {
                let (client, _user, subject_id) = authed_with_subject(&ctx, "oversize").await?;
                let file = TestFile::oversize();
                let response = guard::reachable(
                    client
                        .upload_document_with_timeout(&subject_id, &file, OVERSIZE_UPLOAD_TIMEOUT)
                        .await,
                    "portal api",
                )?;
                check::status("oversize upload", 413, response.status())?;
                Ok(())
            },
        )
        .timeout(OVERSIZE_CASE_TIMEOUT))
        .case(TestCase::new(
            "upload rejects a disallowed file type",
            |ctx: PortalContext| async move {
                let (client, _user, subject_id) = authed_with_subject(&ctx, "badtype").await?;
                let file = TestFile::with_type(
                    "malicious.exe",
                    "application/x-msdownload",
                    b"MZ",
                );
                let response = guard::reachable(
                    client.upload_document(&subject_id, &file).await,
                    "portal api",
                )?;
                check::status("disallowed upload", 400, response.status())?;
                let envelope = Envelope::parse(&response)?;
                check::eq(
                    "error code",
                    &Some("INVALID_FILE_TYPE"),
                    &envelope.error_code(),
                )?;
                Ok(())
            },
        ))
        .case(TestCase::new(
            "upload accepts the common lecture formats",
            |ctx: PortalContext| async move {
                let (client, _user, subject_id) = authed_with_subject(&ctx, "formats").await?;
                for sample in [PDF, DOCX, TXT] {
                    let file = TestFile::with_type(
                        sample.name,
                        sample.mime_type,
                        sample.content.as_bytes(),
                    );
                    let response = guard::reachable(
                        client.upload_document(&subject_id, &file).await,
                        "portal api",
                    )?;
                    check::status(sample.name, 201, response.status())?;
                    let envelope = Envelope::parse(&response)?;
                    check::eq(
                        "mime type echo",
                        &sample.mime_type,
                        &string_at(envelope.data()?, "/mime_type")?,
                    )?;
                }
                Ok(())
            },
        ))
        .case(TestCase::new(
            "listing returns an array of documents",
            |ctx: PortalContext| async move {
                let (client, _user, subject_id) = authed_with_subject(&ctx, "list").await?;
                let response = guard::reachable(
                    client.list_documents(&subject_id, None).await,
                    "portal api",
                )?;
                check::status("list documents", 200, response.status())?;
                let envelope = Envelope::parse(&response)?;
                check::truthy("list succeeded", envelope.success)?;
                check::truthy("data is an array", envelope.data()?.is_array())?;
                Ok(())
            },
        ))
        .case(TestCase::new(
            "listing echoes the requested page and limit",
            |ctx: PortalContext| async move {
                let (client, _user, subject_id) = authed_with_subject(&ctx, "paging").await?;
                let response = guard::reachable(
                    client.list_documents(&subject_id, Some((1, 5))).await,
                    "portal api",
                )?;
                check::status("paginated list", 200, response.status())?;
                let envelope = Envelope::parse(&response)?;
                let pagination = envelope.pagination()?;
                check::eq("page echo", &1, &pagination.page)?;
                check::eq("limit echo", &5, &pagination.limit)?;
                Ok(())
            },
        ))
        .case(TestCase::new(
            "download returns the uploaded bytes unchanged",
            |ctx: PortalContext| async move {
                let (client, _user, subject_id) = authed_with_subject(&ctx, "roundtrip").await?;
                let file = TestFile::text("roundtrip", "Exact bytes expected back.");
                let upload = guard::reachable(
                    client.upload_document(&subject_id, &file).await,
                    "portal api",
                )?;
                check::status("upload", 201, upload.status())?;
                let envelope = Envelope::parse(&upload)?;
                let document_id = match envelope.data()?.get("id") {
                    Some(Value::String(id)) => id.clone(),
                    Some(other) => other.to_string(),
                    None => {
                        return Err(gauntlet_core::Failure::contract(
                            "upload response carries a document id",
                            "id present",
                            "id absent",
                        )
                        .into());
                    }
                };
                let download = guard::reachable(
                    client.download_document(&document_id).await,
                    "portal api",
                )?;
                check::status("download", 200, download.status())?;
                check::eq(
                    "downloaded byte length",
                    &file.content.len(),
                    &download.bytes().len(),
                )?;
                check::truthy(
                    "downloaded bytes equal the upload",
                    download.bytes() == file.content.as_slice(),
                )?;
                Ok(())
            },
        ))
}
