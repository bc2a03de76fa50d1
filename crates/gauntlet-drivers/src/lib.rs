// crates/gauntlet-drivers/src/lib.rs
// ============================================================================
// Module: Gauntlet Drivers
// Description: HTTP request driver and WebDriver page driver.
// Purpose: Give test bodies uniform access to the deployment under test.
// Dependencies: base64, gauntlet-core, reqwest, serde, thiserror, tokio
// ============================================================================

//! ## Overview
//! Drivers are the only components that touch the network. The request
//! driver wraps an HTTP client with transcript capture and bounded retries
//! for transient send failures; the page driver speaks the W3C WebDriver
//! wire protocol to a remote browser session. Both classify failures so
//! callers can distinguish an unreachable deployment from a broken one.
//! Invariants:
//! - Every request and response is recorded in the transcript.
//! - Transient connection failures are retried with bounded backoff.
//! - Unreachable targets surface as `DriverError::Unreachable`, never as
//!   a contract failure.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod error;
mod page;
mod request;

pub use error::DriverError;
pub use page::ElementRef;
pub use page::PageDriver;
pub use page::PageSession;
pub use request::ApiResponse;
pub use request::RequestDriver;
pub use request::TranscriptEntry;
pub use request::UploadPart;
