// crates/gauntlet-suites/src/fixtures.rs
// ============================================================================
// Module: Test Fixtures
// Description: Sample data and unique-identifier generation.
// Purpose: Isolate concurrent tests on a shared deployment via unique names.
// Dependencies: rand
// ============================================================================

//! ## Overview
//! The deployment under test is shared mutable state: registrations and
//! uploads persist across runs. Isolation comes entirely from generated
//! identifiers, a millisecond timestamp plus a random suffix, so
//! concurrent cases and repeated runs never collide.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use rand::Rng;
use rand::distributions::Alphanumeric;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Domain for generated test accounts.
const TEST_EMAIL_DOMAIN: &str = "test.entoo2.local";
/// Random suffix length in generated identifiers.
const SUFFIX_LEN: usize = 6;
/// Upload size limit enforced by the portal, in bytes.
pub const UPLOAD_LIMIT_BYTES: usize = 50 * 1024 * 1024;
/// Password satisfying the portal's complexity rules.
pub const VALID_PASSWORD: &str = "SecurePassword123!";

// ============================================================================
// SECTION: Sample Data
// ============================================================================

/// A static sample account.
#[derive(Debug, Clone, Copy)]
pub struct SampleUser {
    /// Account email.
    pub email: &'static str,
    /// Account password.
    pub password: &'static str,
    /// Display name shown in the portal.
    pub display_name: &'static str,
    /// Portal role.
    pub role: &'static str,
    /// Preferred interface language.
    pub language: &'static str,
}

/// Default student account used by read-only checks.
pub const STUDENT: SampleUser = SampleUser {
    email: "student@test.entoo2.local",
    password: "StudentPassword123!",
    display_name: "Test Student",
    role: "student",
    language: "en",
};

/// Default admin account.
pub const ADMIN: SampleUser = SampleUser {
    email: "admin@test.entoo2.local",
    password: "AdminPassword123!",
    display_name: "Test Admin",
    role: "admin",
    language: "cs",
};

/// A static sample document.
#[derive(Debug, Clone, Copy)]
pub struct SampleDocument {
    /// File name including extension.
    pub name: &'static str,
    /// MIME type sent with the upload.
    pub mime_type: &'static str,
    /// File content.
    pub content: &'static str,
}

/// Minimal PDF-flavored sample.
pub const PDF: SampleDocument = SampleDocument {
    name: "test-lecture.pdf",
    mime_type: "application/pdf",
    content: "%PDF-1.4 test content",
};

/// Minimal DOCX-flavored sample.
pub const DOCX: SampleDocument = SampleDocument {
    name: "test-notes.docx",
    mime_type: "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    content: "PK test docx content",
};

/// Plain-text sample.
pub const TXT: SampleDocument = SampleDocument {
    name: "test-summary.txt",
    mime_type: "text/plain",
    content: "This is a test summary of the lecture materials.",
};

// ============================================================================
// SECTION: Generators
// ============================================================================

/// Generates a globally unique test email.
///
/// Uniqueness combines a millisecond timestamp with a random suffix so
/// calls within the same millisecond still differ.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}-{}@{TEST_EMAIL_DOMAIN}", now_millis(), random_suffix())
}

/// An in-memory file prepared for upload.
#[derive(Debug, Clone)]
pub struct TestFile {
    /// File name including extension.
    pub name: String,
    /// MIME type sent with the upload.
    pub mime_type: String,
    /// File content.
    pub content: Vec<u8>,
}

impl TestFile {
    /// Builds a plain-text file with a unique name.
    #[must_use]
    pub fn text(prefix: &str, content: &str) -> Self {
        Self {
            name: format!("{prefix}-{}-{}.txt", now_millis(), random_suffix()),
            mime_type: "text/plain".to_string(),
            content: content.as_bytes().to_vec(),
        }
    }

    /// Builds a file with an explicit name, MIME type, and content.
    #[must_use]
    pub fn with_type(name: &str, mime_type: &str, content: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            content: content.to_vec(),
        }
    }

    /// Builds a text file one byte over the upload size limit.
    #[must_use]
    pub fn oversize() -> Self {
        Self {
            name: format!("oversize-{}-{}.txt", now_millis(), random_suffix()),
            mime_type: "text/plain".to_string(),
            content: vec![b'a'; UPLOAD_LIMIT_BYTES + 1],
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the current wall clock in milliseconds since the epoch.
fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

/// Returns a short random alphanumeric suffix.
fn random_suffix() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(char::from)
        .collect()
}
