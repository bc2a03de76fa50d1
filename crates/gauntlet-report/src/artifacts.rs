// crates/gauntlet-report/src/artifacts.rs
// ============================================================================
// Module: Run Artifacts
// Description: Per-run artifact roots and deterministic JSON writing.
// Purpose: Give each case attempt a directory for transcripts and captures.
// Dependencies: serde, serde_jcs
// ============================================================================

//! ## Overview
//! Each run gets a timestamped root under the configured output
//! directory. Case attempts write transcripts, screenshots, and other
//! evidence into their own subdirectory so retries never overwrite each
//! other. JSON artifacts use canonical JCS serialization.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Run Artifacts
// ============================================================================

/// Artifact manager for a single run.
#[derive(Debug, Clone)]
pub struct RunArtifacts {
    /// Run root directory, created on construction.
    root: PathBuf,
}

impl RunArtifacts {
    /// Creates a timestamped run root under the output directory.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory cannot be created.
    pub fn create(output_dir: &Path) -> io::Result<Self> {
        let root = output_dir.join(format!("run_{}", now_millis()));
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
        })
    }

    /// Opens an existing directory as the run root.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory cannot be created.
    pub fn at(root: PathBuf) -> io::Result<Self> {
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
        })
    }

    /// Returns the run root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates and returns the directory for one case attempt.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory cannot be created.
    pub fn case_dir(&self, suite: &str, case: &str, attempt: u32) -> io::Result<PathBuf> {
        let dir = self
            .root
            .join(sanitize_component(suite))
            .join(sanitize_component(case))
            .join(format!("attempt_{attempt}"));
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Writes a JSON artifact using canonical JCS serialization.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization or the write fails.
    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> io::Result<PathBuf> {
        let path = self.root.join(name);
        let bytes = serde_jcs::to_vec(value).map_err(io::Error::other)?;
        fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Writes a text artifact with UTF-8 encoding.
    ///
    /// # Errors
    ///
    /// Returns an error when the write fails.
    pub fn write_text(&self, name: &str, value: &str) -> io::Result<PathBuf> {
        let path = self.root.join(name);
        fs::write(&path, value.as_bytes())?;
        Ok(path)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the current wall clock in milliseconds since the epoch.
fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

/// Maps a suite or case name onto a filesystem-safe path component.
fn sanitize_component(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '-' })
        .collect()
}
