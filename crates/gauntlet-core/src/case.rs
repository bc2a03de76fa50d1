// crates/gauntlet-core/src/case.rs
// ============================================================================
// Module: Test Cases
// Description: Declarative test cases generic over an injected context.
// Purpose: Model a case as a name, tags, and an async body receiving drivers.
// Dependencies: std
// ============================================================================

//! ## Overview
//! A [`TestCase`] is constructed at load time and immutable afterwards. The
//! body receives a freshly built context (drivers, artifact scope) and
//! returns `Result<(), Abort>`; the scheduler maps that into an outcome.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use crate::outcome::Abort;

// ============================================================================
// SECTION: Case Body
// ============================================================================

/// Boxed future returned by a case body.
pub type CaseFuture = Pin<Box<dyn Future<Output = Result<(), Abort>> + Send>>;

/// Shared, type-erased case body.
pub type CaseBody<C> = Arc<dyn Fn(C) -> CaseFuture + Send + Sync>;

// ============================================================================
// SECTION: Test Case
// ============================================================================

/// A named test case with tags and an async body.
///
/// # Invariants
/// - Immutable after construction.
/// - Executed once per run plus at most `retries` re-runs on failure.
#[derive(Clone)]
pub struct TestCase<C> {
    /// Case name, unique within its suite.
    name: String,
    /// Free-form tags (for example `smoke`).
    tags: Vec<String>,
    /// Whether the case demands an otherwise-empty, single-worker run.
    exclusive: bool,
    /// Per-attempt timeout replacing the run-wide default when set.
    timeout: Option<Duration>,
    /// The async body invoked with a fresh context per attempt.
    body: CaseBody<C>,
}

impl<C> TestCase<C> {
    /// Creates a case from a name and an async body.
    pub fn new<F, Fut>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(C) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), Abort>> + Send + 'static,
    {
        Self {
            name: name.into(),
            tags: Vec::new(),
            exclusive: false,
            timeout: None,
            body: Arc::new(move |ctx| Box::pin(body(ctx))),
        }
    }

    /// Adds a tag to the case.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Marks the case as requiring an isolated run.
    #[must_use]
    pub const fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }

    /// Replaces the run-wide attempt timeout for this case, for bodies
    /// that legitimately outlive the default, such as limit-probing
    /// uploads.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the case name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the case tags.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Returns true when the case carries the given tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|candidate| candidate == tag)
    }

    /// Returns true when the case demands an isolated run.
    #[must_use]
    pub const fn is_exclusive(&self) -> bool {
        self.exclusive
    }

    /// Returns the per-case timeout, when one was declared.
    #[must_use]
    pub const fn timeout_override(&self) -> Option<Duration> {
        self.timeout
    }

    /// Invokes the body with a context.
    pub fn run(&self, ctx: C) -> CaseFuture {
        (self.body)(ctx)
    }
}

impl<C> fmt::Debug for TestCase<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .field("exclusive", &self.exclusive)
            .finish_non_exhaustive()
    }
}
