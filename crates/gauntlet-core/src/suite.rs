// crates/gauntlet-core/src/suite.rs
// ============================================================================
// Module: Suites
// Description: Ordered groups of cases sharing one project configuration.
// Purpose: Model the unit the scheduler distributes across workers.
// Dependencies: std
// ============================================================================

//! ## Overview
//! A [`Suite`] is a named, ordered collection of cases. Suites are the unit
//! of parallel distribution; the cases inside one suite always execute
//! sequentially in discovery order on a single worker.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use crate::case::TestCase;

// ============================================================================
// SECTION: Suite
// ============================================================================

/// A named group of cases bound to exactly one project at plan time.
///
/// # Invariants
/// - Case order is preserved from construction through execution.
#[derive(Clone)]
pub struct Suite<C> {
    /// Suite name; the project-binding suffix rule matches against it.
    name: String,
    /// Cases in discovery order.
    cases: Vec<TestCase<C>>,
}

impl<C> Suite<C> {
    /// Creates an empty suite.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cases: Vec::new(),
        }
    }

    /// Appends a case, preserving discovery order.
    #[must_use]
    pub fn case(mut self, case: TestCase<C>) -> Self {
        self.cases.push(case);
        self
    }

    /// Returns the suite name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the cases in discovery order.
    #[must_use]
    pub fn cases(&self) -> &[TestCase<C>] {
        &self.cases
    }

    /// Returns the number of cases in the suite.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Returns true when the suite has no cases.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Retains only cases matching the predicate, preserving order.
    #[must_use]
    pub fn filter(mut self, predicate: impl Fn(&TestCase<C>) -> bool) -> Self {
        self.cases.retain(|case| predicate(case));
        self
    }
}

impl<C> fmt::Debug for Suite<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Suite")
            .field("name", &self.name)
            .field("cases", &self.cases.len())
            .finish()
    }
}
