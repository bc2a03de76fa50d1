// crates/gauntlet-core/src/project.rs
// ============================================================================
// Module: Projects
// Description: Named execution configurations bound to suites by suffix rule.
// Purpose: Give each suite a base URL and driver requirements at plan time.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`Project`] carries the per-project settings a suite executes under:
//! base URL and whether a browser session is required. Suites are assigned
//! by a name-suffix convention (for example `auth.api` matches the project
//! with suffix `.api`). A suite matching no project is excluded from the
//! plan and surfaced in the run summary rather than silently dropped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::suite::Suite;

// ============================================================================
// SECTION: Project
// ============================================================================

/// Execution configuration shared by the suites of one project.
///
/// # Invariants
/// - Immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Project name (for example `api`).
    pub name: String,
    /// Suite-name suffix that binds a suite to this project.
    pub suffix: String,
    /// Base URL requests in this project resolve against.
    pub base_url: String,
    /// Whether suites in this project drive a browser session.
    pub browser: bool,
}

// ============================================================================
// SECTION: Project Set
// ============================================================================

/// Ordered set of projects with suffix-based suite assignment.
///
/// # Invariants
/// - Assignment tries projects in declaration order; first match wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectSet {
    /// Projects in declaration order.
    projects: Vec<Project>,
}

/// A suite bound to the project it executes under.
#[derive(Debug, Clone)]
pub struct BoundSuite<C> {
    /// The suite to execute.
    pub suite: Suite<C>,
    /// The project configuration it executes under.
    pub project: Project,
}

/// Result of binding a set of suites against a project set.
#[derive(Debug)]
pub struct Plan<C> {
    /// Suites bound to a project, in discovery order.
    pub bound: Vec<BoundSuite<C>>,
    /// Names of suites that matched no project and were excluded.
    pub unmatched: Vec<String>,
}

impl ProjectSet {
    /// Creates a project set from projects in declaration order.
    #[must_use]
    pub const fn new(projects: Vec<Project>) -> Self {
        Self {
            projects,
        }
    }

    /// Returns the projects in declaration order.
    #[must_use]
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Returns the first project whose suffix matches the suite name.
    #[must_use]
    pub fn assign(&self, suite_name: &str) -> Option<&Project> {
        self.projects.iter().find(|project| suite_name.ends_with(&project.suffix))
    }

    /// Binds suites to projects, separating suites that match no project.
    #[must_use]
    pub fn plan<C>(&self, suites: Vec<Suite<C>>) -> Plan<C> {
        let mut bound = Vec::new();
        let mut unmatched = Vec::new();
        for suite in suites {
            match self.assign(suite.name()) {
                Some(project) => bound.push(BoundSuite {
                    project: project.clone(),
                    suite,
                }),
                None => unmatched.push(suite.name().to_string()),
            }
        }
        Plan {
            bound,
            unmatched,
        }
    }
}
