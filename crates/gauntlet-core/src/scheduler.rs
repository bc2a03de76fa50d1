// crates/gauntlet-core/src/scheduler.rs
// ============================================================================
// Module: Execution Scheduler
// Description: Worker-pool scheduler with retries, timeouts, and misuse guard.
// Purpose: Execute bound suites under configured parallelism and stream results.
// Dependencies: tokio, thiserror
// ============================================================================

//! ## Overview
//! Suites are the unit of distribution: workers pull whole suites from a
//! shared queue and run their cases sequentially in discovery order. Across
//! workers there is no ordering guarantee. Each attempt receives a freshly
//! built context; nothing carries over from an aborted attempt.
//! Invariants:
//! - A skip is never retried; only failed attempts are.
//! - The exclusivity misuse guard aborts before any case executes.
//! - Results stream to the sink as each case completes, so a crash mid-run
//!   still leaves records for all completed cases.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use thiserror::Error;
use tokio::task::JoinSet;
use tokio::time::timeout;

use crate::outcome::Failure;
use crate::outcome::Outcome;
use crate::project::BoundSuite;
use crate::project::Plan;
use crate::project::Project;
use crate::record::AttemptRecord;
use crate::record::CaseRecord;
use crate::record::RunSummary;
use crate::suite::Suite;

// ============================================================================
// SECTION: Run Options
// ============================================================================

/// Scheduler knobs resolved from the run configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Number of parallel workers; 1 serializes the whole run.
    pub workers: usize,
    /// Additional attempts after a failed one.
    pub retries: u32,
    /// Default per-attempt timeout; a case-declared timeout replaces it.
    pub case_timeout: Duration,
}

impl RunOptions {
    /// Creates options with validation-friendly floors applied.
    #[must_use]
    pub const fn new(workers: usize, retries: u32, case_timeout: Duration) -> Self {
        Self {
            workers: if workers == 0 { 1 } else { workers },
            retries,
            case_timeout,
        }
    }
}

// ============================================================================
// SECTION: Fatal Errors
// ============================================================================

/// Run-aborting harness misuse, distinct from per-case failures.
///
/// # Invariants
/// - Raised before any case executes; never as a recoverable condition.
#[derive(Debug, Error)]
pub enum FatalError {
    /// An exclusive case was planned alongside other cases in a parallel run.
    #[error(
        "case `{case}` in suite `{suite}` is marked exclusive but the plan \
         holds {total} cases across {workers} workers; run it alone or with \
         a single worker"
    )]
    ExclusiveConflict {
        /// Owning suite of the exclusive case.
        suite: String,
        /// Name of the exclusive case.
        case: String,
        /// Total planned cases.
        total: usize,
        /// Configured worker count.
        workers: usize,
    },
    /// A worker task could not be joined.
    #[error("worker join failure: {0}")]
    WorkerJoin(String),
}

// ============================================================================
// SECTION: Capability Traits
// ============================================================================

/// Boxed future used by the object-safe factory and sink traits.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Shared slot collecting artifact paths produced during one attempt.
///
/// The scheduler creates one slot per attempt and hands it to the factory;
/// contexts keep a clone so case bodies can register the files they write.
/// The slot also carries the attempt's identity so factories can place
/// captures under a browsable per-case directory.
#[derive(Debug, Clone, Default)]
pub struct AttemptArtifacts {
    /// Owning suite name; empty for ad-hoc slots.
    suite: Arc<str>,
    /// Case name; empty for ad-hoc slots.
    case: Arc<str>,
    /// 1-based attempt index; 0 for ad-hoc slots.
    attempt: u32,
    /// Registered paths in registration order.
    paths: Arc<Mutex<Vec<String>>>,
}

impl AttemptArtifacts {
    /// Creates an empty, unlabeled slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a slot carrying the attempt's identity.
    #[must_use]
    pub fn labeled(suite: &str, case: &str, attempt: u32) -> Self {
        Self {
            suite: Arc::from(suite),
            case: Arc::from(case),
            attempt,
            paths: Arc::default(),
        }
    }

    /// Returns the owning suite name.
    #[must_use]
    pub fn suite(&self) -> &str {
        &self.suite
    }

    /// Returns the case name.
    #[must_use]
    pub fn case_name(&self) -> &str {
        &self.case
    }

    /// Returns the 1-based attempt index.
    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Registers one artifact path.
    pub fn record(&self, path: impl Into<String>) {
        if let Ok(mut guard) = self.paths.lock() {
            guard.push(path.into());
        }
    }

    /// Returns the registered paths, leaving the slot empty.
    #[must_use]
    pub fn drain(&self) -> Vec<String> {
        self.paths.lock().map_or_else(|_| Vec::new(), |mut guard| std::mem::take(&mut *guard))
    }
}

/// Builds one fresh context per case attempt.
///
/// # Invariants
/// - Each call returns an isolated context; no cookies, tokens, or sessions
///   leak between attempts or cases.
pub trait ContextFactory<C>: Send + Sync {
    /// Builds a context for a case executing under `project`. The artifact
    /// slot belongs to the attempt; contexts keep a clone of it.
    fn build(&self, project: &Project, artifacts: AttemptArtifacts)
    -> BoxFuture<Result<C, String>>;
}

impl<C, F> ContextFactory<C> for F
where
    F: Fn(&Project, AttemptArtifacts) -> BoxFuture<Result<C, String>> + Send + Sync,
{
    fn build(
        &self,
        project: &Project,
        artifacts: AttemptArtifacts,
    ) -> BoxFuture<Result<C, String>> {
        self(project, artifacts)
    }
}

/// Receives completed case records as execution proceeds.
pub trait ResultSink: Send + Sync {
    /// Called once per case, immediately after its final attempt.
    fn on_case(&self, record: &CaseRecord);

    /// Called once after all suites finish.
    fn on_run_end(&self, summary: &RunSummary);
}

// ============================================================================
// SECTION: Scheduler
// ============================================================================

/// Worker-pool scheduler for bound suites.
pub struct Scheduler<C> {
    /// Factory building one context per attempt.
    factory: Arc<dyn ContextFactory<C>>,
    /// Sink receiving completed records.
    sink: Arc<dyn ResultSink>,
}

impl<C: Send + 'static> Scheduler<C> {
    /// Creates a scheduler from a context factory and a result sink.
    pub fn new(factory: Arc<dyn ContextFactory<C>>, sink: Arc<dyn ResultSink>) -> Self {
        Self {
            factory,
            sink,
        }
    }

    /// Executes the plan and returns the aggregated summary.
    ///
    /// # Errors
    ///
    /// Returns a [`FatalError`] for harness misuse (exclusivity conflict) or
    /// when a worker task cannot be joined.
    pub async fn run(
        &self,
        plan: Plan<C>,
        options: RunOptions,
    ) -> Result<RunSummary, FatalError> {
        let started = Instant::now();
        let total: usize = plan.bound.iter().map(|unit| unit.suite.len()).sum();
        enforce_exclusivity(&plan, total, options.workers)?;

        let queue: Arc<Mutex<VecDeque<BoundSuite<C>>>> =
            Arc::new(Mutex::new(plan.bound.into_iter().collect()));
        let records: Arc<Mutex<Vec<CaseRecord>>> = Arc::new(Mutex::new(Vec::new()));
        let worker_count = options.workers.min(total.max(1));

        let mut joins = JoinSet::new();
        for _ in 0..worker_count {
            let queue = Arc::clone(&queue);
            let records = Arc::clone(&records);
            let factory = Arc::clone(&self.factory);
            let sink = Arc::clone(&self.sink);
            joins.spawn(async move {
                loop {
                    let unit = {
                        let Ok(mut guard) = queue.lock() else {
                            return;
                        };
                        guard.pop_front()
                    };
                    let Some(unit) = unit else {
                        return;
                    };
                    run_suite(&unit.suite, &unit.project, &*factory, &*sink, &records, options)
                        .await;
                }
            });
        }
        while let Some(joined) = joins.join_next().await {
            joined.map_err(|err| FatalError::WorkerJoin(err.to_string()))?;
        }

        let mut summary = RunSummary {
            unmatched_suites: plan.unmatched,
            ..RunSummary::default()
        };
        if let Ok(guard) = records.lock() {
            for record in guard.iter() {
                summary.absorb(record);
            }
        }
        summary.duration_ms = duration_millis(started.elapsed());
        self.sink.on_run_end(&summary);
        Ok(summary)
    }
}

/// Rejects plans that pair an exclusive case with siblings in a parallel run.
fn enforce_exclusivity<C>(plan: &Plan<C>, total: usize, workers: usize) -> Result<(), FatalError> {
    if total <= 1 || workers <= 1 {
        return Ok(());
    }
    for unit in &plan.bound {
        if let Some(case) = unit.suite.cases().iter().find(|case| case.is_exclusive()) {
            return Err(FatalError::ExclusiveConflict {
                suite: unit.suite.name().to_string(),
                case: case.name().to_string(),
                total,
                workers,
            });
        }
    }
    Ok(())
}

/// Runs one suite's cases sequentially in discovery order.
async fn run_suite<C: Send + 'static>(
    suite: &Suite<C>,
    project: &Project,
    factory: &dyn ContextFactory<C>,
    sink: &dyn ResultSink,
    records: &Mutex<Vec<CaseRecord>>,
    options: RunOptions,
) {
    for case in suite.cases() {
        let mut attempts = Vec::new();
        // A case-level timeout replaces the run-wide default.
        let attempt_timeout = case.timeout_override().unwrap_or(options.case_timeout);
        for attempt_index in 1..=options.retries.saturating_add(1) {
            let started = Instant::now();
            let slot = AttemptArtifacts::labeled(suite.name(), case.name(), attempt_index);
            let outcome =
                run_attempt(case, project, factory, slot.clone(), attempt_timeout).await;
            let retryable = outcome.is_failed();
            attempts.push(AttemptRecord {
                index: attempt_index,
                outcome,
                duration_ms: duration_millis(started.elapsed()),
                artifacts: slot.drain(),
            });
            if !retryable {
                break;
            }
        }
        let Some(record) = CaseRecord::from_attempts(
            suite.name(),
            case.name(),
            project.name.clone(),
            case.tags().to_vec(),
            attempts,
        ) else {
            continue;
        };
        sink.on_case(&record);
        if let Ok(mut guard) = records.lock() {
            guard.push(record);
        }
    }
}

/// Runs a single attempt with a fresh context under the attempt timeout.
async fn run_attempt<C: Send + 'static>(
    case: &crate::case::TestCase<C>,
    project: &Project,
    factory: &dyn ContextFactory<C>,
    artifacts: AttemptArtifacts,
    case_timeout: Duration,
) -> Outcome {
    let built = match timeout(case_timeout, factory.build(project, artifacts)).await {
        Ok(Ok(ctx)) => ctx,
        Ok(Err(err)) => {
            return Outcome::Failed {
                failure: Failure::driver(format!("context build failed: {err}")),
            };
        }
        Err(_) => {
            return Outcome::Failed {
                failure: Failure::timeout(format!(
                    "context build exceeded {}ms",
                    case_timeout.as_millis()
                )),
            };
        }
    };
    // Each attempt runs in its own task so a panicking body cannot take the
    // worker down with it.
    let future = case.run(built);
    let mut handle = tokio::spawn(async move { future.await });
    match timeout(case_timeout, &mut handle).await {
        Ok(Ok(body_result)) => Outcome::from_body(body_result),
        Ok(Err(join_err)) => Outcome::Failed {
            failure: Failure::driver(format!("case body panicked: {join_err}")),
        },
        Err(_) => {
            // Abort the outstanding operation; the retry gets a fresh context.
            handle.abort();
            Outcome::Failed {
                failure: Failure::timeout(format!(
                    "no completion within {}ms",
                    case_timeout.as_millis()
                )),
            }
        }
    }
}

/// Converts a duration to whole milliseconds without truncation surprises.
fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
