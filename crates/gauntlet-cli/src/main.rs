// crates/gauntlet-cli/src/main.rs
// ============================================================================
// Module: Gauntlet CLI Entry Point
// Description: Command dispatcher for contract-test runs.
// Purpose: Resolve configuration, bind suites, execute, and report.
// Dependencies: clap, gauntlet-config, gauntlet-core, gauntlet-report,
//   gauntlet-suites, serde_json, thiserror, tokio
// ============================================================================

//! ## Overview
//! The `gauntlet` binary wires the harness crates together: `run` executes
//! the suite registry against a deployment, `list` shows suites with their
//! project bindings, `config` echoes the resolved configuration. Flags
//! overlay environment variables, and flags win.
//! Invariants:
//! - Exit code 0 means no case failed; 1 means at least one failure;
//!   2 means a fatal harness error before or during scheduling.
//! - All user-facing output goes through the console line helpers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use gauntlet_config::EnvKey;
use gauntlet_config::EnvSnapshot;
use gauntlet_config::RunConfig;
use gauntlet_config::default_projects;
use gauntlet_core::ResultSink;
use gauntlet_core::RunOptions;
use gauntlet_core::Scheduler;
use gauntlet_core::Suite;
use gauntlet_report::AnnotationReporter;
use gauntlet_report::HtmlReporter;
use gauntlet_report::JsonlReporter;
use gauntlet_report::ListReporter;
use gauntlet_report::MultiReporter;
use gauntlet_report::RunArtifacts;
use gauntlet_report::RunJsonReporter;
use gauntlet_report::write_stderr_line;
use gauntlet_report::write_stdout_line;
use gauntlet_suites::PortalContext;
use gauntlet_suites::PortalFactory;
use gauntlet_suites::all_suites;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "gauntlet", version, about = "Contract-test runner for a deployed study portal")]
struct Cli {
    /// Selected subcommand.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Execute the suites against the configured deployment.
    Run(RunCommand),
    /// List suites, cases, and their project bindings without executing.
    List(ListCommand),
    /// Print the resolved run configuration as JSON.
    Config(ConfigCommand),
}

/// Configuration overrides shared by every subcommand. Each flag maps to
/// one canonical environment key and wins over the environment.
#[derive(Args, Debug, Clone)]
struct OverrideArgs {
    /// API base URL override.
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Front-end base URL override.
    #[arg(long, value_name = "URL")]
    app_url: Option<String>,

    /// WebDriver endpoint override.
    #[arg(long, value_name = "URL")]
    webdriver_url: Option<String>,

    /// Force CI mode (one worker, two retries, annotations).
    #[arg(long, action = ArgAction::SetTrue)]
    ci: bool,

    /// Parallel worker count override.
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Retry count override.
    #[arg(long, value_name = "N")]
    retries: Option<u32>,

    /// Per-case timeout override in seconds.
    #[arg(long = "timeout-sec", value_name = "SECONDS")]
    timeout_sec: Option<u64>,

    /// Artifact output directory override.
    #[arg(long, value_name = "PATH")]
    output_dir: Option<PathBuf>,

    /// Report directory override.
    #[arg(long, value_name = "PATH")]
    report_dir: Option<PathBuf>,
}

/// The `run` subcommand.
#[derive(Args, Debug)]
struct RunCommand {
    /// Configuration overrides.
    #[command(flatten)]
    overrides: OverrideArgs,

    /// Only run cases carrying this tag.
    #[arg(long, value_name = "TAG")]
    tag: Option<String>,

    /// Only run the suite with this exact name.
    #[arg(long, value_name = "NAME")]
    suite: Option<String>,
}

/// The `list` subcommand.
#[derive(Args, Debug)]
struct ListCommand {
    /// Configuration overrides.
    #[command(flatten)]
    overrides: OverrideArgs,
}

/// The `config` subcommand.
#[derive(Args, Debug)]
struct ConfigCommand {
    /// Configuration overrides.
    #[command(flatten)]
    overrides: OverrideArgs,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Fatal CLI error; always maps to exit code 2.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs an error from a message.
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match dispatch().await {
        Ok(code) => code,
        Err(err) => {
            write_stderr_line(&format!("error: {err}"));
            ExitCode::from(2)
        }
    }
}

/// Parses arguments and dispatches the selected subcommand.
async fn dispatch() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(command) => command_run(command).await,
        Commands::List(command) => command_list(&command),
        Commands::Config(command) => command_config(&command),
    }
}

// ============================================================================
// SECTION: Run Command
// ============================================================================

/// Executes the `run` command.
async fn command_run(command: RunCommand) -> CliResult<ExitCode> {
    let config = resolve_config(&command.overrides)?;
    let suites = select_suites(command.tag.as_deref(), command.suite.as_deref());
    if suites.is_empty() {
        return Err(CliError::new("no suites match the requested filter"));
    }
    let plan = default_projects(&config).plan(suites);

    let artifacts = RunArtifacts::create(&config.output_dir)
        .map_err(|err| CliError::new(format!("cannot create output directory: {err}")))?;
    let factory =
        Arc::new(PortalFactory::new(config.clone(), artifacts.root().join("captures")));
    let sink = build_sink(&config, &artifacts)?;

    let options = RunOptions::new(config.workers, config.retries, config.timeout);
    let scheduler: Scheduler<PortalContext> = Scheduler::new(factory, sink);
    let summary = scheduler
        .run(plan, options)
        .await
        .map_err(|err| CliError::new(err.to_string()))?;

    write_stdout_line(&format!("artifacts: {}", artifacts.root().display()));
    if summary.failed > 0 {
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}

/// Loads the suite registry and applies tag and name filters.
fn select_suites(tag: Option<&str>, suite_name: Option<&str>) -> Vec<Suite<PortalContext>> {
    let mut suites = all_suites();
    if let Some(name) = suite_name {
        suites.retain(|suite| suite.name() == name);
    }
    if let Some(tag) = tag {
        suites = suites
            .into_iter()
            .map(|suite| suite.filter(|case| case.tags().iter().any(|t| t == tag)))
            .filter(|suite| !suite.is_empty())
            .collect();
    }
    suites
}

/// Assembles the reporter fan-out for a run.
fn build_sink(config: &RunConfig, artifacts: &RunArtifacts) -> CliResult<Arc<MultiReporter>> {
    let mut sinks: Vec<Arc<dyn ResultSink>> = Vec::new();
    if config.reporters.list {
        sinks.push(Arc::new(ListReporter));
    }
    let jsonl = JsonlReporter::create(artifacts.root())
        .map_err(|err| CliError::new(format!("cannot open case stream: {err}")))?;
    sinks.push(Arc::new(jsonl));
    let echo = serde_json::to_value(config)
        .map_err(|err| CliError::new(format!("cannot serialize configuration: {err}")))?;
    sinks.push(Arc::new(RunJsonReporter::new(artifacts.root(), echo)));
    if config.reporters.html {
        std::fs::create_dir_all(&config.report_dir)
            .map_err(|err| CliError::new(format!("cannot create report directory: {err}")))?;
        sinks.push(Arc::new(HtmlReporter::new(&config.report_dir)));
    }
    if config.reporters.annotations {
        sinks.push(Arc::new(AnnotationReporter));
    }
    Ok(Arc::new(MultiReporter::new(sinks)))
}

// ============================================================================
// SECTION: List and Config Commands
// ============================================================================

/// Executes the `list` command.
fn command_list(command: &ListCommand) -> CliResult<ExitCode> {
    let config = resolve_config(&command.overrides)?;
    let projects = default_projects(&config);
    for suite in all_suites() {
        match projects.assign(suite.name()) {
            Some(project) => {
                write_stdout_line(&format!("{} [{}]", suite.name(), project.name));
            }
            None => write_stdout_line(&format!("{} [unmatched]", suite.name())),
        }
        for case in suite.cases() {
            if case.tags().is_empty() {
                write_stdout_line(&format!("  {}", case.name()));
            } else {
                write_stdout_line(&format!("  {} @{}", case.name(), case.tags().join(" @")));
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes the `config` command.
fn command_config(command: &ConfigCommand) -> CliResult<ExitCode> {
    let config = resolve_config(&command.overrides)?;
    let rendered = serde_json::to_string_pretty(&config)
        .map_err(|err| CliError::new(format!("cannot serialize configuration: {err}")))?;
    write_stdout_line(&rendered);
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Configuration Overlay
// ============================================================================

/// Resolves configuration from the environment with flag overrides applied.
fn resolve_config(overrides: &OverrideArgs) -> CliResult<RunConfig> {
    let mut pairs: Vec<(String, String)> = std::env::vars().collect();
    pairs.extend(override_pairs(overrides));
    let snapshot = EnvSnapshot::from_pairs(pairs);
    RunConfig::from_snapshot(&snapshot).map_err(|err| CliError::new(err.to_string()))
}

/// Maps set flags onto their canonical environment keys. Collected after
/// the captured environment so they win during snapshot assembly.
fn override_pairs(overrides: &OverrideArgs) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut push = |key: EnvKey, value: String| {
        pairs.push((key.as_str().to_string(), value));
    };
    if let Some(url) = &overrides.api_url {
        push(EnvKey::ApiUrl, url.clone());
    }
    if let Some(url) = &overrides.app_url {
        push(EnvKey::AppUrl, url.clone());
    }
    if let Some(url) = &overrides.webdriver_url {
        push(EnvKey::WebDriverUrl, url.clone());
    }
    if overrides.ci {
        push(EnvKey::Ci, "true".to_string());
    }
    if let Some(workers) = overrides.workers {
        push(EnvKey::Workers, workers.to_string());
    }
    if let Some(retries) = overrides.retries {
        push(EnvKey::Retries, retries.to_string());
    }
    if let Some(secs) = overrides.timeout_sec {
        push(EnvKey::TimeoutSeconds, secs.to_string());
    }
    if let Some(dir) = &overrides.output_dir {
        push(EnvKey::OutputDir, dir.display().to_string());
    }
    if let Some(dir) = &overrides.report_dir {
        push(EnvKey::ReportDir, dir.display().to_string());
    }
    pairs
}
