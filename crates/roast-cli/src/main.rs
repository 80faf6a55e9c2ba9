// crates/roast-cli/src/main.rs
// ============================================================================
// Module: Cloud Roast CLI Entry Point
// Description: Command dispatcher for smoke runs, listing, and config checks.
// Purpose: Select cases by tag, run them, and map the outcome to an exit code.
// Dependencies: clap, roast-config, roast-core, roast-suites, tracing-subscriber
// ============================================================================

//! ## Overview
//! `roast run` loads configuration, selects cases with `--tag` expressions,
//! runs the catalog sequentially, prints a summary, and exits non-zero when
//! any case failed, errored, or was aborted. Skipped cases never fail a run.
//! Malformed tag expressions are rejected before anything runs.
//!
//! Diagnostics go to stderr through `tracing`; stdout carries only the
//! command output.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use roast_config::RoastConfig;
use roast_config::RoastEnv;
use roast_core::CaseInfo;
use roast_core::RunOptions;
use roast_core::RunReport;
use roast_core::Runner;
use roast_core::SkipRegistry;
use roast_core::TagFilter;
use roast_core::TracingObserver;
use roast_suites::catalog;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Log filter used when `ROAST_LOG` is unset or invalid.
const DEFAULT_LOG_FILTER: &str = "info";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "roast",
    version,
    about = "Smoke tests for cloud service APIs",
    disable_help_subcommand = true
)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the selected test cases.
    Run(RunCommand),
    /// List discovered test cases.
    List(ListCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for `roast run`.
#[derive(Args, Debug)]
struct RunCommand {
    /// Config file path (defaults to `ROAST_CONFIG`, then `./roast.toml`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Tag expression such as `type=smoke`; repeated flags are OR-ed.
    #[arg(long = "tag", value_name = "EXPR")]
    tags: Vec<String>,
    /// Directory receiving `summary.json` and `summary.md`.
    #[arg(long, value_name = "DIR")]
    report_dir: Option<PathBuf>,
    /// Summary format written to stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Run cases blocked on open issues instead of skipping them.
    #[arg(long, action = ArgAction::SetTrue)]
    include_known_issues: bool,
}

/// Arguments for `roast list`.
#[derive(Args, Debug)]
struct ListCommand {
    /// Tag expression; repeated flags are OR-ed.
    #[arg(long = "tag", value_name = "EXPR")]
    tags: Vec<String>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate a config file.
    Validate(ConfigValidateCommand),
}

/// Arguments for `roast config validate`.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Config file path (defaults to `ROAST_CONFIG`, then `./roast.toml`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Run summary formats.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    /// Human-readable case lines and totals.
    Text,
    /// The full report as JSON.
    Json,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error carrying a user-facing message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(command) => command_run(&command),
        Commands::List(command) => command_list(&command),
        Commands::Config {
            command,
        } => match command {
            ConfigCommand::Validate(command) => command_config_validate(&command),
        },
    }
}

/// Installs the stderr log subscriber, filtered by `ROAST_LOG`.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(RoastEnv::Log.as_str())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes `roast run`.
fn command_run(command: &RunCommand) -> CliResult<ExitCode> {
    let filter = parse_filter(&command.tags)?;
    let config = RoastConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    let options = RunOptions {
        filter,
        skips: skip_registry(&config, command.include_known_issues),
    };
    let suites = catalog();
    let runner = Runner::new(&suites, options);
    let report = runner.run(&config, &mut TracingObserver);

    match command.format {
        OutputFormat::Text => write_stdout(&report.render_text())?,
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|err| CliError::new(format!("failed to encode report: {err}")))?;
            write_stdout(&json)?;
        }
    }

    if let Some(dir) = report_dir(command.report_dir.as_deref(), &config) {
        let written = report.write_artifacts(dir).map_err(|err| {
            CliError::new(format!("failed to write report to {}: {err}", dir.display()))
        })?;
        info!(dir = %dir.display(), files = written.len(), "report artifacts written");
    }
    Ok(exit_code(&report))
}

/// Executes `roast list`.
fn command_list(command: &ListCommand) -> CliResult<ExitCode> {
    let options = RunOptions {
        filter: parse_filter(&command.tags)?,
        skips: SkipRegistry::new(),
    };
    let suites = catalog();
    let runner = Runner::new(&suites, options);
    let lines = runner.select().iter().map(render_case_line).collect::<Vec<_>>();
    write_stdout(&lines.join("\n"))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `roast config validate`.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    RoastConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    write_stdout("config ok")?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses repeated `--tag` flags into one filter.
fn parse_filter(tags: &[String]) -> CliResult<TagFilter> {
    TagFilter::parse(tags).map_err(|err| CliError::new(format!("invalid tag expression: {err}")))
}

/// Builds the skip registry from resolved issues and the override flag.
fn skip_registry(config: &RoastConfig, include_known_issues: bool) -> SkipRegistry {
    let registry = SkipRegistry::new().with_resolved(&config.issues.resolved);
    if include_known_issues { registry.including_known_issues() } else { registry }
}

/// Picks the report directory: flag first, then config.
fn report_dir<'a>(flag: Option<&'a Path>, config: &'a RoastConfig) -> Option<&'a Path> {
    flag.or(config.report.dir.as_deref())
}

/// Renders one `roast list` line.
fn render_case_line(case: &CaseInfo) -> String {
    let line = format!("{}::{} [{}]", case.class, case.name, case.tags);
    match &case.skip {
        Some(skip) => format!("{line} skip: {skip}"),
        None => line,
    }
}

/// Maps a report to the process exit code.
fn exit_code(report: &RunReport) -> ExitCode {
    if report.is_success() { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

/// Writes a message line to stdout.
fn write_stdout(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
        .map_err(|err| CliError::new(format!("failed to write to stdout: {err}")))
}

/// Writes a message line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
