// crates/authgate-check/src/main.rs
// ============================================================================
// Module: authgate-check CLI Entry Point
// Description: Command-line driver for the gateway auth suite.
// Purpose: Load credentials, run every check, and map results to an exit code.
// Dependencies: authgate-check, clap, thiserror, tokio, tracing-subscriber
// ============================================================================

//! ## Overview
//! `authgate-check <certs-dir> <url>` discovers the CA certificate and client
//! identities in `certs-dir`, runs the Basic-Auth and mTLS sequences against
//! `url`, and exits non-zero when any check fails. Results go to stdout;
//! diagnostics go to stderr through `tracing` (filter via `RUST_LOG`).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use authgate_check::CredentialBundle;
use authgate_check::Reporter;
use authgate_check::SuiteConfig;
use authgate_check::SuiteContext;
use authgate_check::config::EnvConfig;
use authgate_check::run_suite;
use authgate_check::session::TrustAnchor;
use authgate_check::t;
use clap::Parser;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Log filter used when `RUST_LOG` is unset or invalid.
const DEFAULT_LOG_FILTER: &str = "warn";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "authgate-check", version, about = "Gateway authentication test client")]
struct Cli {
    /// Directory containing `ca.crt` and `user.<id>.key` / `user.<id>.crt` pairs.
    certs: PathBuf,
    /// Protected URL on the gateway under test.
    url: String,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a rendered message.
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
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Resolves configuration, loads credentials, and runs the suite.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let env = EnvConfig::load()
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let config = SuiteConfig::new(cli.certs, &cli.url, env)
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let bundle = CredentialBundle::load(&config.certs_dir, config.requires_tls())
        .map_err(|err| CliError::new(t!("credentials.load_failed", error = err)))?;
    let trust = TrustAnchor::load(bundle.ca_cert())
        .map_err(|err| CliError::new(t!("tls.ca_load_failed", error = err)))?;
    tracing::info!(
        target_url = %config.target,
        identities = bundle.len(),
        "starting gateway auth suite"
    );

    let ctx = SuiteContext {
        config: &config,
        bundle: &bundle,
        trust: &trust,
    };
    let mut reporter = Reporter::new(std::io::stdout());
    let summary = run_suite(ctx, &mut reporter)
        .await
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    if summary.is_success() { Ok(ExitCode::SUCCESS) } else { Ok(ExitCode::FAILURE) }
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Installs the stderr `tracing` subscriber.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    t!("output.write_failed", stream = stream, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
