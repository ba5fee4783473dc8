// system-tests/tests/helpers/runner.rs
// ============================================================================
// Module: Suite Runner
// Description: Runs the authgate-check suite in-process and captures output.
// Purpose: Give system-tests the exact console lines and totals of one run.
// Dependencies: authgate-check
// ============================================================================

use std::path::Path;

use authgate_check::CredentialBundle;
use authgate_check::Reporter;
use authgate_check::SuiteConfig;
use authgate_check::SuiteContext;
use authgate_check::SuiteSummary;
use authgate_check::config::EnvConfig;
use authgate_check::run_suite;
use authgate_check::session::TrustAnchor;
use system_tests::config::SystemTestConfig;

/// Captured result of one suite run.
pub struct SuiteRun {
    /// Pass/fail totals.
    pub summary: SuiteSummary,
    /// Console lines in write order.
    pub lines: Vec<String>,
}

impl SuiteRun {
    /// Returns true when `line` was written.
    pub fn has_line(&self, line: &str) -> bool {
        self.lines.iter().any(|candidate| candidate == line)
    }
}

/// Loads credentials from `certs_dir` and runs the suite against `url`.
pub async fn run_suite_against(
    certs_dir: &Path,
    url: &str,
) -> Result<SuiteRun, Box<dyn std::error::Error>> {
    let system = SystemTestConfig::load()?;
    let env = EnvConfig {
        timeout: Some(system.timeout_or_default()),
        ..EnvConfig::default()
    };
    let config = SuiteConfig::new(certs_dir.to_path_buf(), url, env)?;
    let bundle = CredentialBundle::load(&config.certs_dir, config.requires_tls())?;
    let trust = TrustAnchor::load(bundle.ca_cert())?;
    let ctx = SuiteContext {
        config: &config,
        bundle: &bundle,
        trust: &trust,
    };
    let mut reporter = Reporter::new(Vec::new());
    let summary = run_suite(ctx, &mut reporter).await?;
    let output = String::from_utf8(reporter.into_inner())?;
    Ok(SuiteRun {
        summary,
        lines: output.lines().map(str::to_owned).collect(),
    })
}
