// crates/authgate-check/src/suite.rs
// ============================================================================
// Module: Gateway Auth Suite
// Description: Basic-Auth, mTLS, and cookie-reuse test sequences.
// Purpose: Drive the gateway through each credential scheme and report results.
// Dependencies: reqwest, thiserror, tracing
// ============================================================================

//! ## Overview
//! The suite runs two sequences against one target URL:
//!
//! - **Basic-Auth** (`test00`..`test02`): follow the gateway's redirect to the
//!   identity provider, post `name`/`password`, and check the final status.
//! - **mTLS** (`test10`..): one probe per client identity in sorted order.
//!
//! Every successful login is followed by a cookie-reuse check on the same
//! session, which passes only when the gateway answers 200 without redirecting.
//!
//! ## Invariants
//! - Cases run strictly in order; each owns a fresh [`GatewaySession`].
//! - A transport failure fails its own case and the suite moves on.
//! - Only console write failures abort the run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::io::Write;

use reqwest::StatusCode;
use reqwest::Url;
use thiserror::Error;

use crate::config::SuiteConfig;
use crate::credentials::CredentialBundle;
use crate::credentials::UserCredential;
use crate::credentials::UserId;
use crate::report::Reporter;
use crate::session::FollowRedirects;
use crate::session::GatewaySession;
use crate::session::ProbeResponse;
use crate::session::SessionError;
use crate::session::SessionOptions;
use crate::session::TrustAnchor;
use crate::t;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Password submitted by the negative Basic-Auth cases.
pub const WRONG_PASSWORD: &str = "incorrect";
/// Username that no identity provider should know.
pub const UNKNOWN_USER: &str = "nobody";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Test sequence a case belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TestGroup {
    /// Basic-Auth form flow.
    BasicAuth,
    /// Client-certificate authentication.
    Mtls,
}

impl TestGroup {
    /// Returns the digit used in rendered test names.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::BasicAuth => 0,
            Self::Mtls => 1,
        }
    }
}

/// Structured test identifier.
///
/// Renders as `test<group><index>` for single-digit indexes and
/// `test<group>_<index>` from ten on, so `test1_10` never collides with
/// `test11` followed by a digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TestId {
    /// Owning sequence.
    pub group: TestGroup,
    /// Zero-based position within the sequence.
    pub index: usize,
}

impl TestId {
    /// Identifier for a Basic-Auth case.
    #[must_use]
    pub const fn basic(index: usize) -> Self {
        Self {
            group: TestGroup::BasicAuth,
            index,
        }
    }

    /// Identifier for an mTLS case.
    #[must_use]
    pub const fn mtls(index: usize) -> Self {
        Self {
            group: TestGroup::Mtls,
            index,
        }
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.index < 10 {
            write!(f, "test{}{}", self.group.code(), self.index)
        } else {
            write!(f, "test{}_{}", self.group.code(), self.index)
        }
    }
}

/// Pass/fail totals for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuiteSummary {
    /// Checks that passed.
    pub passed: usize,
    /// Checks that failed.
    pub failed: usize,
}

impl SuiteSummary {
    /// Returns true when no check failed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Shared read-only inputs for every case.
#[derive(Debug, Clone, Copy)]
pub struct SuiteContext<'a> {
    /// Resolved configuration.
    pub config: &'a SuiteConfig,
    /// Discovered client identities.
    pub bundle: &'a CredentialBundle,
    /// Server trust anchor.
    pub trust: &'a TrustAnchor,
}

/// One Basic-Auth case.
struct BasicCase<'a> {
    /// Position in the sequence.
    index: usize,
    /// Submitted username.
    username: &'a str,
    /// Submitted password.
    password: &'a str,
    /// Expected status after posting credentials.
    expected: StatusCode,
}

/// Case-level failure.
///
/// # Invariants
/// - [`CaseError::Session`] is recoverable and becomes a failed check.
/// - [`CaseError::Output`] aborts the run.
#[derive(Debug, Error)]
pub enum CaseError {
    /// Request or TLS setup failed; recorded as a failed check.
    #[error(transparent)]
    Session(#[from] SessionError),
    /// Console output failed; aborts the run.
    #[error(transparent)]
    Output(#[from] std::io::Error),
}

// ============================================================================
// SECTION: Suite
// ============================================================================

/// Runs the Basic-Auth and mTLS sequences and writes a summary line.
///
/// # Errors
///
/// Returns an error only when the reporter cannot write output.
pub async fn run_suite<W: Write>(
    ctx: SuiteContext<'_>,
    reporter: &mut Reporter<W>,
) -> std::io::Result<SuiteSummary> {
    run_basic_auth(ctx, reporter).await?;
    run_mtls(ctx, reporter).await?;
    let summary = SuiteSummary {
        passed: reporter.passed(),
        failed: reporter.failed(),
    };
    reporter.info(&t!("suite.summary", passed = summary.passed, failed = summary.failed))?;
    Ok(summary)
}

/// Runs `test00` (valid login plus cookie reuse), `test01` (wrong password),
/// and `test02` (unknown user).
///
/// # Errors
///
/// Returns an error only when the reporter cannot write output.
pub async fn run_basic_auth<W: Write>(
    ctx: SuiteContext<'_>,
    reporter: &mut Reporter<W>,
) -> std::io::Result<()> {
    let env = &ctx.config.env;
    let cases = [
        BasicCase {
            index: 0,
            username: &env.username,
            password: &env.password,
            expected: StatusCode::OK,
        },
        BasicCase {
            index: 1,
            username: &env.username,
            password: WRONG_PASSWORD,
            expected: StatusCode::UNAUTHORIZED,
        },
        BasicCase {
            index: 2,
            username: UNKNOWN_USER,
            password: WRONG_PASSWORD,
            expected: StatusCode::UNAUTHORIZED,
        },
    ];
    for case in &cases {
        let name = TestId::basic(case.index).to_string();
        let result = basic_case(ctx, case, &name, reporter).await;
        settle(result, reporter, &name, None)?;
    }
    Ok(())
}

/// Runs one mTLS probe per identity in lexicographic order.
///
/// # Errors
///
/// Returns an error only when the reporter cannot write output.
pub async fn run_mtls<W: Write>(
    ctx: SuiteContext<'_>,
    reporter: &mut Reporter<W>,
) -> std::io::Result<()> {
    for (index, (user, credential)) in ctx.bundle.users().enumerate() {
        let name = TestId::mtls(index).to_string();
        let result = mtls_case(ctx, user, credential, &name, reporter).await;
        settle(result, reporter, &name, Some(user))?;
    }
    Ok(())
}

// ============================================================================
// SECTION: Cases
// ============================================================================

/// Basic-Auth form flow for one case.
async fn basic_case<W: Write>(
    ctx: SuiteContext<'_>,
    case: &BasicCase<'_>,
    name: &str,
    reporter: &mut Reporter<W>,
) -> Result<(), CaseError> {
    let target = &ctx.config.target;
    let session = GatewaySession::open(SessionOptions {
        label: name,
        trust: ctx.trust,
        identity: None,
        timeout: ctx.config.timeout(),
    })?;
    let response = basic_login(&session, name, target, case, reporter).await?;
    let login_ok = case.expected == StatusCode::OK;
    if response.status == case.expected {
        if login_ok {
            reporter.pass(&t!(
                "suite.passed_body",
                test = name,
                status = response.status.as_u16(),
                body = response.body_trimmed()
            ))?;
        } else {
            reporter.pass(&t!("suite.passed", test = name, status = response.status.as_u16()))?;
        }
    } else {
        reporter.fail(&t!("suite.failed", test = name, status = response.status.as_u16()))?;
    }
    if login_ok {
        check_cookie_reuse(&session, name, target, reporter).await?;
    }
    Ok(())
}

/// GETs the protected resource, then posts credentials to wherever the
/// redirects landed.
async fn basic_login<W: Write>(
    session: &GatewaySession,
    name: &str,
    target: &Url,
    case: &BasicCase<'_>,
    reporter: &mut Reporter<W>,
) -> Result<ProbeResponse, CaseError> {
    reporter.info(&t!("suite.start", test = name, url = target))?;
    let landing = session.get(target, FollowRedirects::Follow).await?;
    reporter.info(&t!("suite.post_credentials", test = name))?;
    let params = [("name", case.username), ("password", case.password)];
    Ok(session.post_query(&landing.url, &params, FollowRedirects::Follow).await?)
}

/// Client-certificate probe for one identity.
async fn mtls_case<W: Write>(
    ctx: SuiteContext<'_>,
    user: &UserId,
    credential: &UserCredential,
    name: &str,
    reporter: &mut Reporter<W>,
) -> Result<(), CaseError> {
    let target = &ctx.config.target;
    reporter.info(&t!("suite.user.start", test = name, user = user, url = target))?;
    let session = GatewaySession::open(SessionOptions {
        label: name,
        trust: ctx.trust,
        identity: Some((user, credential)),
        timeout: ctx.config.timeout(),
    })?;
    let response = session.get(target, FollowRedirects::Follow).await?;
    let status = response.status.as_u16();
    if !user.is_provisioned() {
        if response.status == StatusCode::UNAUTHORIZED {
            reporter.pass(&t!("suite.user.passed", test = name, user = user, status = status))?;
        } else {
            reporter.fail(&t!("suite.user.failed", test = name, user = user, status = status))?;
        }
        return Ok(());
    }
    if response.status == StatusCode::OK {
        reporter.pass(&t!(
            "suite.user.passed_body",
            test = name,
            user = user,
            status = status,
            body = response.body_trimmed()
        ))?;
    } else {
        reporter.fail(&t!("suite.user.failed", test = name, user = user, status = status))?;
    }
    check_cookie_reuse(&session, name, target, reporter).await
}

/// Re-requests `target` on an authenticated session and expects a direct 200.
///
/// A non-empty redirect history means the gateway bounced the session back
/// through the identity provider, which fails the check whatever the final
/// status.
///
/// # Errors
///
/// Returns [`CaseError::Session`] on transport failure and
/// [`CaseError::Output`] when the reporter cannot write.
pub async fn check_cookie_reuse<W: Write>(
    session: &GatewaySession,
    name: &str,
    target: &Url,
    reporter: &mut Reporter<W>,
) -> Result<(), CaseError> {
    reporter.info(&t!("suite.cookie_start", test = name))?;
    let response = session.get(target, FollowRedirects::Follow).await?;
    let status = response.status.as_u16();
    if response.status == StatusCode::OK && response.history.is_empty() {
        reporter.pass(&t!(
            "suite.passed_body",
            test = name,
            status = status,
            body = response.body_trimmed()
        ))?;
    } else {
        reporter.fail(&t!(
            "suite.failed_history",
            test = name,
            status = status,
            history = response.history_summary()
        ))?;
    }
    Ok(())
}

/// Records a transport failure as a failed check; propagates output errors.
fn settle<W: Write>(
    result: Result<(), CaseError>,
    reporter: &mut Reporter<W>,
    name: &str,
    user: Option<&UserId>,
) -> std::io::Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(CaseError::Output(err)) => Err(err),
        Err(CaseError::Session(err)) => {
            tracing::warn!(test = name, error = %err, "case failed on transport error");
            let line = match user {
                Some(user) => t!("suite.user.failed_error", test = name, user = user, error = err),
                None => t!("suite.failed_error", test = name, error = err),
            };
            reporter.fail(&line)
        }
    }
}
