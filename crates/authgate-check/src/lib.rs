// crates/authgate-check/src/lib.rs
// ============================================================================
// Module: Gateway Auth Check Library
// Description: Credential discovery, HTTP sessions, and the gateway auth suite.
// Purpose: Drive Basic-Auth, mTLS, and cookie-reuse checks against a gateway.
// Dependencies: reqwest, thiserror, tracing
// ============================================================================

//! ## Overview
//! `authgate-check` validates an authentication gateway from the outside. It
//! discovers a CA certificate and per-user client identities from a directory,
//! runs the Basic-Auth form flow, runs one mTLS probe per identity, and
//! confirms that each authenticated session is accepted on cookie alone.
//!
//! Execution is strictly sequential. Each test case owns its own
//! [`session::GatewaySession`], released when the case returns.
//! Security posture: server responses are untrusted; never log credentials.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod credentials;
pub mod i18n;
pub mod report;
pub mod session;
pub mod suite;

#[cfg(test)]
mod tests;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use config::SuiteConfig;
pub use credentials::CredentialBundle;
pub use credentials::CredentialError;
pub use report::Reporter;
pub use session::GatewaySession;
pub use session::SessionError;
pub use suite::SuiteContext;
pub use suite::SuiteSummary;
pub use suite::run_suite;
