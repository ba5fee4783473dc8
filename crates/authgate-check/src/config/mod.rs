// crates/authgate-check/src/config/mod.rs
// ============================================================================
// Module: Suite Configuration
// Description: Centralized configuration for the gateway auth suite.
// Purpose: Provide typed access to CLI targets and environment overrides.
// Dependencies: reqwest, thiserror
// ============================================================================

//! ## Overview
//! Suite configuration combines the two positional CLI arguments with a small
//! set of environment overrides (Basic-Auth credentials and an optional
//! request timeout). Environment values are parsed strictly and fail closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;
mod suite;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::CheckEnv;
pub use env::ConfigError;
pub use env::DEFAULT_PASSWORD;
pub use env::DEFAULT_USERNAME;
pub use env::EnvConfig;
pub use env::read_env_strict;
pub use suite::SuiteConfig;
