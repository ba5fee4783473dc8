// system-tests/src/config/mod.rs
// ============================================================================
// Module: System Test Configuration
// Description: Environment overrides for authgate-check system tests.
// Purpose: Provide typed access to fixture and timeout settings.
// Dependencies: authgate-check
// ============================================================================

//! ## Overview
//! Typed access to the fixture and timeout overrides used by the system tests.

mod env;


pub use env::DEFAULT_TIMEOUT;
pub use env::SystemTestConfig;
pub use env::SystemTestEnv;
