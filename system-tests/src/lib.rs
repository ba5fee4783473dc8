// system-tests/src/lib.rs
// ============================================================================
// Module: authgate-check System Tests Library
// Description: Shared configuration for system test scenarios.
// Purpose: Provide common settings for the binaries in `system-tests/tests`.
// Dependencies: std
// ============================================================================

//! ## Overview
//! This crate hosts shared configuration used by the authgate-check
//! system-tests, which run the suite end to end against a TLS gateway stub.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
