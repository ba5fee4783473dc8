// crates/authgate-check/src/tests/mod.rs
// ============================================================================
// Module: Unit Tests
// Description: Unit coverage for discovery, sessions, the suite, and the catalog.
// Purpose: Exercise library behavior against scripted loopback servers.
// Dependencies: hyper, tempfile, tokio
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::missing_docs_in_private_items,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod support;
