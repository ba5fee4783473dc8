// crates/authgate-check/src/report.rs
// ============================================================================
// Module: Console Reporter
// Description: Line-oriented pass/fail output with running tallies.
// Purpose: Keep console output and outcome counting in one place.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The reporter writes one line per event to any [`Write`] sink (stdout in the
//! binary, a byte buffer in tests) and counts passed and failed checks.

use std::io::Write;

/// Line writer that tallies outcomes.
#[derive(Debug)]
pub struct Reporter<W: Write> {
    /// Output sink.
    out: W,
    /// Checks that passed.
    passed: usize,
    /// Checks that failed.
    failed: usize,
}

impl<W: Write> Reporter<W> {
    /// Creates a reporter over `out`.
    pub const fn new(out: W) -> Self {
        Self {
            out,
            passed: 0,
            failed: 0,
        }
    }

    /// Writes an informational line.
    ///
    /// # Errors
    ///
    /// Returns an error when the sink cannot be written.
    pub fn info(&mut self, message: &str) -> std::io::Result<()> {
        writeln!(self.out, "{message}")
    }

    /// Writes a line and counts a passed check.
    ///
    /// # Errors
    ///
    /// Returns an error when the sink cannot be written.
    pub fn pass(&mut self, message: &str) -> std::io::Result<()> {
        self.passed += 1;
        self.info(message)
    }

    /// Writes a line and counts a failed check.
    ///
    /// # Errors
    ///
    /// Returns an error when the sink cannot be written.
    pub fn fail(&mut self, message: &str) -> std::io::Result<()> {
        self.failed += 1;
        self.info(message)
    }

    /// Returns the number of passed checks.
    pub const fn passed(&self) -> usize {
        self.passed
    }

    /// Returns the number of failed checks.
    pub const fn failed(&self) -> usize {
        self.failed
    }

    /// Consumes the reporter and returns the sink.
    pub fn into_inner(self) -> W {
        self.out
    }
}
