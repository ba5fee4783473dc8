// system-tests/src/config/env.rs
// ============================================================================
// Module: System Test Environment
// Description: Fixture location, retention, and timeout overrides.
// Purpose: Let CI keep generated certificates and stretch request timeouts.
// Dependencies: authgate-check
// ============================================================================

//! ## Overview
//! Reads three optional variables through
//! [`authgate_check::config::read_env_strict`], so invalid UTF-8 fails
//! closed exactly as it does for the client itself.

use std::num::NonZeroU64;
use std::path::PathBuf;
use std::time::Duration;

use authgate_check::config::read_env_strict;

/// Per-request timeout used when no override is set.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment keys read by the system tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemTestEnv {
    /// Parent directory for generated credential directories.
    RunRoot,
    /// Per-request timeout in whole seconds.
    TimeoutSeconds,
    /// Keep generated credential directories after the test.
    KeepArtifacts,
}

impl SystemTestEnv {
    /// Returns the environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RunRoot => "AUTHGATE_SYSTEM_TEST_RUN_ROOT",
            Self::TimeoutSeconds => "AUTHGATE_SYSTEM_TEST_TIMEOUT_SEC",
            Self::KeepArtifacts => "AUTHGATE_SYSTEM_TEST_KEEP_ARTIFACTS",
        }
    }

    /// Reads the variable; set-but-blank is an error.
    fn read(self) -> Result<Option<String>, String> {
        match read_env_strict(self.as_str()).map_err(|err| err.to_string())? {
            Some(value) if value.trim().is_empty() => {
                Err(format!("{} must not be empty", self.as_str()))
            }
            value => Ok(value),
        }
    }
}

/// System test settings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemTestConfig {
    /// Parent directory for fixtures; the platform temp dir when unset.
    pub run_root: Option<PathBuf>,
    /// Timeout override.
    pub timeout: Option<Duration>,
    /// Retain fixtures on disk.
    pub keep_artifacts: bool,
}

impl SystemTestConfig {
    /// Loads settings from the environment.
    ///
    /// # Errors
    ///
    /// Returns a message naming the offending variable when a value is not
    /// UTF-8, is blank, or does not parse.
    pub fn load() -> Result<Self, String> {
        let timeout = match SystemTestEnv::TimeoutSeconds.read()? {
            None => None,
            Some(raw) => match raw.trim().parse::<NonZeroU64>() {
                Ok(secs) => Some(Duration::from_secs(secs.get())),
                Err(_) => {
                    return Err(format!(
                        "{} must be a positive whole number of seconds",
                        SystemTestEnv::TimeoutSeconds.as_str()
                    ));
                }
            },
        };
        let keep_artifacts = match SystemTestEnv::KeepArtifacts.read()?.as_deref().map(str::trim) {
            None | Some("0" | "false") => false,
            Some("1" | "true") => true,
            Some(_) => {
                return Err(format!(
                    "{} must be 1, 0, true, or false",
                    SystemTestEnv::KeepArtifacts.as_str()
                ));
            }
        };
        Ok(Self {
            run_root: SystemTestEnv::RunRoot.read()?.map(PathBuf::from),
            timeout,
            keep_artifacts,
        })
    }

    /// Returns the timeout override or [`DEFAULT_TIMEOUT`].
    #[must_use]
    pub fn timeout_or_default(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT)
    }
}
