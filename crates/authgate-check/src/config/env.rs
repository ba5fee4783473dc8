// crates/authgate-check/src/config/env.rs
// ============================================================================
// Module: Suite Environment
// Description: Environment-backed overrides for the gateway auth suite.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std, thiserror
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use thiserror::Error;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Basic-Auth username used when no override is set.
pub const DEFAULT_USERNAME: &str = "user2";
/// Basic-Auth password used when no override is set.
pub const DEFAULT_PASSWORD: &str = "password2";

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for suite configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckEnv {
    /// Basic-Auth username override.
    Username,
    /// Basic-Auth password override.
    Password,
    /// Optional per-request timeout in seconds (positive integer).
    TimeoutSeconds,
}

impl CheckEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Username => "AUTHGATE_CHECK_USERNAME",
            Self::Password => "AUTHGATE_CHECK_PASSWORD",
            Self::TimeoutSeconds => "AUTHGATE_CHECK_TIMEOUT_SEC",
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
///
/// # Invariants
/// - Variants are stable for CLI error mapping and tests.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Environment variable is not valid UTF-8.
    #[error("{0} must be valid UTF-8")]
    InvalidUtf8(&'static str),
    /// Environment variable is set but empty.
    #[error("{0} must not be empty")]
    Empty(&'static str),
    /// Timeout is not a positive integer.
    #[error("{0} must be a positive integer number of seconds")]
    InvalidTimeout(&'static str),
    /// Target URL could not be parsed.
    #[error("invalid target url {url}: {reason}")]
    InvalidUrl {
        /// Raw URL as supplied.
        url: String,
        /// Parser failure reason.
        reason: String,
    },
    /// Target URL uses a scheme other than http or https.
    #[error("unsupported url scheme {0} (expected http or https)")]
    UnsupportedScheme(String),
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed overrides derived from environment variables.
#[derive(Clone, PartialEq, Eq)]
pub struct EnvConfig {
    /// Basic-Auth username.
    pub username: String,
    /// Basic-Auth password.
    pub password: String,
    /// Optional per-request timeout; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for EnvConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            username: DEFAULT_USERNAME.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            timeout: None,
        }
    }
}

impl EnvConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an environment value is not valid UTF-8,
    /// is empty, or fails validation (for example, a zero timeout).
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let username = read_env_nonempty(CheckEnv::Username.as_str())?.unwrap_or(defaults.username);
        let password = read_env_nonempty(CheckEnv::Password.as_str())?.unwrap_or(defaults.password);
        let timeout = read_env_nonempty(CheckEnv::TimeoutSeconds.as_str())?
            .map(|value| parse_timeout_seconds(CheckEnv::TimeoutSeconds.as_str(), &value))
            .transpose()?;
        Ok(Self {
            username,
            password,
            timeout,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidUtf8`] when the value contains invalid UTF-8.
pub fn read_env_strict(name: &'static str) -> Result<Option<String>, ConfigError> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| ConfigError::InvalidUtf8(name))
    })
}

/// Reads an environment variable and rejects empty values.
///
/// # Errors
///
/// Returns an error when the variable is set but empty or whitespace.
fn read_env_nonempty(name: &'static str) -> Result<Option<String>, ConfigError> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => Err(ConfigError::Empty(name)),
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Parses a positive timeout value from an environment variable string.
///
/// # Errors
///
/// Returns an error when the value is non-numeric or zero.
fn parse_timeout_seconds(name: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidTimeout(name))?;
    if secs == 0 {
        return Err(ConfigError::InvalidTimeout(name));
    }
    Ok(Duration::from_secs(secs))
}
