// crates/authgate-check/src/config/suite.rs
// ============================================================================
// Module: Suite Target Configuration
// Description: Resolved inputs for one run of the gateway auth suite.
// Purpose: Validate the target URL and bundle it with credential overrides.
// Dependencies: reqwest
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

use super::ConfigError;
use super::EnvConfig;

/// Fully resolved suite configuration.
///
/// # Invariants
/// - `target` uses the `http` or `https` scheme.
#[derive(Debug, Clone)]
pub struct SuiteConfig {
    /// Directory holding `ca.crt` and `user.<id>.{key,crt}` files.
    pub certs_dir: PathBuf,
    /// Protected resource on the gateway.
    pub target: Url,
    /// Basic-Auth credentials and timeout overrides.
    pub env: EnvConfig,
}

impl SuiteConfig {
    /// Builds a suite configuration from CLI inputs and environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the URL does not parse or is not http(s).
    pub fn new(certs_dir: PathBuf, url: &str, env: EnvConfig) -> Result<Self, ConfigError> {
        let target = Url::parse(url).map_err(|err| ConfigError::InvalidUrl {
            url: url.to_string(),
            reason: err.to_string(),
        })?;
        match target.scheme() {
            "http" | "https" => {}
            other => return Err(ConfigError::UnsupportedScheme(other.to_string())),
        }
        Ok(Self {
            certs_dir,
            target,
            env,
        })
    }

    /// Returns true when the target requires server certificate verification.
    #[must_use]
    pub fn requires_tls(&self) -> bool {
        self.target.scheme() == "https"
    }

    /// Returns the per-request timeout, if one is configured.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.env.timeout
    }
}
