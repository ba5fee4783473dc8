// crates/authgate-check/src/session.rs
// ============================================================================
// Module: Gateway Session
// Description: Cookie-carrying HTTP session with explicit redirect tracking.
// Purpose: Issue suite requests and expose each response's redirect history.
// Dependencies: reqwest, rustls, thiserror, tracing
// ============================================================================

//! ## Overview
//! A [`GatewaySession`] owns one `reqwest` client and one cookie jar. The
//! client never follows redirects on its own; the session walks `Location`
//! headers itself so every intermediate hop is recorded in
//! [`ProbeResponse::history`]. Cookies set on any hop land in the jar and are
//! replayed on later requests made through the same session.
//!
//! Sessions are scoped to a single test case and released on drop.
//! Security posture: server responses are untrusted; bodies are only echoed to
//! the console and never interpreted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Certificate;
use reqwest::Client;
use reqwest::Identity;
use reqwest::Method;
use reqwest::StatusCode;
use reqwest::Url;
use reqwest::cookie::CookieStore;
use reqwest::cookie::Jar;
use reqwest::header::HeaderMap;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use thiserror::Error;

use crate::credentials::UserCredential;
use crate::credentials::UserId;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum redirects followed for one logical request.
pub const MAX_REDIRECTS: usize = 30;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Session and transport errors.
///
/// # Invariants
/// - Variants are stable for suite reporting and tests.
/// - Messages never include private key material.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The CA certificate could not be read.
    #[error("failed to read ca certificate {path}: {source}")]
    ReadCa {
        /// CA file path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The CA certificate is not valid PEM.
    #[error("invalid ca certificate {path}: {reason}")]
    InvalidCa {
        /// CA file path.
        path: String,
        /// Parser failure reason.
        reason: String,
    },
    /// A client key or certificate could not be read.
    #[error("failed to read identity file {path}: {source}")]
    ReadIdentity {
        /// Identity file path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The client key and certificate do not form a usable identity.
    #[error("invalid client identity for {user}: {reason}")]
    InvalidIdentity {
        /// Identity owner.
        user: UserId,
        /// Parser failure reason.
        reason: String,
    },
    /// The HTTP client could not be constructed.
    #[error("failed to build http client: {0}")]
    Client(String),
    /// The request failed before a response arrived.
    #[error("request to {url} failed: {detail}")]
    Transport {
        /// Request URL.
        url: String,
        /// Flattened error chain.
        detail: String,
    },
    /// A redirect carried an unusable `Location` header.
    #[error("invalid redirect from {url}: {location}")]
    InvalidRedirect {
        /// URL that issued the redirect.
        url: String,
        /// Raw `Location` value.
        location: String,
    },
    /// The redirect chain exceeded [`MAX_REDIRECTS`].
    #[error("exceeded {limit} redirects starting at {url}")]
    TooManyRedirects {
        /// Original request URL.
        url: String,
        /// Redirect limit.
        limit: usize,
    },
}

// ============================================================================
// SECTION: Types
// ============================================================================

/// Whether a request follows redirects automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowRedirects {
    /// Walk `Location` headers, recording each hop.
    Follow,
    /// Return the first response as-is.
    Stop,
}

/// One intermediate response in a redirect chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectHop {
    /// Redirect status code.
    pub status: StatusCode,
    /// URL that produced the redirect.
    pub url: Url,
}

impl fmt::Display for RedirectHop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status.as_u16(), self.url)
    }
}

/// Final response plus the redirects that preceded it.
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    /// Final status code.
    pub status: StatusCode,
    /// Final URL after redirects.
    pub url: Url,
    /// Response body as text.
    pub body: String,
    /// Redirect hops in request order; empty when answered directly.
    pub history: Vec<RedirectHop>,
}

impl ProbeResponse {
    /// Returns the body with surrounding whitespace removed.
    #[must_use]
    pub fn body_trimmed(&self) -> &str {
        self.body.trim()
    }

    /// Renders the history as `status url` entries joined by `, `.
    #[must_use]
    pub fn history_summary(&self) -> String {
        self.history.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    }
}

/// Server trust anchor loaded once per run.
#[derive(Clone, Default)]
pub struct TrustAnchor {
    /// Parsed CA certificate; `None` uses the platform roots.
    ca: Option<Certificate>,
}

impl fmt::Debug for TrustAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrustAnchor").field("ca", &self.ca.is_some()).finish()
    }
}

impl TrustAnchor {
    /// Loads the CA certificate at `path`, or returns an empty anchor.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ReadCa`] or [`SessionError::InvalidCa`] when the
    /// file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, SessionError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let pem = fs::read(path).map_err(|source| SessionError::ReadCa {
            path: path.display().to_string(),
            source,
        })?;
        let ca = Certificate::from_pem(&pem).map_err(|err| SessionError::InvalidCa {
            path: path.display().to_string(),
            reason: error_chain(&err),
        })?;
        Ok(Self {
            ca: Some(ca),
        })
    }
}

/// Per-session options.
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions<'a> {
    /// Label used in log events (the test name).
    pub label: &'a str,
    /// Server trust anchor.
    pub trust: &'a TrustAnchor,
    /// Client identity to present during the TLS handshake.
    pub identity: Option<(&'a UserId, &'a UserCredential)>,
    /// Optional per-request timeout.
    pub timeout: Option<Duration>,
}

/// Scoped HTTP session with its own connection pool and cookie jar.
///
/// # Invariants
/// - The client never follows redirects itself.
/// - The jar is private to this session.
pub struct GatewaySession {
    /// Underlying HTTP client.
    client: Client,
    /// Cookie jar shared with `client`.
    jar: Arc<Jar>,
    /// Label for log events.
    label: String,
}

impl fmt::Debug for GatewaySession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewaySession").field("label", &self.label).finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: Session
// ============================================================================

impl GatewaySession {
    /// Opens a session for one test case.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when identity files cannot be loaded or the
    /// client cannot be built.
    pub fn open(options: SessionOptions<'_>) -> Result<Self, SessionError> {
        install_crypto_provider();
        let jar = Arc::new(Jar::default());
        let mut builder = Client::builder()
            .use_rustls_tls()
            .redirect(Policy::none())
            .cookie_provider(Arc::clone(&jar));
        if let Some(ca) = &options.trust.ca {
            builder = builder.tls_built_in_root_certs(false).add_root_certificate(ca.clone());
        }
        if let Some((user, credential)) = options.identity {
            builder = builder.identity(load_identity(user, credential)?);
        }
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|err| SessionError::Client(error_chain(&err)))?;
        tracing::info!(test = options.label, mtls = options.identity.is_some(), "session opened");
        Ok(Self {
            client,
            jar,
            label: options.label.to_string(),
        })
    }

    /// Issues a GET.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] on transport failure or a bad redirect chain.
    pub async fn get(
        &self,
        url: &Url,
        follow: FollowRedirects,
    ) -> Result<ProbeResponse, SessionError> {
        self.send(Method::GET, url.clone(), follow).await
    }

    /// Issues a POST with `params` appended to the query string.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] on transport failure or a bad redirect chain.
    pub async fn post_query(
        &self,
        url: &Url,
        params: &[(&str, &str)],
        follow: FollowRedirects,
    ) -> Result<ProbeResponse, SessionError> {
        let mut url = url.clone();
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        self.send(Method::POST, url, follow).await
    }

    /// Returns the `Cookie` header this session would send to `url`.
    #[must_use]
    pub fn cookies_for(&self, url: &Url) -> Option<String> {
        self.jar.cookies(url).and_then(|value| value.to_str().ok().map(str::to_owned))
    }

    /// Sends one logical request, walking redirects when asked.
    async fn send(
        &self,
        method: Method,
        url: Url,
        follow: FollowRedirects,
    ) -> Result<ProbeResponse, SessionError> {
        let origin = url.to_string();
        let mut method = method;
        let mut url = url;
        let mut history = Vec::new();
        loop {
            tracing::debug!(test = %self.label, %method, %url, "sending request");
            let response = self
                .client
                .request(method.clone(), url.clone())
                .send()
                .await
                .map_err(|err| transport_error(&url, &err))?;
            let status = response.status();
            if follow == FollowRedirects::Follow && follows_redirect(status) {
                if let Some(next) = redirect_target(&url, response.headers())? {
                    if history.len() >= MAX_REDIRECTS {
                        return Err(SessionError::TooManyRedirects {
                            url: origin,
                            limit: MAX_REDIRECTS,
                        });
                    }
                    tracing::debug!(
                        test = %self.label,
                        status = status.as_u16(),
                        location = %next,
                        "following redirect"
                    );
                    history.push(RedirectHop {
                        status,
                        url,
                    });
                    method = redirect_method(&method, status);
                    url = next;
                    continue;
                }
            }
            let body = response.text().await.map_err(|err| transport_error(&url, &err))?;
            return Ok(ProbeResponse {
                status,
                url,
                body,
                history,
            });
        }
    }
}

impl Drop for GatewaySession {
    fn drop(&mut self) {
        tracing::info!(test = %self.label, "session closed");
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Installs the process-wide rustls provider; later calls are no-ops.
fn install_crypto_provider() {
    // Err only means a provider is already installed for this process.
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
}

/// Reads a user's certificate and key into a single PEM identity.
fn load_identity(user: &UserId, credential: &UserCredential) -> Result<Identity, SessionError> {
    let read = |path: &Path| {
        fs::read(path).map_err(|source| SessionError::ReadIdentity {
            path: path.display().to_string(),
            source,
        })
    };
    let mut pem = read(&credential.cert)?;
    if !pem.ends_with(b"\n") {
        pem.push(b'\n');
    }
    pem.extend_from_slice(&read(&credential.key)?);
    Identity::from_pem(&pem).map_err(|err| SessionError::InvalidIdentity {
        user: user.clone(),
        reason: error_chain(&err),
    })
}

/// Resolves the `Location` header of a redirect against the current URL.
///
/// Returns `Ok(None)` when the response carries no `Location` header.
pub(crate) fn redirect_target(
    current: &Url,
    headers: &HeaderMap,
) -> Result<Option<Url>, SessionError> {
    let Some(location) = headers.get(LOCATION) else {
        return Ok(None);
    };
    let invalid = || SessionError::InvalidRedirect {
        url: current.to_string(),
        location: String::from_utf8_lossy(location.as_bytes()).into_owned(),
    };
    let location = location.to_str().map_err(|_| invalid())?;
    current.join(location).map(Some).map_err(|_| invalid())
}

/// Returns true for the statuses that are followed: 301, 302, 303, 307, 308.
///
/// Other 3xx responses (300, 304, 305) are returned to the caller even when
/// they carry a `Location` header.
pub(crate) fn follows_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

/// Returns the method to use after a redirect with `status`.
///
/// 302 and 303 downgrade to GET (HEAD is kept), 301 downgrades POST to GET,
/// and 307/308 preserve the method.
pub(crate) fn redirect_method(method: &Method, status: StatusCode) -> Method {
    match status {
        StatusCode::SEE_OTHER | StatusCode::FOUND if *method != Method::HEAD => Method::GET,
        StatusCode::MOVED_PERMANENTLY if *method == Method::POST => Method::GET,
        _ => method.clone(),
    }
}

/// Converts a reqwest error into a transport error with its full cause chain.
fn transport_error(url: &Url, err: &reqwest::Error) -> SessionError {
    SessionError::Transport {
        url: url.to_string(),
        detail: error_chain(err),
    }
}

/// Flattens an error and its sources into one line.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
