// crates/authgate-check/src/tests/support.rs
// ============================================================================
// Module: Test HTTP Server
// Description: Minimal plain-HTTP server for session and suite unit tests.
// Purpose: Script gateway responses and record what the client sent.
// Dependencies: hyper, hyper-util, http-body-util, tokio
// ============================================================================

//! ## Overview
//! [`TestHttpServer`] binds an ephemeral loopback port, answers every request
//! through a caller-supplied handler, and records each request so tests can
//! assert on methods, queries, and cookies.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;

use bytes::Bytes;
use http_body_util::Full;
use hyper::Request;
use hyper::Response;
use hyper::StatusCode;
use hyper::body::Incoming;
use hyper::header::COOKIE;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use reqwest::Url;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Request as seen by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub cookie: Option<String>,
}

impl RecordedRequest {
    fn from_request(req: &Request<Incoming>) -> Self {
        Self {
            method: req.method().to_string(),
            path: req.uri().path().to_string(),
            query: req.uri().query().map(str::to_owned),
            cookie: req
                .headers()
                .get(COOKIE)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned),
        }
    }

    /// Returns true when the cookie header carries `name=value`.
    pub fn has_cookie(&self, pair: &str) -> bool {
        self.cookie.as_deref().is_some_and(|cookie| cookie.split("; ").any(|item| item == pair))
    }
}

/// Scripted response.
pub struct TestResponse {
    status: StatusCode,
    headers: Vec<(&'static str, String)>,
    body: String,
}

impl TestResponse {
    pub fn ok(body: &str) -> Self {
        Self::status(StatusCode::OK, body)
    }

    pub fn status(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    pub fn redirect(status: StatusCode, location: &str) -> Self {
        Self::status(status, "").with_header("location", location)
    }

    pub fn with_header(mut self, name: &'static str, value: &str) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }

    fn into_response(self) -> Response<Full<Bytes>> {
        let mut builder = Response::builder().status(self.status);
        for (name, value) in self.headers {
            builder = builder.header(name, value);
        }
        builder.body(Full::new(Bytes::from(self.body))).expect("valid test response")
    }
}

/// Loopback HTTP server driven by a handler closure.
pub struct TestHttpServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    shutdown: Option<oneshot::Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl TestHttpServer {
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&RecordedRequest) -> TestResponse + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind test server");
        let addr = listener.local_addr().expect("test server addr");
        let handler = Arc::new(handler);
        let requests = Arc::new(Mutex::new(Vec::new()));
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let recorded = Arc::clone(&requests);
        let join = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    accepted = listener.accept() => {
                        let Ok((stream, _)) = accepted else {
                            continue;
                        };
                        let handler = Arc::clone(&handler);
                        let recorded = Arc::clone(&recorded);
                        tokio::spawn(async move {
                            let service = service_fn(move |req: Request<Incoming>| {
                                let handler = Arc::clone(&handler);
                                let recorded = Arc::clone(&recorded);
                                async move {
                                    let request = RecordedRequest::from_request(&req);
                                    recorded.lock().expect("requests lock").push(request.clone());
                                    Ok::<_, Infallible>(handler(&request).into_response())
                                }
                            });
                            let _ = http1::Builder::new()
                                .serve_connection(TokioIo::new(stream), service)
                                .await;
                        });
                    }
                }
            }
        });
        Self {
            addr,
            requests,
            shutdown: Some(shutdown_tx),
            join: Some(join),
        }
    }

    pub fn url(&self, path: &str) -> Url {
        Url::parse(&format!("http://{}{path}", self.addr)).expect("test server url")
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub async fn shutdown(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.await;
        }
    }
}

/// Returns a loopback URL on a port nothing listens on.
pub fn closed_port_url(path: &str) -> Url {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind probe port");
    let addr = listener.local_addr().expect("probe addr");
    drop(listener);
    Url::parse(&format!("http://{addr}{path}")).expect("closed port url")
}

/// Scripted gateway with a form login at `/idp/login` and a protected `/api`.
///
/// Accepts `user2`/`password2`. When `honor_cookie` is false the gateway
/// forgets every session and keeps redirecting.
pub fn form_gateway(honor_cookie: bool) -> impl Fn(&RecordedRequest) -> TestResponse {
    move |req| match (req.method.as_str(), req.path.as_str()) {
        ("GET", "/api") if honor_cookie && req.has_cookie("session=ok") => {
            TestResponse::ok("hello user2\n")
        }
        ("GET", "/api") => TestResponse::redirect(StatusCode::FOUND, "/idp/login"),
        ("GET", "/idp/login") => TestResponse::ok("<form></form>"),
        ("POST", "/idp/login") => {
            let query = req.query.as_deref().unwrap_or_default();
            if query == "name=user2&password=password2" {
                TestResponse::ok("welcome user2").with_header("set-cookie", "session=ok; Path=/")
            } else {
                TestResponse::status(StatusCode::UNAUTHORIZED, "denied")
            }
        }
        _ => TestResponse::status(StatusCode::NOT_FOUND, ""),
    }
}
