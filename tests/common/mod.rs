//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{body::Body, extract::State, http::Request, routing::any, Router};
use tokio::net::TcpListener;

use risk_gate::config::{ApiSecret, GateConfig, RouteRule};
use risk_gate::{HttpServer, Shutdown};

pub const TEST_SECRET: &str = "test-secret";

/// Basic auth header value for an empty user and `TEST_SECRET`.
pub const TEST_AUTHORIZATION: &str = "Basic OnRlc3Qtc2VjcmV0";

/// One request as seen by the mock origin.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct SeenRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl SeenRequest {
    #[allow(dead_code)]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Requests received by a mock origin, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct OriginLog(Arc<Mutex<Vec<SeenRequest>>>);

impl OriginLog {
    pub fn count(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    #[allow(dead_code)]
    pub fn last(&self) -> Option<SeenRequest> {
        self.0.lock().unwrap().last().cloned()
    }
}

/// Start a mock origin that records every request and answers 200 "origin ok".
pub async fn start_mock_origin() -> (SocketAddr, OriginLog) {
    let log = OriginLog::default();

    async fn record(State(log): State<OriginLog>, request: Request<Body>) -> &'static str {
        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();
        let headers = parts
            .headers
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_str().unwrap_or_default().to_string()))
            .collect();

        log.0.lock().unwrap().push(SeenRequest {
            method: parts.method.to_string(),
            path: parts.uri.path().to_string(),
            headers,
            body: body.to_vec(),
        });
        "origin ok"
    }

    let app = Router::new()
        .route("/", any(record))
        .route("/{*path}", any(record))
        .with_state(log.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, log)
}

/// An address nothing listens on.
#[allow(dead_code)]
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Gate config protecting `POST /users/sign_up` with a `$registration` filter check.
pub fn gate_config(origin: SocketAddr, risk_base_url: &str) -> GateConfig {
    let mut config = GateConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.origin.url = format!("http://{origin}");
    config.risk.base_url = risk_base_url.to_string();
    config.risk.api_secret = Some(ApiSecret::new(TEST_SECRET));

    let mut rule = RouteRule::new("POST", "/users/sign_up", "$registration");
    rule.event_status = Some("$attempted".to_string());
    config.routes = vec![rule];
    config
}

/// Start the gate on an ephemeral port.
pub async fn start_gate(config: GateConfig) -> (SocketAddr, Shutdown) {
    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// POST the registration form through the gate.
pub async fn post_sign_up(gate: SocketAddr, body: &'static str) -> reqwest::Response {
    client()
        .post(format!("http://{gate}/users/sign_up"))
        .header("content-type", "application/x-www-form-urlencoded")
        .header("cookie", "session=xyz")
        .body(body)
        .send()
        .await
        .unwrap()
}
