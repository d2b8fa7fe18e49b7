//! HTTP server setup and the interception handler.
//!
//! # Responsibilities
//! - Create Axum Router with a catch-all handler
//! - Wire up middleware (request ID, tracing, whole-request timeout)
//! - Bind server to listener with graceful shutdown
//! - Run each request through the decision gate
//! - Forward allowed and unmatched requests to the origin

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{request::Parts, Request, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::Instrument;

use crate::config::{validate_config, ConfigError, GateConfig};
use crate::gate::{DecisionGate, ForwardReason, Outcome};
use crate::http::forward::OriginClient;
use crate::http::request::{
    propagate_request_id_layer, set_request_id_layer, snapshot_body, RequestIdExt,
};
use crate::http::response::bad_gateway;
use crate::lifecycle::startup::StartupError;
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<DecisionGate>,
    pub origin: OriginClient,
    pub max_body_bytes: usize,
}

/// HTTP server for the risk gate.
pub struct HttpServer {
    router: Router,
    config: GateConfig,
}

impl HttpServer {
    /// Validate configuration and build every subsystem.
    pub fn new(config: GateConfig) -> Result<Self, StartupError> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        let gate = Arc::new(DecisionGate::from_config(&config)?);
        let origin = OriginClient::new(&config.origin)?;

        let state = AppState {
            gate,
            origin,
            max_body_bytes: config.limits.max_body_bytes,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GateConfig, state: AppState) -> Router {
        Router::new()
            .route("/", any(gate_handler))
            .route("/{*path}", any(gate_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.limits.request_timeout_secs,
                    )))
                    .layer(propagate_request_id_layer()),
            )
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            origin = %self.config.origin.url,
            routes = self.config.routes.len(),
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Entry point for every inbound request.
async fn gate_handler(State(state): State<AppState>, request: Request<Body>) -> Response<Body> {
    let start = Instant::now();
    let span = tracing::info_span!(
        "request",
        request_id = %request.headers().request_id(),
        method = %request.method(),
        path = %request.uri().path(),
    );

    async move {
        let (outcome, response) = intercept(&state, request).await;
        tracing::debug!(outcome = outcome.label(), status = %response.status(), "Request complete");
        metrics::record_request(outcome.label(), start);
        response
    }
    .instrument(span)
    .await
}

async fn intercept(state: &AppState, request: Request<Body>) -> (Outcome, Response<Body>) {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let (parts, body) = request.into_parts();

    let Some(rule) = state.gate.route(&parts.method, parts.uri.path()) else {
        tracing::debug!("No route matched; forwarding unchanged");
        let response = forward(state, parts, body).await;
        return (Outcome::Forward(ForwardReason::Unmatched), response);
    };

    // The snapshot feeds extraction; the origin gets its own Body over the same bytes.
    let snapshot = snapshot_body(body, state.max_body_bytes).await;
    if snapshot.is_truncated() {
        tracing::warn!(
            event_type = %rule.event_type,
            limit = state.max_body_bytes,
            "Request body not fully buffered; checking without form signals"
        );
    }
    let signal_bytes = snapshot.signal_bytes();

    let evaluation = state.gate.evaluate(rule, &parts.headers, &signal_bytes, peer).await;

    let response = match evaluation.outcome {
        Outcome::Forward(_) => forward(state, parts, snapshot.into_body()).await,
        Outcome::Deny(_) => state.gate.deny_response(evaluation.verdict.as_ref()),
    };
    (evaluation.outcome, response)
}

async fn forward(state: &AppState, parts: Parts, body: Body) -> Response<Body> {
    match state.origin.forward(parts, body).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "Origin request failed");
            bad_gateway()
        }
    }
}
