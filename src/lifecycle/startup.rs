//! Startup orchestration.
//!
//! # Responsibilities
//! - Surface every fatal startup condition as one error type
//! - Start the optional metrics exporter
//! - Bind the listener last, once the gate is ready
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - A missing shared secret stops the process before traffic arrives

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{ConfigError, GateConfig};
use crate::http::ForwardError;
use crate::observability::metrics;
use crate::risk::RiskClientError;

/// Fatal error during startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    RiskClient(#[from] RiskClientError),

    #[error(transparent)]
    Origin(#[from] ForwardError),

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),

    #[error("failed to install metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Install the Prometheus exporter when enabled.
pub fn start_metrics(config: &GateConfig) -> Result<(), StartupError> {
    if !config.observability.metrics_enabled {
        return Ok(());
    }

    let addr: SocketAddr = config
        .observability
        .metrics_address
        .parse()
        .map_err(|_| StartupError::MetricsAddress(config.observability.metrics_address.clone()))?;
    metrics::init_metrics(addr)?;

    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Bind the configured listener address.
pub async fn bind_listener(config: &GateConfig) -> Result<TcpListener, StartupError> {
    let address = config.listener.bind_address.clone();
    TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })
}
