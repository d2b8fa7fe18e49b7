//! Risk gate binary.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────────┐
//!                        │                      RISK GATE                       │
//!                        │                                                      │
//!   Client Request       │  ┌─────────┐   ┌─────────┐   no match                │
//!   ─────────────────────┼─▶│  http   │──▶│ routing │──────────────────┐        │
//!                        │  │ server  │   └────┬────┘                  │        │
//!                        │  └─────────┘        │ match                 │        │
//!                        │                     ▼                       │        │
//!                        │  ┌──────────┐  ┌──────────┐  ┌──────────┐   │        │
//!                        │  │ signals  │─▶│   risk   │─▶│   gate   │   │        │
//!                        │  │ security │  │  client  │  │  policy  │   │        │
//!                        │  └──────────┘  └────┬─────┘  └────┬─────┘   │        │
//!                        │                     │ deadline     │ forward │        │
//!                        │                     ▼              ▼         ▼        │
//!   Client Response      │               Risk provider   ┌──────────────────┐   │
//!   ◀────────────────────┼───────────── (deny) ◀──────── │  origin forward  │───┼──▶ Origin
//!                        │                               └──────────────────┘   │
//!                        └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use risk_gate::config::{load_config, load_from_env};
use risk_gate::lifecycle::signals::spawn_signal_listener;
use risk_gate::lifecycle::startup::{bind_listener, start_metrics};
use risk_gate::observability::logging::init_logging;
use risk_gate::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "risk-gate")]
#[command(about = "Risk-checking gate in front of an origin service", long_about = None)]
struct Cli {
    /// TOML configuration file. Without it, defaults plus environment are used.
    #[arg(short, long, env = "RISK_GATE_CONFIG")]
    config: Option<PathBuf>,

    /// Validate configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => load_from_env()?,
    };

    init_logging(&config.observability)?;

    if cli.check {
        tracing::info!(routes = config.routes.len(), "Configuration is valid");
        return Ok(());
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        origin = %config.origin.url,
        deadline_ms = config.risk.deadline_ms,
        fail_mode = ?config.policy.fail_mode,
        app_id = config.risk.app_id.as_deref().unwrap_or("-"),
        "risk-gate v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    start_metrics(&config)?;

    let server = HttpServer::new(config.clone())?;
    let listener = bind_listener(&config).await?;

    let shutdown = Shutdown::new();
    spawn_signal_listener(&shutdown);

    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
