//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Gate and server produce:
//!     → logging.rs (structured log events, request-id spans)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout log aggregation
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every event via the request span
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
