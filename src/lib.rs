//! Risk gate: request interception in front of an origin service.
//!
//! Inbound requests matching a configured route are checked against an
//! external risk-assessment provider before they reach the origin. The
//! verdict decides whether the request is forwarded or denied; provider
//! failures follow a configurable fail-open / fail-closed policy.

pub mod config;
pub mod gate;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod risk;
pub mod routing;
pub mod security;
pub mod signals;

pub use config::schema::GateConfig;
pub use gate::DecisionGate;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
