//! Risk assessment subsystem.
//!
//! # Data Flow
//! ```text
//! RiskRequest (event, token, user, scrubbed context)
//!     → client.rs (one POST, Basic auth, deadline race)
//!     → classify response:
//!         201            → Decision { allow | deny | challenge }
//!         422 bad token  → InvalidToken
//!         other / error  → ProviderError
//!         deadline       → Timeout
//!     → RiskVerdict consumed by the decision gate
//! ```
//!
//! # Design Decisions
//! - Expected outcomes are enum variants, not errors
//! - The client never retries on its own

pub mod client;
pub mod types;

use std::future::Future;

pub use client::{RiskClient, RiskClientError};
pub use types::{Decision, PolicyAction, RiskContext, RiskEndpoint, RiskRequest, RiskVerdict};

/// Anything that can turn a risk request into a verdict.
pub trait RiskCheck: Send + Sync {
    fn check(&self, request: &RiskRequest) -> impl Future<Output = RiskVerdict> + Send;
}
