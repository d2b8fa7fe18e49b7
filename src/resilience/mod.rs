//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Risk check:
//!     → timeouts.rs (race the call against its deadline)
//!     → On transient failure: retries.rs (optional retry with backoff.rs)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Retries are an explicit layer around the client, never inside it

pub mod backoff;
pub mod retries;
pub mod timeouts;
