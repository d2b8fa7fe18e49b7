//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Matched request:
//!     → headers.rs (snapshot headers, redact sensitive values)
//!     → ScrubbedHeaders embedded in the outbound risk payload
//! ```
//!
//! # Design Decisions
//! - Nothing sensitive leaves the boundary: redaction happens before the
//!   risk payload is built, not at serialization time
//! - Redaction preserves header presence for downstream auditing

pub mod headers;

pub use headers::{HeaderScrubber, ScrubbedHeaders, ScrubbedValue};
