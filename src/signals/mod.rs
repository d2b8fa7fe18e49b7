//! Signal extraction subsystem.
//!
//! # Data Flow
//! ```text
//! Buffered request (headers + body snapshot)
//!     → extractor.rs
//!         - request token   (form field or header, per config)
//!         - user attributes (form field or header, per config)
//!         - client IP       (ordered header list, then peer address)
//!     → Signals (all optional)
//! ```
//!
//! # Design Decisions
//! - Extraction never fails: an unparsable body means "no signals"
//! - Sources are configuration, so a header-based token needs no code change
//! - Works on a byte snapshot; the body forwarded to origin is untouched

pub mod extractor;

use serde::{Deserialize, Serialize};

pub use extractor::{SignalExtractor, Signals};

/// Where a signal value is read from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSource {
    /// A field of a form-encoded body.
    FormField(String),
    /// A request header (case-insensitive).
    Header(String),
}
