//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (ordered rule lookup)
//!     → matcher.rs (evaluate method + exact path)
//!     → Return: matched RouteRule or NoMatch
//!
//! Route Compilation (at startup):
//!     RouteRule[] (configuration order)
//!     → Compile matchers
//!     → Freeze as immutable RouteMatcher
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same rule
//! - First match wins (configuration order)

pub mod matcher;
pub mod router;

pub use router::RouteMatcher;
