//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → routing (does a rule apply?)
//!         no  → forward.rs (stream to origin untouched)
//!         yes → request.rs (snapshot body once)
//!             → gate (extract, scrub, risk call, policy)
//!             → forward.rs (origin) or response.rs (deny)
//!     → Send to client
//! ```

pub mod forward;
pub mod request;
pub mod response;
pub mod server;

pub use forward::{ForwardError, OriginClient};
pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
