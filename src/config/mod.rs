//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) + environment (CASTLE_API_SECRET, ...)
//!     → loader.rs (parse, deserialize, env overlay)
//!     → validation.rs (semantic checks, missing secret is fatal)
//!     → GateConfig (validated, immutable)
//!     → shared via Arc to the decision gate and server
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no hot reload
//! - All fields have defaults except the shared secret
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod secret;
pub mod validation;

pub use loader::{load_config, load_from_env, ConfigError};
pub use schema::{
    DenyConfig, GateConfig, LimitsConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    OriginConfig, PolicyConfig, RetryConfig, RiskConfig, RouteRule, ScrubConfig, SignalConfig,
};
pub use secret::ApiSecret;
pub use validation::{validate_config, ValidationError};
