//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gate.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::secret::ApiSecret;
use crate::gate::policy::{ChallengeMode, FailMode};
use crate::risk::types::RiskEndpoint;
use crate::signals::SignalSource;

/// Root configuration for the risk gate.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GateConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The origin service being protected.
    pub origin: OriginConfig,

    /// Risk provider connection settings.
    pub risk: RiskConfig,

    /// Header redaction applied before anything leaves the boundary.
    pub scrub: ScrubConfig,

    /// Where request tokens and user attributes come from.
    pub signals: SignalConfig,

    /// Allow/deny/fail policy.
    pub policy: PolicyConfig,

    /// Ordered route rules. First match wins.
    pub routes: Vec<RouteRule>,

    /// Request size and time limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Origin service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OriginConfig {
    /// Base URL of the origin (e.g., "http://127.0.0.1:3000").
    pub url: String,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:3000".to_string(),
        }
    }
}

/// Risk provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Provider API base URL.
    pub base_url: String,

    /// Shared API secret. Required.
    pub api_secret: Option<ApiSecret>,

    /// App identifier for the client-side script. Optional.
    pub app_id: Option<String>,

    /// Deadline for a single risk call in milliseconds.
    pub deadline_ms: u64,

    /// Deny when the provider's risk score exceeds this value (0.0..=1.0).
    pub risk_threshold: Option<f64>,

    /// Retry settings around the risk call.
    pub retries: RetryConfig,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.castle.io".to_string(),
            api_secret: None,
            app_id: None,
            deadline_ms: 2000,
            risk_threshold: None,
            retries: RetryConfig::default(),
        }
    }
}

/// Retry configuration for the risk call.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first (1 = never retry).
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            base_delay_ms: 50,
            max_delay_ms: 500,
        }
    }
}

/// Header redaction configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScrubConfig {
    /// Header names to redact (case-insensitive).
    pub headers: Vec<String>,
}

impl Default for ScrubConfig {
    fn default() -> Self {
        Self {
            headers: vec!["cookie".to_string(), "authorization".to_string()],
        }
    }
}

/// Signal extraction configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Source of the request token.
    pub token: SignalSource,

    /// User attributes keyed by the name sent to the provider.
    pub user: BTreeMap<String, SignalSource>,

    /// Headers consulted, in order, for the client IP.
    pub ip_headers: Vec<String>,
}

impl Default for SignalConfig {
    fn default() -> Self {
        let mut user = BTreeMap::new();
        user.insert("email".to_string(), SignalSource::FormField("email".to_string()));

        Self {
            token: SignalSource::FormField("castle_request_token".to_string()),
            user,
            ip_headers: vec!["cf-connecting-ip".to_string(), "x-forwarded-for".to_string()],
        }
    }
}

/// Verdict policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PolicyConfig {
    /// What to do when the provider errors or times out.
    pub fail_mode: FailMode,

    /// How a `challenge` action is treated.
    pub challenge: ChallengeMode,

    /// Shape of the deny response.
    pub deny: DenyConfig,
}

/// Deny response configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DenyConfig {
    /// HTTP status of the deny response.
    pub status: u16,

    /// Body sent when the verdict is not echoed.
    pub body: String,

    /// Echo the provider payload back to the caller.
    pub echo_verdict: bool,
}

impl Default for DenyConfig {
    fn default() -> Self {
        Self {
            status: 403,
            body: "Forbidden".to_string(),
            echo_verdict: false,
        }
    }
}

/// A request that needs a risk check, and the event metadata to send.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteRule {
    /// HTTP method (exact match).
    pub method: String,

    /// Request path (exact match).
    pub path: String,

    /// Provider event type (e.g., "$registration").
    pub event_type: String,

    /// Provider event status (e.g., "$attempted").
    #[serde(default)]
    pub event_status: Option<String>,

    /// Custom event name.
    #[serde(default)]
    pub event_name: Option<String>,

    /// Provider endpoint used for this route.
    #[serde(default)]
    pub endpoint: RiskEndpoint,

    /// Overrides `policy.fail_mode` for this route.
    #[serde(default)]
    pub fail_mode: Option<FailMode>,

    /// Static properties attached to every check.
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl RouteRule {
    /// Create a rule with default endpoint and no overrides.
    pub fn new(
        method: impl Into<String>,
        path: impl Into<String>,
        event_type: impl Into<String>,
    ) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            event_type: event_type.into(),
            event_status: None,
            event_name: None,
            endpoint: RiskEndpoint::default(),
            fail_mode: None,
            properties: serde_json::Map::new(),
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum body size buffered for a checked request.
    pub max_body_bytes: usize,

    /// Whole-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 1024 * 1024,
            request_timeout_secs: 30,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Pretty,
    #[default]
    Compact,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Compact,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
