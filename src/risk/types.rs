//! Risk request and verdict types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::security::ScrubbedHeaders;

/// Provider endpoint a route reports to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskEndpoint {
    /// `POST /v1/filter`, for unauthenticated events (registration, login attempts).
    #[default]
    Filter,
    /// `POST /v1/risk`, for events with a known user.
    Risk,
    /// `POST /v1/authenticate?include=risk`, the legacy scoring endpoint.
    Authenticate,
}

impl RiskEndpoint {
    /// Path and query relative to the provider base URL.
    pub fn path(&self) -> &'static str {
        match self {
            RiskEndpoint::Filter => "/v1/filter",
            RiskEndpoint::Risk => "/v1/risk",
            RiskEndpoint::Authenticate => "/v1/authenticate?include=risk",
        }
    }
}

/// Request context forwarded to the provider.
#[derive(Debug, Clone, Serialize)]
pub struct RiskContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    pub headers: ScrubbedHeaders,
}

/// Outbound risk-check payload. Built per request and dropped after the call.
#[derive(Debug, Clone, Serialize)]
pub struct RiskRequest {
    #[serde(skip)]
    pub endpoint: RiskEndpoint,

    #[serde(rename = "type")]
    pub event_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_token: Option<String>,

    pub user: BTreeMap<String, String>,

    pub properties: serde_json::Map<String, serde_json::Value>,

    pub context: RiskContext,
}

/// Action declared by the provider policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyAction {
    Allow,
    Deny,
    Challenge,
}

impl PolicyAction {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "allow" => Some(PolicyAction::Allow),
            "deny" => Some(PolicyAction::Deny),
            "challenge" => Some(PolicyAction::Challenge),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyAction::Allow => "allow",
            PolicyAction::Deny => "deny",
            PolicyAction::Challenge => "challenge",
        }
    }
}

/// A successful provider assessment.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub action: PolicyAction,
    /// Risk score in 0.0..=1.0 when the provider reports one.
    pub risk: Option<f64>,
    /// Untouched provider payload.
    pub raw: serde_json::Value,
}

impl Decision {
    /// Read `policy.action` (or a top-level `action`) and `risk` from a payload.
    pub fn from_payload(raw: serde_json::Value) -> Option<Self> {
        let action = raw
            .pointer("/policy/action")
            .or_else(|| raw.get("action"))
            .and_then(|v| v.as_str())
            .and_then(PolicyAction::parse)?;
        let risk = raw.get("risk").and_then(|v| v.as_f64());

        Some(Self { action, risk, raw })
    }
}

/// Classified outcome of one risk call.
#[derive(Debug, Clone, PartialEq)]
pub enum RiskVerdict {
    Decision(Decision),
    InvalidToken { message: String },
    ProviderError { status: Option<u16>, message: String },
    Timeout,
}

impl RiskVerdict {
    pub fn provider_error(status: Option<u16>, message: impl Into<String>) -> Self {
        RiskVerdict::ProviderError {
            status,
            message: message.into(),
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RiskVerdict::Decision(d) => d.action.as_str(),
            RiskVerdict::InvalidToken { .. } => "invalid_token",
            RiskVerdict::ProviderError { .. } => "provider_error",
            RiskVerdict::Timeout => "timeout",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_urls() {
        let base = url::Url::parse("https://api.castle.io").unwrap();
        assert_eq!(
            base.join(RiskEndpoint::Filter.path()).unwrap().as_str(),
            "https://api.castle.io/v1/filter"
        );
        let authenticate = base.join(RiskEndpoint::Authenticate.path()).unwrap();
        assert_eq!(authenticate.path(), "/v1/authenticate");
        assert_eq!(authenticate.query(), Some("include=risk"));
    }

    #[test]
    fn test_decision_from_policy_action() {
        let d = Decision::from_payload(json!({ "risk": 0.42, "policy": { "action": "deny" } })).unwrap();
        assert_eq!(d.action, PolicyAction::Deny);
        assert_eq!(d.risk, Some(0.42));
    }

    #[test]
    fn test_decision_from_legacy_action() {
        let d = Decision::from_payload(json!({ "action": "challenge" })).unwrap();
        assert_eq!(d.action, PolicyAction::Challenge);
        assert_eq!(d.risk, None);
    }

    #[test]
    fn test_decision_requires_known_action() {
        assert!(Decision::from_payload(json!({ "policy": { "action": "shrug" } })).is_none());
        assert!(Decision::from_payload(json!({ "risk": 0.1 })).is_none());
    }

    #[test]
    fn test_request_serialization() {
        let request = RiskRequest {
            endpoint: RiskEndpoint::Filter,
            event_type: "$registration".into(),
            status: None,
            name: None,
            request_token: Some("abc123".into()),
            user: BTreeMap::from([("email".to_string(), "a@b.c".to_string())]),
            properties: serde_json::Map::new(),
            context: RiskContext {
                ip: Some("1.2.3.4".into()),
                headers: ScrubbedHeaders::default(),
            },
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "$registration",
                "request_token": "abc123",
                "user": { "email": "a@b.c" },
                "properties": {},
                "context": { "ip": "1.2.3.4", "headers": {} }
            })
        );
    }
}
