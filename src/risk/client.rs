//! Risk provider HTTP client.
//!
//! # Responsibilities
//! - POST one risk request to the configured provider endpoint
//! - Authenticate with HTTP Basic (empty user, shared secret as password)
//! - Race the call against the configured deadline
//! - Classify the response into a [`RiskVerdict`]
//!
//! # Design Decisions
//! - Exactly one outbound call per `check`; retries live in `resilience`
//! - The deadline covers connect, send and body read
//! - Late responses are dropped with the future, never observed
//! - The secret and raw payload never appear in log events

use std::time::{Duration, Instant};

use axum::http::StatusCode;
use thiserror::Error;
use url::Url;

use crate::config::{ApiSecret, RiskConfig};
use crate::observability::metrics;
use crate::resilience::timeouts::with_deadline;
use crate::risk::types::{Decision, RiskRequest, RiskVerdict};
use crate::risk::RiskCheck;

/// Invalid-token error type reported by the provider on 422.
const INVALID_REQUEST_TOKEN: &str = "invalid_request_token";

/// Provider error messages are truncated to this many characters.
const MAX_ERROR_MESSAGE: usize = 256;

/// Error building a [`RiskClient`].
#[derive(Debug, Error)]
pub enum RiskClientError {
    #[error("risk provider API secret is not configured")]
    MissingSecret,

    #[error("invalid risk provider URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Client for the external risk-assessment service.
#[derive(Clone)]
pub struct RiskClient {
    http: reqwest::Client,
    base_url: Url,
    secret: ApiSecret,
    deadline: Duration,
}

impl std::fmt::Debug for RiskClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiskClient")
            .field("base_url", &self.base_url.as_str())
            .field("secret", &self.secret)
            .field("deadline", &self.deadline)
            .finish()
    }
}

impl RiskClient {
    /// Build a client from validated configuration.
    pub fn new(config: &RiskConfig) -> Result<Self, RiskClientError> {
        let secret = config
            .api_secret
            .clone()
            .filter(|s| !s.is_blank())
            .ok_or(RiskClientError::MissingSecret)?;
        let base_url = Url::parse(&config.base_url)?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("risk-gate/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            secret,
            deadline: Duration::from_millis(config.deadline_ms),
        })
    }

    /// Perform one risk check under the configured deadline.
    pub async fn check(&self, request: &RiskRequest) -> RiskVerdict {
        let start = Instant::now();

        let verdict = match with_deadline(self.deadline, self.send(request)).await {
            Ok(verdict) => verdict,
            Err(e) => {
                tracing::warn!(
                    event_type = %request.event_type,
                    deadline_ms = self.deadline.as_millis() as u64,
                    error = %e,
                    "Risk check abandoned"
                );
                RiskVerdict::Timeout
            }
        };

        metrics::record_risk_check(verdict.kind(), start);
        verdict
    }

    async fn send(&self, request: &RiskRequest) -> RiskVerdict {
        let url = match self.base_url.join(request.endpoint.path()) {
            Ok(url) => url,
            Err(e) => return RiskVerdict::provider_error(None, format!("invalid endpoint URL: {}", e)),
        };

        let response = match self
            .http
            .post(url)
            .basic_auth("", Some(self.secret.expose()))
            .json(request)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                let e = e.without_url();
                tracing::warn!(error = %e, "Risk provider unreachable");
                return RiskVerdict::provider_error(None, e.to_string());
            }
        };

        let status = response.status();
        let body = match response.bytes().await {
            Ok(b) => b,
            Err(e) => return RiskVerdict::provider_error(Some(status.as_u16()), e.without_url().to_string()),
        };

        classify(status, &body)
    }
}

impl RiskCheck for RiskClient {
    async fn check(&self, request: &RiskRequest) -> RiskVerdict {
        RiskClient::check(self, request).await
    }
}

/// Map a provider response onto a verdict.
pub fn classify(status: StatusCode, body: &[u8]) -> RiskVerdict {
    match status {
        StatusCode::CREATED => match serde_json::from_slice::<serde_json::Value>(body) {
            Ok(raw) => match Decision::from_payload(raw) {
                Some(decision) => RiskVerdict::Decision(decision),
                None => RiskVerdict::provider_error(Some(201), "response has no recognizable policy action"),
            },
            Err(e) => RiskVerdict::provider_error(Some(201), format!("malformed response body: {}", e)),
        },
        StatusCode::UNPROCESSABLE_ENTITY => {
            let parsed = serde_json::from_slice::<serde_json::Value>(body).ok();
            let error_type = parsed.as_ref().and_then(|v| v.get("type")).and_then(|v| v.as_str());
            let message = parsed
                .as_ref()
                .and_then(|v| v.get("message"))
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| truncate(body));

            if error_type == Some(INVALID_REQUEST_TOKEN) {
                RiskVerdict::InvalidToken { message }
            } else {
                RiskVerdict::provider_error(Some(422), message)
            }
        }
        other => RiskVerdict::provider_error(Some(other.as_u16()), truncate(body)),
    }
}

fn truncate(body: &[u8]) -> String {
    String::from_utf8_lossy(body).chars().take(MAX_ERROR_MESSAGE).collect()
}
