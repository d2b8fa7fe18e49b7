//! Decision gate: the per-request interception pipeline.
//!
//! # State Machine
//! ```text
//! Unmatched ─────────────────────────────────────────────▶ Forward
//! Matched ─▶ Checking ─┬─ allow / challenge ─────────────▶ Forward
//!                      ├─ deny / risk above threshold ───▶ Denied
//!                      ├─ invalid token ─────────────────▶ Denied
//!                      └─ provider error / timeout ──────▶ fail mode
//!                                                          (open: Forward,
//!                                                           closed: Denied)
//! ```
//!
//! # Design Decisions
//! - Holds only read-only state; one gate serves all requests concurrently
//! - Extraction and scrubbing happen before the risk call, strictly in order
//! - A panic while evaluating maps to the fail mode, never to a 5xx

pub mod policy;

use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;

use axum::body::Body;
use axum::http::{HeaderMap, Method, Response};
use futures_util::FutureExt;

use crate::config::{DenyConfig, GateConfig, RouteRule};
use crate::http::response::deny_response;
use crate::resilience::retries::{check_with_retries, RetryPolicy};
use crate::risk::{RiskCheck, RiskClient, RiskClientError, RiskContext, RiskRequest, RiskVerdict};
use crate::routing::RouteMatcher;
use crate::security::HeaderScrubber;
use crate::signals::SignalExtractor;

pub use policy::{ChallengeMode, DenyReason, FailMode, ForwardReason, Outcome, VerdictPolicy};

/// Result of evaluating one matched request.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub outcome: Outcome,
    /// The verdict that produced the outcome, if the check completed.
    pub verdict: Option<RiskVerdict>,
}

/// Orchestrates routing, extraction, scrubbing, the risk call and the policy.
#[derive(Debug)]
pub struct DecisionGate<C = RiskClient> {
    routes: RouteMatcher,
    extractor: SignalExtractor,
    scrubber: HeaderScrubber,
    checker: C,
    retry: RetryPolicy,
    policy: VerdictPolicy,
    deny: DenyConfig,
}

impl DecisionGate<RiskClient> {
    /// Build a gate backed by the HTTP risk client.
    pub fn from_config(config: &GateConfig) -> Result<Self, RiskClientError> {
        let client = RiskClient::new(&config.risk)?;
        Ok(Self::with_checker(config, client))
    }
}

impl<C: RiskCheck> DecisionGate<C> {
    /// Build a gate around any risk checker.
    pub fn with_checker(config: &GateConfig, checker: C) -> Self {
        Self {
            routes: RouteMatcher::from_rules(config.routes.clone()),
            extractor: SignalExtractor::new(&config.signals),
            scrubber: HeaderScrubber::new(&config.scrub.headers),
            checker,
            retry: RetryPolicy::from_config(&config.risk.retries),
            policy: VerdictPolicy::new(&config.policy, config.risk.risk_threshold),
            deny: config.policy.deny.clone(),
        }
    }

    /// The rule applying to this request, if any.
    pub fn route(&self, method: &Method, path: &str) -> Option<&RouteRule> {
        self.routes.match_route(method, path)
    }

    /// Assemble the outbound payload from a request snapshot.
    pub fn build_request(
        &self,
        rule: &RouteRule,
        headers: &HeaderMap,
        body: &[u8],
        peer: Option<SocketAddr>,
    ) -> RiskRequest {
        let signals = self.extractor.extract(headers, body);

        RiskRequest {
            endpoint: rule.endpoint,
            event_type: rule.event_type.clone(),
            status: rule.event_status.clone(),
            name: rule.event_name.clone(),
            request_token: signals.request_token,
            user: signals.user,
            properties: rule.properties.clone(),
            context: RiskContext {
                ip: self.extractor.client_ip(headers, peer),
                headers: self.scrubber.scrub(headers),
            },
        }
    }

    /// Run the risk check for a matched request and resolve the outcome.
    pub async fn evaluate(
        &self,
        rule: &RouteRule,
        headers: &HeaderMap,
        body: &[u8],
        peer: Option<SocketAddr>,
    ) -> Evaluation {
        let pipeline = async {
            let request = self.build_request(rule, headers, body, peer);
            let token_present = request.request_token.is_some();
            let verdict = check_with_retries(&self.checker, &request, &self.retry).await;
            let outcome = self.policy.resolve(&verdict, rule.fail_mode);

            tracing::info!(
                event_type = %rule.event_type,
                token_present,
                verdict = verdict.kind(),
                outcome = outcome.label(),
                "Risk decision"
            );
            if let RiskVerdict::ProviderError { status, message } = &verdict {
                tracing::warn!(status = ?status, message = %message, "Risk provider error");
            }

            Evaluation {
                outcome,
                verdict: Some(verdict),
            }
        };

        match AssertUnwindSafe(pipeline).catch_unwind().await {
            Ok(evaluation) => evaluation,
            Err(_) => {
                let outcome = self.policy.on_failure(rule.fail_mode);
                tracing::error!(
                    event_type = %rule.event_type,
                    outcome = outcome.label(),
                    "Risk evaluation panicked; applying fail mode"
                );
                Evaluation { outcome, verdict: None }
            }
        }
    }

    /// The deny response for this gate's configuration.
    pub fn deny_response(&self, verdict: Option<&RiskVerdict>) -> Response<Body> {
        deny_response(&self.deny, verdict)
    }
}
