//! Verdict → outcome policy.
//!
//! | verdict                     | outcome                          |
//! |-----------------------------|----------------------------------|
//! | allow                       | forward                          |
//! | allow, risk > threshold     | deny                             |
//! | challenge                   | forward (or deny if configured)  |
//! | deny                        | deny                             |
//! | invalid token               | deny, regardless of fail mode    |
//! | provider error / timeout    | fail mode (open by default)      |

use serde::{Deserialize, Serialize};

use crate::config::PolicyConfig;
use crate::risk::{PolicyAction, RiskVerdict};

/// What happens when the provider cannot produce a verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailMode {
    /// Forward to origin.
    #[default]
    Open,
    /// Deny.
    Closed,
}

/// How a `challenge` action is treated. The gate cannot serve a challenge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeMode {
    #[default]
    Allow,
    Deny,
}

/// Why a request was forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardReason {
    Unmatched,
    Allowed,
    Challenged,
    FailOpen,
}

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Denied,
    RiskAboveThreshold,
    Challenged,
    InvalidToken,
    FailClosed,
}

/// Final outcome for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Forward(ForwardReason),
    Deny(DenyReason),
}

impl Outcome {
    /// Label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Forward(ForwardReason::Unmatched) => "forward_unmatched",
            Outcome::Forward(ForwardReason::Allowed) => "forward_allowed",
            Outcome::Forward(ForwardReason::Challenged) => "forward_challenged",
            Outcome::Forward(ForwardReason::FailOpen) => "forward_fail_open",
            Outcome::Deny(DenyReason::Denied) => "deny",
            Outcome::Deny(DenyReason::RiskAboveThreshold) => "deny_risk_threshold",
            Outcome::Deny(DenyReason::Challenged) => "deny_challenged",
            Outcome::Deny(DenyReason::InvalidToken) => "deny_invalid_token",
            Outcome::Deny(DenyReason::FailClosed) => "deny_fail_closed",
        }
    }
}

/// Immutable verdict policy.
#[derive(Debug, Clone)]
pub struct VerdictPolicy {
    fail_mode: FailMode,
    challenge: ChallengeMode,
    risk_threshold: Option<f64>,
}

impl VerdictPolicy {
    pub fn new(config: &PolicyConfig, risk_threshold: Option<f64>) -> Self {
        Self {
            fail_mode: config.fail_mode,
            challenge: config.challenge,
            risk_threshold,
        }
    }

    /// Effective fail mode, honoring a per-route override.
    pub fn fail_mode(&self, route_override: Option<FailMode>) -> FailMode {
        route_override.unwrap_or(self.fail_mode)
    }

    /// Outcome used when no verdict could be obtained.
    pub fn on_failure(&self, route_override: Option<FailMode>) -> Outcome {
        match self.fail_mode(route_override) {
            FailMode::Open => Outcome::Forward(ForwardReason::FailOpen),
            FailMode::Closed => Outcome::Deny(DenyReason::FailClosed),
        }
    }

    /// Turn a verdict into an outcome.
    pub fn resolve(&self, verdict: &RiskVerdict, route_override: Option<FailMode>) -> Outcome {
        match verdict {
            RiskVerdict::Decision(decision) => match decision.action {
                PolicyAction::Deny => Outcome::Deny(DenyReason::Denied),
                _ if self.exceeds_threshold(decision.risk) => Outcome::Deny(DenyReason::RiskAboveThreshold),
                PolicyAction::Allow => Outcome::Forward(ForwardReason::Allowed),
                PolicyAction::Challenge => match self.challenge {
                    ChallengeMode::Allow => Outcome::Forward(ForwardReason::Challenged),
                    ChallengeMode::Deny => Outcome::Deny(DenyReason::Challenged),
                },
            },
            RiskVerdict::InvalidToken { .. } => Outcome::Deny(DenyReason::InvalidToken),
            RiskVerdict::ProviderError { .. } | RiskVerdict::Timeout => self.on_failure(route_override),
        }
    }

    fn exceeds_threshold(&self, risk: Option<f64>) -> bool {
        matches!((self.risk_threshold, risk), (Some(threshold), Some(score)) if score > threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::Decision;

    fn decision(action: PolicyAction, risk: Option<f64>) -> RiskVerdict {
        RiskVerdict::Decision(Decision {
            action,
            risk,
            raw: serde_json::json!({}),
        })
    }

    fn policy(fail_mode: FailMode, challenge: ChallengeMode, threshold: Option<f64>) -> VerdictPolicy {
        let config = PolicyConfig {
            fail_mode,
            challenge,
            ..PolicyConfig::default()
        };
        VerdictPolicy::new(&config, threshold)
    }

    #[test]
    fn test_decisions() {
        let p = policy(FailMode::Open, ChallengeMode::Allow, None);
        assert_eq!(p.resolve(&decision(PolicyAction::Allow, None), None), Outcome::Forward(ForwardReason::Allowed));
        assert_eq!(p.resolve(&decision(PolicyAction::Deny, None), None), Outcome::Deny(DenyReason::Denied));
        assert_eq!(
            p.resolve(&decision(PolicyAction::Challenge, None), None),
            Outcome::Forward(ForwardReason::Challenged)
        );
    }

    #[test]
    fn test_challenge_can_deny() {
        let p = policy(FailMode::Open, ChallengeMode::Deny, None);
        assert_eq!(
            p.resolve(&decision(PolicyAction::Challenge, None), None),
            Outcome::Deny(DenyReason::Challenged)
        );
    }

    #[test]
    fn test_risk_threshold() {
        let p = policy(FailMode::Open, ChallengeMode::Allow, Some(0.9));
        assert_eq!(
            p.resolve(&decision(PolicyAction::Allow, Some(0.95)), None),
            Outcome::Deny(DenyReason::RiskAboveThreshold)
        );
        assert_eq!(
            p.resolve(&decision(PolicyAction::Allow, Some(0.9)), None),
            Outcome::Forward(ForwardReason::Allowed)
        );
        assert_eq!(
            p.resolve(&decision(PolicyAction::Allow, None), None),
            Outcome::Forward(ForwardReason::Allowed)
        );
    }

    #[test]
    fn test_invalid_token_always_denies() {
        let verdict = RiskVerdict::InvalidToken { message: "bad".into() };
        for mode in [FailMode::Open, FailMode::Closed] {
            let p = policy(mode, ChallengeMode::Allow, None);
            assert_eq!(p.resolve(&verdict, None), Outcome::Deny(DenyReason::InvalidToken));
            assert_eq!(p.resolve(&verdict, Some(FailMode::Open)), Outcome::Deny(DenyReason::InvalidToken));
        }
    }

    #[test]
    fn test_failures_follow_fail_mode() {
        let open = policy(FailMode::Open, ChallengeMode::Allow, None);
        let closed = policy(FailMode::Closed, ChallengeMode::Allow, None);
        let error = RiskVerdict::provider_error(Some(500), "boom");

        assert_eq!(open.resolve(&RiskVerdict::Timeout, None), Outcome::Forward(ForwardReason::FailOpen));
        assert_eq!(open.resolve(&error, None), Outcome::Forward(ForwardReason::FailOpen));
        assert_eq!(closed.resolve(&RiskVerdict::Timeout, None), Outcome::Deny(DenyReason::FailClosed));
        assert_eq!(closed.resolve(&error, None), Outcome::Deny(DenyReason::FailClosed));

        // per-route override wins
        assert_eq!(
            open.resolve(&RiskVerdict::Timeout, Some(FailMode::Closed)),
            Outcome::Deny(DenyReason::FailClosed)
        );
        assert_eq!(
            closed.resolve(&error, Some(FailMode::Open)),
            Outcome::Forward(ForwardReason::FailOpen)
        );
    }
}
