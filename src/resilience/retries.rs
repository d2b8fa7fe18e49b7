//! Retry layering around risk checks.
//!
//! # Responsibilities
//! - Decide whether a verdict is worth another attempt
//! - Re-issue the check with exponential backoff + jitter
//!
//! # Design Decisions
//! - Off by default (`max_attempts = 1`)
//! - Only transport failures and 5xx responses are retried
//! - Decisions, invalid tokens and timeouts are final: a timeout already
//!   spent the whole deadline

use crate::config::RetryConfig;
use std::time::Duration;

use crate::resilience::backoff::{calculate_backoff, max_backoff};
use crate::risk::{RiskCheck, RiskRequest, RiskVerdict};

/// Retry policy applied by the decision gate.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay_ms: u64,
    max_delay_ms: u64,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay_ms: config.base_delay_ms,
            max_delay_ms: config.max_delay_ms,
        }
    }

    /// A policy that issues exactly one call.
    #[cfg(test)]
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay_ms: 0,
            max_delay_ms: 0,
        }
    }

    /// Longest time every attempt plus backoff can take under `deadline`.
    pub fn worst_case_budget(&self, deadline: Duration) -> Duration {
        let sleeps: Duration = (1..self.max_attempts)
            .map(|attempt| max_backoff(attempt, self.base_delay_ms, self.max_delay_ms))
            .sum();
        deadline.saturating_mul(self.max_attempts).saturating_add(sleeps)
    }
}

/// True when a verdict reflects transient provider trouble.
pub fn is_retryable(verdict: &RiskVerdict) -> bool {
    match verdict {
        RiskVerdict::ProviderError { status: None, .. } => true,
        RiskVerdict::ProviderError { status: Some(s), .. } => *s >= 500,
        RiskVerdict::Decision(_) | RiskVerdict::InvalidToken { .. } | RiskVerdict::Timeout => false,
    }
}

/// Run `checker` under `policy`, returning the last verdict.
pub async fn check_with_retries<C>(checker: &C, request: &RiskRequest, policy: &RetryPolicy) -> RiskVerdict
where
    C: RiskCheck,
{
    let mut attempts = 0;

    loop {
        attempts += 1;
        let verdict = checker.check(request).await;

        if attempts >= policy.max_attempts || !is_retryable(&verdict) {
            return verdict;
        }

        let backoff = calculate_backoff(attempts, policy.base_delay_ms, policy.max_delay_ms);
        tracing::info!(
            event_type = %request.event_type,
            attempt = attempts,
            delay = ?backoff,
            verdict = verdict.kind(),
            "Retrying risk check"
        );
        tokio::time::sleep(backoff).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::{Decision, PolicyAction, RiskContext, RiskEndpoint};
    use crate::security::ScrubbedHeaders;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    struct Scripted {
        verdicts: Mutex<Vec<RiskVerdict>>,
        calls: AtomicU32,
    }

    impl Scripted {
        fn new(mut verdicts: Vec<RiskVerdict>) -> Self {
            verdicts.reverse();
            Self {
                verdicts: Mutex::new(verdicts),
                calls: AtomicU32::new(0),
            }
        }
    }

    impl RiskCheck for Scripted {
        async fn check(&self, _request: &RiskRequest) -> RiskVerdict {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.verdicts.lock().unwrap().pop().unwrap_or(RiskVerdict::Timeout)
        }
    }

    fn request() -> RiskRequest {
        RiskRequest {
            endpoint: RiskEndpoint::Filter,
            event_type: "$login".into(),
            status: None,
            name: None,
            request_token: None,
            user: Default::default(),
            properties: Default::default(),
            context: RiskContext {
                ip: None,
                headers: ScrubbedHeaders::default(),
            },
        }
    }

    fn allow() -> RiskVerdict {
        RiskVerdict::Decision(Decision {
            action: PolicyAction::Allow,
            risk: None,
            raw: serde_json::json!({}),
        })
    }

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::from_config(&RetryConfig {
            max_attempts,
            base_delay_ms: 1,
            max_delay_ms: 2,
        })
    }

    #[test]
    fn test_worst_case_budget() {
        let deadline = Duration::from_millis(2000);
        assert_eq!(RetryPolicy::none().worst_case_budget(deadline), deadline);

        let policy = RetryPolicy::from_config(&RetryConfig {
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 150,
        });
        // 3 x 2000 + (100 + 10) + (150 + 15)
        assert_eq!(policy.worst_case_budget(deadline), Duration::from_millis(6275));
    }

    #[tokio::test]
    async fn test_single_attempt_by_default() {
        let checker = Scripted::new(vec![RiskVerdict::provider_error(Some(503), "down"), allow()]);
        let verdict = check_with_retries(&checker, &request(), &RetryPolicy::none()).await;

        assert_eq!(verdict, RiskVerdict::provider_error(Some(503), "down"));
        assert_eq!(checker.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_transient_errors() {
        let checker = Scripted::new(vec![
            RiskVerdict::provider_error(None, "connection refused"),
            RiskVerdict::provider_error(Some(502), "bad gateway"),
            allow(),
        ]);
        let verdict = check_with_retries(&checker, &request(), &policy(3)).await;

        assert_eq!(verdict, allow());
        assert_eq!(checker.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_final_verdicts_are_not_retried() {
        for first in [
            RiskVerdict::Timeout,
            RiskVerdict::InvalidToken { message: "bad".into() },
            RiskVerdict::provider_error(Some(422), "invalid"),
            allow(),
        ] {
            let checker = Scripted::new(vec![first.clone(), allow()]);
            let verdict = check_with_retries(&checker, &request(), &policy(3)).await;
            assert_eq!(verdict, first);
            assert_eq!(checker.calls.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let checker = Scripted::new(vec![
            RiskVerdict::provider_error(Some(500), "a"),
            RiskVerdict::provider_error(Some(500), "b"),
            allow(),
        ]);
        let verdict = check_with_retries(&checker, &request(), &policy(2)).await;

        assert_eq!(verdict, RiskVerdict::provider_error(Some(500), "b"));
        assert_eq!(checker.calls.load(Ordering::SeqCst), 2);
    }
}
