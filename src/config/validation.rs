//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject a missing shared secret before any traffic is served
//! - Validate value ranges (deadline > 0, deny status is an error status)
//! - Keep the whole-request timeout above every risk attempt plus backoff
//! - Validate route rules (known method, absolute path)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GateConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::time::Duration;

use axum::http::Method;
use thiserror::Error;

use crate::config::schema::GateConfig;
use crate::resilience::retries::RetryPolicy;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("risk.api_secret is required (set CASTLE_API_SECRET)")]
    MissingApiSecret,

    #[error("risk.app_id is set but empty")]
    EmptyAppId,

    #[error("risk.deadline_ms must be greater than zero")]
    ZeroDeadline,

    #[error("risk.base_url is not a valid URL: {0}")]
    InvalidBaseUrl(String),

    #[error("risk.risk_threshold must be within 0.0..=1.0, got {0}")]
    InvalidRiskThreshold(f64),

    #[error("risk.retries.max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("origin.url must be a plain http URL: {0}")]
    InvalidOriginUrl(String),

    #[error("policy.deny.status must be within 400..=599, got {0}")]
    InvalidDenyStatus(u16),

    #[error("route {index}: invalid method '{method}'")]
    InvalidRouteMethod { index: usize, method: String },

    #[error("route {index}: path '{path}' must start with '/'")]
    InvalidRoutePath { index: usize, path: String },

    #[error("route {index}: event_type must not be empty")]
    EmptyEventType { index: usize },

    #[error("limits.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("limits.request_timeout_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error(
        "limits.request_timeout_secs ({timeout_ms} ms) must exceed the worst-case risk check time ({budget_ms} ms)"
    )]
    RequestTimeoutWithinRiskBudget { timeout_ms: u128, budget_ms: u128 },
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match &config.risk.api_secret {
        Some(secret) if !secret.is_blank() => {}
        _ => errors.push(ValidationError::MissingApiSecret),
    }

    if let Some(app_id) = &config.risk.app_id {
        if app_id.trim().is_empty() {
            errors.push(ValidationError::EmptyAppId);
        }
    }

    if config.risk.deadline_ms == 0 {
        errors.push(ValidationError::ZeroDeadline);
    }

    if let Err(e) = url::Url::parse(&config.risk.base_url) {
        errors.push(ValidationError::InvalidBaseUrl(e.to_string()));
    }

    if let Some(threshold) = config.risk.risk_threshold {
        if !(0.0..=1.0).contains(&threshold) {
            errors.push(ValidationError::InvalidRiskThreshold(threshold));
        }
    }

    if config.risk.retries.max_attempts == 0 {
        errors.push(ValidationError::ZeroAttempts);
    }

    match url::Url::parse(&config.origin.url) {
        Ok(url) if url.scheme() == "http" && url.host().is_some() => {}
        Ok(_) => errors.push(ValidationError::InvalidOriginUrl(config.origin.url.clone())),
        Err(e) => errors.push(ValidationError::InvalidOriginUrl(e.to_string())),
    }

    if !(400..=599).contains(&config.policy.deny.status) {
        errors.push(ValidationError::InvalidDenyStatus(config.policy.deny.status));
    }

    for (index, rule) in config.routes.iter().enumerate() {
        if Method::from_bytes(rule.method.to_uppercase().as_bytes()).is_err() {
            errors.push(ValidationError::InvalidRouteMethod {
                index,
                method: rule.method.clone(),
            });
        }
        if !rule.path.starts_with('/') {
            errors.push(ValidationError::InvalidRoutePath {
                index,
                path: rule.path.clone(),
            });
        }
        if rule.event_type.trim().is_empty() {
            errors.push(ValidationError::EmptyEventType { index });
        }
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    let request_timeout = Duration::from_secs(config.limits.request_timeout_secs);
    let risk_budget = RetryPolicy::from_config(&config.risk.retries)
        .worst_case_budget(Duration::from_millis(config.risk.deadline_ms));
    if request_timeout.is_zero() {
        errors.push(ValidationError::ZeroRequestTimeout);
    } else if request_timeout <= risk_budget {
        errors.push(ValidationError::RequestTimeoutWithinRiskBudget {
            timeout_ms: request_timeout.as_millis(),
            budget_ms: risk_budget.as_millis(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RouteRule;
    use crate::config::secret::ApiSecret;

    fn valid_config() -> GateConfig {
        let mut config = GateConfig::default();
        config.risk.api_secret = Some(ApiSecret::new("secret"));
        config
            .routes
            .push(RouteRule::new("POST", "/users/sign_up", "$registration"));
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_missing_secret_is_fatal() {
        let mut config = valid_config();
        config.risk.api_secret = None;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::MissingApiSecret]);

        config.risk.api_secret = Some(ApiSecret::new(""));
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::MissingApiSecret]);
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid_config();
        config.risk.deadline_ms = 0;
        config.policy.deny.status = 200;
        config.routes.push(RouteRule::new("NOT A METHOD", "login", ""));

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::ZeroDeadline));
        assert!(errors.contains(&ValidationError::InvalidDenyStatus(200)));
        assert!(errors.contains(&ValidationError::InvalidRouteMethod {
            index: 1,
            method: "NOT A METHOD".into()
        }));
        assert!(errors.contains(&ValidationError::InvalidRoutePath {
            index: 1,
            path: "login".into()
        }));
        assert!(errors.contains(&ValidationError::EmptyEventType { index: 1 }));
    }

    #[test]
    fn test_origin_must_be_http() {
        let mut config = valid_config();
        config.origin.url = "ftp://example.com".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::InvalidOriginUrl(_)));
    }

    #[test]
    fn test_threshold_range() {
        let mut config = valid_config();
        config.risk.risk_threshold = Some(1.5);
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::InvalidRiskThreshold(1.5)]);
    }

    #[test]
    fn test_request_timeout_must_exceed_risk_budget() {
        let mut config = valid_config();
        config.limits.request_timeout_secs = 0;
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::ZeroRequestTimeout]
        );

        config.limits.request_timeout_secs = 1;
        config.risk.deadline_ms = 2000;
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::RequestTimeoutWithinRiskBudget {
                timeout_ms: 1000,
                budget_ms: 2000
            }]
        );

        config.limits.request_timeout_secs = 2;
        assert!(validate_config(&config).is_err());

        config.limits.request_timeout_secs = 5;
        config.risk.retries.max_attempts = 3;
        config.risk.retries.base_delay_ms = 100;
        config.risk.retries.max_delay_ms = 150;
        // 3 x 2000 + 110 + 165 > 5000
        assert!(validate_config(&config).is_err());

        config.limits.request_timeout_secs = 7;
        assert!(validate_config(&config).is_ok());
    }
}
