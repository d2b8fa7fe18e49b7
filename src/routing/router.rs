//! Route lookup.
//!
//! # Responsibilities
//! - Store compiled route rules in configuration order
//! - Look up the rule that applies to a method + path
//! - Return the matched rule or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) linear scan; first match wins, order is preserved
//! - No match means the request is forwarded without a risk check

use axum::http::Method;

use crate::config::RouteRule;
use crate::routing::matcher::{AndMatcher, ExactPathMatcher, Matcher, MethodMatcher};

#[derive(Debug)]
struct CompiledRoute {
    rule: RouteRule,
    matcher: AndMatcher,
}

/// Ordered, immutable set of route rules.
#[derive(Debug, Default)]
pub struct RouteMatcher {
    routes: Vec<CompiledRoute>,
}

impl RouteMatcher {
    /// Compile rules from configuration. Rules with an unparsable method are skipped.
    pub fn from_rules(rules: Vec<RouteRule>) -> Self {
        let mut routes = Vec::with_capacity(rules.len());

        for rule in rules {
            let method = match Method::from_bytes(rule.method.to_uppercase().as_bytes()) {
                Ok(m) => m,
                Err(_) => {
                    tracing::warn!(method = %rule.method, path = %rule.path, "Skipping route with invalid method");
                    continue;
                }
            };

            let matcher = AndMatcher::new(vec![
                Box::new(MethodMatcher::new(method)),
                Box::new(ExactPathMatcher::new(rule.path.clone())),
            ]);
            routes.push(CompiledRoute { rule, matcher });
        }

        Self { routes }
    }

    /// Find the first rule matching `method` and `path`.
    pub fn match_route(&self, method: &Method, path: &str) -> Option<&RouteRule> {
        self.routes
            .iter()
            .find(|r| r.matcher.matches(method, path))
            .map(|r| &r.rule)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
