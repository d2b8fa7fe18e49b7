//! Route matching logic.
//!
//! # Responsibilities
//! - Match HTTP method (exact)
//! - Match request path (exact, case-sensitive)
//! - Combine conditions with AND semantics
//!
//! # Design Decisions
//! - Method names are normalized to uppercase at compile time
//! - Path matching is case-sensitive and exact; no wildcards, no prefixes
//! - No regex to guarantee O(n) matching

use axum::http::Method;

/// Trait for matching a request line against a condition.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the method and path satisfy this condition.
    fn matches(&self, method: &Method, path: &str) -> bool;
}

/// Matches the HTTP method.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    expected: Method,
}

impl MethodMatcher {
    pub fn new(method: Method) -> Self {
        Self { expected: method }
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, method: &Method, _path: &str) -> bool {
        *method == self.expected
    }
}

/// Matches the request path exactly.
#[derive(Debug, Clone)]
pub struct ExactPathMatcher {
    path: String,
}

impl ExactPathMatcher {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Matcher for ExactPathMatcher {
    fn matches(&self, _method: &Method, path: &str) -> bool {
        path == self.path
    }
}

/// Combines multiple matchers with AND semantics.
#[derive(Debug)]
pub struct AndMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AndMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AndMatcher {
    fn matches(&self, method: &Method, path: &str) -> bool {
        self.matchers.iter().all(|m| m.matches(method, path))
    }
}
