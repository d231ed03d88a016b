//! Path classification.
//!
//! # Responsibilities
//! - Match the reserved API prefix (case-sensitive)
//! - Decide between the proxy branch and the static-asset branch
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - The method plays no part: everything under the prefix is proxied
//! - No regex, a single prefix comparison per request

/// Where an inbound request is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// Forward to the backend.
    Proxy,
    /// Resolve under the document root.
    Static,
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}

/// Splits traffic between the proxy and static branches.
#[derive(Debug, Clone)]
pub struct Classifier {
    api: PathPrefixMatcher,
}

impl Classifier {
    pub fn new(api_prefix: impl Into<String>) -> Self {
        Self {
            api: PathPrefixMatcher::new(api_prefix),
        }
    }

    pub fn classify(&self, path: &str) -> RouteKind {
        if self.api.matches(path) {
            RouteKind::Proxy
        } else {
            RouteKind::Static
        }
    }
}
