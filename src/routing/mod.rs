//! Request classification subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request path
//!     → matcher.rs (reserved prefix check)
//!     → RouteKind::Proxy  → proxy::Relay
//!     → RouteKind::Static → assets::AssetRoot
//! ```

pub mod matcher;

pub use matcher::{Classifier, PathPrefixMatcher, RouteKind};
