//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, body limit > 0)
//! - Check the backend URL is something the outbound client can dial
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use axum::http::HeaderValue;
use url::Url;

use crate::config::schema::RelayConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    match Url::parse(&config.backend.base_url) {
        Ok(url) => {
            if url.scheme() != "http" {
                errors.push(ValidationError::new(
                    "backend.base_url",
                    format!("scheme '{}' is not supported, use http", url.scheme()),
                ));
            }
            if url.host_str().is_none() {
                errors.push(ValidationError::new("backend.base_url", "missing host"));
            }
            if url.query().is_some() || url.fragment().is_some() {
                errors.push(ValidationError::new(
                    "backend.base_url",
                    "must not carry a query or fragment",
                ));
            }
        }
        Err(e) => errors.push(ValidationError::new(
            "backend.base_url",
            format!("'{}' is not a valid URL: {e}", config.backend.base_url),
        )),
    }

    if config.backend.timeout_secs == 0 {
        errors.push(ValidationError::new("backend.timeout_secs", "must be greater than 0"));
    }

    if !config.proxy.path_prefix.starts_with('/') {
        errors.push(ValidationError::new("proxy.path_prefix", "must start with '/'"));
    }

    let content_type = &config.proxy.default_content_type;
    if content_type.trim().is_empty() || HeaderValue::from_str(content_type).is_err() {
        errors.push(ValidationError::new(
            "proxy.default_content_type",
            "must be a non-empty header value",
        ));
    }

    if config.proxy.max_body_bytes == 0 {
        errors.push(ValidationError::new("proxy.max_body_bytes", "must be greater than 0"));
    }

    let document = &config.static_files.default_document;
    if document.is_empty() || document.contains('/') || document == ".." {
        errors.push(ValidationError::new(
            "static_files.default_document",
            "must be a single file name",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
