//! Per-exchange diagnostics.
//!
//! One dispatcher serves both quiet and verbose operation; the `verbose`
//! flag only changes how much each event carries and at which level.

use std::time::Duration;

use axum::http::{HeaderMap, Method, StatusCode};

use crate::proxy::error::{error_chain, truncate_utf8, ProxyError, ERROR_BODY_LOG_LIMIT};

/// Logging policy for proxy exchanges.
#[derive(Debug, Clone, Copy, Default)]
pub struct Diagnostics {
    verbose: bool,
}

impl Diagnostics {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Outbound request about to be dispatched.
    pub fn outbound(&self, method: &Method, target: &str, headers: &HeaderMap, body_len: usize) {
        if self.verbose {
            tracing::info!(
                method = %method,
                uri = %target,
                body_bytes = body_len,
                headers = ?headers,
                "Forwarding request"
            );
        } else {
            tracing::debug!(method = %method, uri = %target, body_bytes = body_len, "Forwarding request");
        }
    }

    /// Backend response head received and relayed.
    pub fn relayed(&self, status: StatusCode, headers: &HeaderMap, elapsed: Duration) {
        if self.verbose {
            tracing::info!(
                status = status.as_u16(),
                elapsed_ms = elapsed.as_millis() as u64,
                headers = ?headers,
                "Relaying backend response"
            );
        } else {
            tracing::debug!(
                status = status.as_u16(),
                elapsed_ms = elapsed.as_millis() as u64,
                "Relaying backend response"
            );
        }
    }

    /// Exchange ended in an error payload.
    pub fn failed(&self, target: &str, err: &ProxyError) {
        match err {
            ProxyError::BackendStatus { status, body } => {
                let snippet = String::from_utf8_lossy(body);
                tracing::warn!(
                    uri = %target,
                    status = status.as_u16(),
                    body = %truncate_utf8(&snippet, ERROR_BODY_LOG_LIMIT),
                    "Backend returned an error"
                );
            }
            ProxyError::Timeout(_) | ProxyError::Unreachable(_) => {
                tracing::error!(
                    uri = %target,
                    error = %error_chain(err),
                    "Backend connection failed"
                );
            }
            ProxyError::PayloadTooLarge { declared, limit } => {
                tracing::warn!(uri = %target, declared, limit, "Request body too large");
            }
            _ if self.verbose => {
                tracing::error!(
                    uri = %target,
                    error = %error_chain(err),
                    debug = ?err,
                    "Proxy error"
                );
            }
            _ => {
                tracing::error!(uri = %target, error = %error_chain(err), "Proxy error");
            }
        }
    }
}
