//! Proxy exchange failures.

use std::error::Error as StdError;
use std::time::Duration;

use axum::http::uri::InvalidUri;
use axum::http::StatusCode;
use hyper::body::Bytes;
use thiserror::Error;

/// Everything that can end a proxy exchange without a relayed backend response.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Declared request body exceeds the configured limit.
    #[error("request body of {declared} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { declared: u64, limit: u64 },

    /// Inbound body could not be read up to its declared length.
    #[error("failed to read request body")]
    InboundBody(#[source] axum::Error),

    /// Backend URL plus request path did not form a valid URI.
    #[error("invalid backend target '{target}'")]
    InvalidTarget {
        target: String,
        #[source]
        source: InvalidUri,
    },

    /// Outbound request could not be assembled.
    #[error("failed to build outbound request")]
    Request(#[from] axum::http::Error),

    /// Backend did not produce a response head in time.
    #[error("backend did not respond within {} seconds", .0.as_secs())]
    Timeout(Duration),

    /// Connection refused, DNS failure, or a broken response.
    #[error("backend request failed")]
    Unreachable(#[source] hyper_util::client::legacy::Error),

    /// Backend answered with a 4xx/5xx status.
    #[error("backend returned {status}")]
    BackendStatus {
        status: StatusCode,
        /// First bytes of the error body, already capped for logging.
        body: Bytes,
    },
}

impl ProxyError {
    /// Status code sent to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::Timeout(_) | ProxyError::Unreachable(_) => StatusCode::BAD_GATEWAY,
            ProxyError::BackendStatus { status, .. } => *status,
            ProxyError::InboundBody(_)
            | ProxyError::InvalidTarget { .. }
            | ProxyError::Request(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Human-readable text for the `details` field of the error payload.
    pub fn details(&self) -> String {
        match self {
            ProxyError::BackendStatus { body, .. } => body_details(body),
            ProxyError::Unreachable(source) => error_chain(source),
            other => error_chain(other),
        }
    }
}

/// Bytes of a backend error body kept for logging.
pub const ERROR_BODY_LOG_LIMIT: usize = 500;

/// Bytes of a backend error body echoed back to the caller.
pub const DETAILS_LIMIT: usize = 200;

/// Lossy UTF-8 rendering of the first [`DETAILS_LIMIT`] bytes of an error body.
///
/// A character cut by the limit is dropped; other invalid bytes become U+FFFD.
fn body_details(body: &[u8]) -> String {
    let prefix = &body[..body.len().min(DETAILS_LIMIT)];
    match std::str::from_utf8(prefix) {
        Ok(text) => text.to_string(),
        Err(e) if e.error_len().is_none() => {
            String::from_utf8_lossy(&prefix[..e.valid_up_to()]).into_owned()
        }
        Err(_) => String::from_utf8_lossy(prefix).into_owned(),
    }
}

/// Render an error and all of its sources on one line.
///
/// Sources whose text the chain already ends with are skipped, since many
/// wrappers print their inner error as their own message.
pub fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !rendered.ends_with(&text) {
            rendered.push_str(": ");
            rendered.push_str(&text);
        }
        source = cause.source();
    }
    rendered
}

/// Longest prefix of `text` that fits in `max` bytes without splitting a character.
pub fn truncate_utf8(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
