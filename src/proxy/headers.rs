//! Header manipulation for forwarded traffic.
//!
//! # Responsibilities
//! - Drop connection-management headers from inbound requests
//! - Drop framing headers from backend responses
//! - Apply the default body content type
//!
//! # Design Decisions
//! - Denylists are compared case-insensitively; `HeaderName` is already
//!   lowercase, so membership is a plain equality check
//! - The transports on either side recompute `Host` and framing headers

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};

/// Inbound headers never copied onto the outbound request.
pub static REQUEST_DENYLIST: [HeaderName; 3] =
    [header::HOST, header::CONTENT_LENGTH, header::CONNECTION];

/// Backend response headers never relayed to the caller.
pub static RESPONSE_DENYLIST: [HeaderName; 4] = [
    header::CONTENT_ENCODING,
    header::TRANSFER_ENCODING,
    header::CONTENT_LENGTH,
    header::CONNECTION,
];

fn is_denied(name: &HeaderName, denylist: &[HeaderName]) -> bool {
    denylist.iter().any(|denied| denied == name)
}

/// Copy inbound headers onto an outbound header map, skipping the request denylist.
///
/// Repeated headers keep every value, in order.
pub fn copy_request_headers(inbound: &HeaderMap, outbound: &mut HeaderMap) {
    for (name, value) in inbound {
        if !is_denied(name, &REQUEST_DENYLIST) {
            outbound.append(name.clone(), value.clone());
        }
    }
}

/// Remove framing headers from a backend response in place.
pub fn strip_response_headers(headers: &mut HeaderMap) {
    for name in &RESPONSE_DENYLIST {
        headers.remove(name);
    }
}

/// Set `Content-Type` to `default` unless the caller supplied one.
pub fn apply_default_content_type(headers: &mut HeaderMap, default: &HeaderValue) {
    if !headers.contains_key(header::CONTENT_TYPE) {
        headers.insert(header::CONTENT_TYPE, default.clone());
    }
}
