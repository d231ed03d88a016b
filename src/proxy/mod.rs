//! Proxy exchange with the backend.
//!
//! # Data Flow
//! ```text
//! Inbound request (under the reserved prefix)
//!     → read body up to its declared length
//!     → rebuild target: base URL + path and query
//!     → headers.rs (drop Host / Content-Length / Connection)
//!     → hyper client, bounded by the backend timeout
//!     → status < 400:  headers.rs (drop framing) → stream.rs (8 KiB chunks)
//!     → status >= 400: capture error body prefix → JSON error payload
//!     → transport failure: 502 JSON error payload
//! ```
//!
//! # Design Decisions
//! - One exchange, no retries; every failure is surfaced immediately
//! - No idle pooled connections to the backend, each exchange dials fresh
//! - Errors are values (`ProxyError`) converted to responses at one boundary

pub mod error;
pub mod headers;
pub mod stream;

use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Request, Uri};
use axum::response::Response;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use url::Url;

use crate::config::{BackendConfig, ProxyConfig};
use crate::http::response::ErrorPayload;
use crate::observability::Diagnostics;

pub use error::ProxyError;
use error::ERROR_BODY_LOG_LIMIT;
use stream::ChunkedBody;

/// Forwards requests to the single configured backend.
#[derive(Clone)]
pub struct Relay {
    client: Client<HttpConnector, Full<Bytes>>,
    base_url: String,
    timeout: Duration,
    default_content_type: HeaderValue,
    max_body_bytes: u64,
    advisory: String,
    diagnostics: Diagnostics,
}

impl Relay {
    /// Create a relay from validated configuration.
    pub fn new(backend: &BackendConfig, proxy: &ProxyConfig, diagnostics: Diagnostics) -> Self {
        let client = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(0)
            .build(HttpConnector::new());

        let base_url = backend.normalized_base_url().to_string();
        let default_content_type = HeaderValue::from_str(&proxy.default_content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/json"));

        Self {
            client,
            advisory: connection_advisory(&base_url),
            base_url,
            timeout: backend.timeout(),
            default_content_type,
            max_body_bytes: proxy.max_body_bytes,
            diagnostics,
        }
    }

    /// Run one proxy exchange. Always produces a response.
    pub async fn forward(&self, request: Request<Body>) -> Response {
        let target = self.target_for(request.uri());

        match self.exchange(&target, request).await {
            Ok(response) => response,
            Err(err) => {
                self.diagnostics.failed(&target, &err);
                self.error_response(err)
            }
        }
    }

    /// Backend URL for an inbound URI: base URL followed by path and query, verbatim.
    pub fn target_for(&self, uri: &Uri) -> String {
        let path = uri
            .path_and_query()
            .map_or_else(|| uri.path(), |pq| pq.as_str());
        format!("{}{}", self.base_url, path)
    }

    async fn exchange(&self, target: &str, request: Request<Body>) -> Result<Response, ProxyError> {
        let started = Instant::now();
        let (parts, body) = request.into_parts();

        let declared = declared_length(&parts.headers);
        if declared > self.max_body_bytes {
            return Err(ProxyError::PayloadTooLarge {
                declared,
                limit: self.max_body_bytes,
            });
        }
        let body = if declared > 0 {
            Some(read_body(body, declared).await?)
        } else {
            None
        };

        let uri: Uri = target.parse().map_err(|source| ProxyError::InvalidTarget {
            target: target.to_string(),
            source,
        })?;

        let mut builder = Request::builder().method(parts.method.clone()).uri(uri);
        if let Some(outbound_headers) = builder.headers_mut() {
            headers::copy_request_headers(&parts.headers, outbound_headers);
            if body.is_some() {
                headers::apply_default_content_type(outbound_headers, &self.default_content_type);
            }
            self.diagnostics.outbound(
                &parts.method,
                target,
                outbound_headers,
                body.as_ref().map_or(0, Bytes::len),
            );
        }
        let outbound = builder.body(body.map(Full::new).unwrap_or_default())?;

        let response = tokio::time::timeout(self.timeout, self.client.request(outbound))
            .await
            .map_err(|_| ProxyError::Timeout(self.timeout))?
            .map_err(ProxyError::Unreachable)?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let body = read_prefix(response.into_body(), ERROR_BODY_LOG_LIMIT, self.timeout).await;
            return Err(ProxyError::BackendStatus { status, body });
        }

        let (mut parts, body) = response.into_parts();
        headers::strip_response_headers(&mut parts.headers);
        self.diagnostics.relayed(status, &parts.headers, started.elapsed());

        let mut relayed = Response::new(Body::new(ChunkedBody::new(body)));
        *relayed.status_mut() = status;
        *relayed.headers_mut() = parts.headers;
        Ok(relayed)
    }

    fn error_response(&self, err: ProxyError) -> Response {
        let status = err.status();
        let details = err.details();

        let payload = match &err {
            ProxyError::BackendStatus { status, .. } => ErrorPayload::new(
                format!("Backend error: {status}"),
                "The backend returned an error response.",
                details,
            ),
            ProxyError::Timeout(_) | ProxyError::Unreachable(_) => {
                ErrorPayload::new("Backend connection failed", self.advisory.clone(), details)
            }
            ProxyError::PayloadTooLarge { limit, .. } => ErrorPayload::new(
                "Payload too large",
                format!("Request bodies are limited to {limit} bytes."),
                details,
            ),
            ProxyError::InboundBody(_) | ProxyError::InvalidTarget { .. } | ProxyError::Request(_) => {
                ErrorPayload::new(
                    "Proxy error",
                    "The relay could not forward the request. See the relay logs for the full error.",
                    details,
                )
            }
        };

        payload.into_response_with(status)
    }
}

/// Declared body length; absent or malformed headers count as zero.
fn declared_length(headers: &HeaderMap) -> u64 {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0)
}

async fn read_body(body: Body, declared: u64) -> Result<Bytes, ProxyError> {
    let limit = usize::try_from(declared).unwrap_or(usize::MAX);
    axum::body::to_bytes(body, limit)
        .await
        .map_err(ProxyError::InboundBody)
}

/// Collect at most `limit` bytes of `body`, giving up after `timeout`.
///
/// Whatever arrived before an error or the deadline is returned.
async fn read_prefix<B>(mut body: B, limit: usize, timeout: Duration) -> Bytes
where
    B: hyper::body::Body<Data = Bytes> + Unpin,
{
    let mut collected = Vec::with_capacity(limit);

    let read = async {
        while collected.len() < limit {
            match body.frame().await {
                Some(Ok(frame)) => {
                    if let Ok(data) = frame.into_data() {
                        let take = data.len().min(limit - collected.len());
                        collected.extend_from_slice(&data[..take]);
                    }
                }
                _ => break,
            }
        }
    };
    let _ = tokio::time::timeout(timeout, read).await;

    Bytes::from(collected)
}

fn connection_advisory(base_url: &str) -> String {
    let port = Url::parse(base_url)
        .ok()
        .and_then(|url| url.port_or_known_default());

    match port {
        Some(port) => format!(
            "Could not connect to the backend at {base_url}. Make sure the backend server is running on port {port}."
        ),
        None => format!(
            "Could not connect to the backend at {base_url}. Make sure the backend server is running."
        ),
    }
}
