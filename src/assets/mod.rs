//! Static asset serving.
//!
//! # Responsibilities
//! - Map a request path onto a file under the document root
//! - Stream the file to the caller in bounded chunks
//!
//! # Design Decisions
//! - `GET` only; anything else is a 404, not a 405
//! - `/` and paths ending in `/` resolve to the default document
//! - `..` segments are refused outright, and the canonical path must stay
//!   under the canonical root so symlinks cannot escape it
//! - No directory listing, range requests or conditional caching

pub mod mime;

use std::io;
use std::path::PathBuf;

use axum::body::Body;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::Response;
use futures_util::stream::{self, Stream};
use hyper::body::Bytes;
use percent_encoding::percent_decode_str;
use tokio::fs::{self, File};
use tokio::io::AsyncReadExt;

use crate::config::StaticFilesConfig;
use crate::http::response::not_found;
use crate::proxy::stream::CHUNK_SIZE;

/// Document root plus the file served for directory paths.
#[derive(Debug, Clone)]
pub struct AssetRoot {
    root: PathBuf,
    default_document: String,
}

impl AssetRoot {
    pub fn new(config: &StaticFilesConfig) -> Self {
        Self {
            root: config.root.clone(),
            default_document: config.default_document.clone(),
        }
    }

    /// Serve a static request. Never fails; missing files become 404.
    pub async fn serve(&self, method: &Method, request_path: &str) -> Response {
        if method != Method::GET {
            tracing::debug!(method = %method, path = %request_path, "Static path only supports GET");
            return not_found();
        }

        let Some(path) = self.resolve(request_path).await else {
            tracing::debug!(path = %request_path, "Static file not found");
            return not_found();
        };

        let file = match File::open(&path).await {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "Failed to open static file");
                return not_found();
            }
        };
        let length = match file.metadata().await {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "Failed to stat static file");
                return not_found();
            }
        };

        let content_type = mime::content_type(path.extension().and_then(|e| e.to_str()));

        let mut response = Response::new(Body::from_stream(file_chunks(file)));
        *response.status_mut() = StatusCode::OK;
        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
        response
    }

    /// Resolve a request path to an existing regular file under the root.
    pub async fn resolve(&self, request_path: &str) -> Option<PathBuf> {
        let decoded = percent_decode_str(request_path).decode_utf8().ok()?;

        let mut relative = PathBuf::new();
        for segment in decoded.split('/') {
            match segment {
                "" | "." => {}
                ".." => return None,
                s if s.contains('\0') || s.contains('\\') => return None,
                s => relative.push(s),
            }
        }
        if decoded.ends_with('/') {
            relative.push(&self.default_document);
        }

        let root = fs::canonicalize(&self.root).await.ok()?;
        let candidate = fs::canonicalize(self.root.join(&relative)).await.ok()?;
        if !candidate.starts_with(&root) {
            tracing::warn!(
                path = %request_path,
                resolved = %candidate.display(),
                "Path escapes document root"
            );
            return None;
        }

        let metadata = fs::metadata(&candidate).await.ok()?;
        metadata.is_file().then_some(candidate)
    }
}

/// Read a file in chunks of at most [`CHUNK_SIZE`] bytes.
fn file_chunks(file: File) -> impl Stream<Item = io::Result<Bytes>> + Send + 'static {
    stream::try_unfold(file, |mut file| async move {
        let mut buf = vec![0u8; CHUNK_SIZE];
        let read = file.read(&mut buf).await?;
        if read == 0 {
            return Ok(None);
        }
        buf.truncate(read);
        Ok(Some((Bytes::from(buf), file)))
    })
}
