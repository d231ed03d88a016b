//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum router with a single catch-all dispatcher
//! - Wire up middleware (tracing spans, CORS response headers)
//! - Classify each request and hand it to the proxy or static branch
//! - Serve until the shutdown signal fires

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request},
    response::Response,
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::assets::AssetRoot;
use crate::config::{validate_config, ConfigError, RelayConfig};
use crate::lifecycle::shutdown;
use crate::observability::Diagnostics;
use crate::proxy::Relay;
use crate::routing::{Classifier, RouteKind};

/// `Access-Control-Allow-Origin` sent on every response.
pub const CORS_ALLOW_ORIGIN: &str = "*";
/// `Access-Control-Allow-Methods` sent on every response.
pub const CORS_ALLOW_METHODS: &str = "GET, POST, OPTIONS";
/// `Access-Control-Allow-Headers` sent on every response.
pub const CORS_ALLOW_HEADERS: &str = "Content-Type";

/// Dispatcher state injected into the handler. Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<Classifier>,
    pub relay: Arc<Relay>,
    pub assets: Arc<AssetRoot>,
}

impl AppState {
    pub fn new(config: &RelayConfig) -> Self {
        let diagnostics = Diagnostics::new(config.observability.verbose);
        Self {
            classifier: Arc::new(Classifier::new(config.proxy.path_prefix.clone())),
            relay: Arc::new(Relay::new(&config.backend, &config.proxy, diagnostics)),
            assets: Arc::new(AssetRoot::new(&config.static_files)),
        }
    }
}

/// HTTP server for the development relay.
pub struct RelayServer {
    router: Router,
    config: RelayConfig,
}

impl RelayServer {
    /// Create a server from a configuration, validating it first.
    pub fn new(config: RelayConfig) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        let router = build_router(AppState::new(&config));
        Ok(Self { router, config })
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires or its sender is dropped.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backend = %self.config.backend.normalized_base_url(),
            api_prefix = %self.config.proxy.path_prefix,
            document_root = %self.config.static_files.root.display(),
            "Relay listening"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("Relay stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

/// Build the Axum router with all middleware layers.
///
/// The CORS layers sit outside the dispatcher so they cover static files,
/// relayed backend responses and synthesized errors alike. They override
/// any value the backend sent so browsers never see duplicates.
pub fn build_router(state: AppState) -> Router {
    let cors = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(CORS_ALLOW_ORIGIN),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(CORS_ALLOW_METHODS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(CORS_ALLOW_HEADERS),
        ));

    Router::new()
        .fallback(dispatch)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Single entry point: classify, then proxy or serve.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    match state.classifier.classify(request.uri().path()) {
        RouteKind::Proxy => state.relay.forward(request).await,
        RouteKind::Static => {
            let (parts, _) = request.into_parts();
            state.assets.serve(&parts.method, parts.uri.path()).await
        }
    }
}
