//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tracing + CORS layers)
//!     → routing (reserved prefix?)
//!         → proxy::Relay   (forward to backend, relay or synthesize)
//!         → assets::AssetRoot (resolve and stream a file)
//!     → response.rs (error payloads, not-found page)
//!     → Send to client
//! ```

pub mod response;
pub mod server;

pub use response::ErrorPayload;
pub use server::{build_router, AppState, RelayServer};
