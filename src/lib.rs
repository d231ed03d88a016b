//! Local development relay.
//!
//! Serves a frontend's static assets and forwards everything under a
//! reserved path prefix to a separately running backend API.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌──────────────────────────────────────────────┐
//!                          │                  DEV RELAY                   │
//!                          │                                              │
//!     Browser request      │  ┌─────────┐    ┌──────────┐                 │
//!     ─────────────────────┼─▶│  http   │───▶│ routing  │                 │
//!                          │  │ server  │    │classifier│                 │
//!                          │  └─────────┘    └────┬─────┘                 │
//!                          │          static ┌────┴────┐ /api/...         │
//!                          │                 ▼         ▼                  │
//!                          │          ┌─────────┐ ┌──────────┐            │
//!                          │          │ assets  │ │  proxy   │◀───────────┼──── Backend
//!                          │          │  root   │ │  relay   │────────────┼───▶ API
//!                          │          └────┬────┘ └────┬─────┘            │
//!     Browser response     │  ┌─────────┐  │           │                  │
//!     ◀────────────────────┼──│  CORS   │◀─┴───────────┘                  │
//!                          │  │ headers │                                 │
//!                          │  └─────────┘                                 │
//!                          │                                              │
//!                          │  config · observability · lifecycle          │
//!                          └──────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod assets;
pub mod config;
pub mod http;
pub mod proxy;
pub mod routing;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::RelayConfig;
pub use http::RelayServer;
pub use lifecycle::Shutdown;
