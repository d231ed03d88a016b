//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)          CLI flags / env
//!     → loader.rs (parse)         │
//!     → RelayConfig ◀─────────────┘ overrides
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//!     → moved into the dispatcher at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, read_config, ConfigError};
pub use schema::{
    BackendConfig, ListenerConfig, LogFormat, ObservabilityConfig, ProxyConfig, RelayConfig,
    StaticFilesConfig,
};
pub use validation::{validate_config, ValidationError};
