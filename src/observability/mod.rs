//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (subscriber setup, structured log events)
//!     → diagnostics.rs (per-exchange proxy events, verbosity flag)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//! ```
//!
//! # Design Decisions
//! - Structured fields on every event for machine parsing
//! - Verbosity is configuration, not a second code path
//! - Full error chains stay in logs; callers only see payload text

pub mod diagnostics;
pub mod logging;

pub use diagnostics::Diagnostics;
