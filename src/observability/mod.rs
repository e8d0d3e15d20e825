//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (archive, extraction, resolution, dispatch)
//!     → logging.rs (filter + formatter on stderr)
//! ```
//!
//! # Design Decisions
//! - Logs go to stderr; stdout belongs to the launched program
//! - Filter comes from settings so the environment overlay applies
//! - Installing twice is harmless (tests, embedding)

pub mod logging;
