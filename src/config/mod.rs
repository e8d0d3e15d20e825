//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! Launcher settings:
//!     WARBOOT_SETTINGS (TOML, optional)
//!     → loader.rs (parse, environment overlay)
//!     → validation.rs (semantic checks)
//!     → LauncherSettings (immutable)
//!
//! Packaged configuration:
//!     WEB-INF/webserver.properties
//!     → properties.rs (parse)
//!     → resolver.rs (placeholder substitution against LauncherSettings)
//!     → ResolvedConfig
//!     → sink.rs (props → process environment)
//! ```
//!
//! # Design Decisions
//! - Explicit settings > ambient `PORT` > packaged defaults
//! - All settings fields have defaults to allow an empty environment
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod properties;
pub mod resolver;
pub mod schema;
pub mod sink;
pub mod validation;

pub use loader::{settings_from_process_env, settings_from_vars, ConfigError};
pub use properties::Properties;
pub use resolver::{ResolvedConfig, Resolver, RunValues};
pub use schema::LauncherSettings;
pub use sink::{ProcessEnvironment, PropertySink};
