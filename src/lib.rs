//! Archive bootstrap launcher.
//!
//! Extracts the payload of a web application archive and starts either the
//! embedded webserver or a packaged executable script.

pub mod archive;
pub mod config;
pub mod context;
pub mod error;
pub mod extract;
pub mod launcher;
pub mod lifecycle;
pub mod observability;
pub mod script;

pub use config::schema::LauncherSettings;
pub use error::LaunchError;
pub use launcher::{LaunchMode, Launcher};
pub use lifecycle::Teardown;
