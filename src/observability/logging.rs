//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Derive the filter from launcher settings
//!
//! # Design Decisions
//! - A raw `WARBOOT_LOG` directive wins over everything else
//! - The debug flag raises the crate level to `debug`

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::schema::ObservabilityConfig;

/// Filter directive for the given settings.
pub fn filter_directive(config: &ObservabilityConfig) -> String {
    if let Some(filter) = config.filter.as_deref().filter(|f| !f.trim().is_empty()) {
        return filter.to_string();
    }
    let level = if config.debug {
        "debug"
    } else {
        config.log_level.as_str()
    };
    format!("warboot={level}")
}

/// Install the global subscriber. Returns `false` if one was already installed.
pub fn init(config: &ObservabilityConfig) -> bool {
    let directive = filter_directive(config);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warboot=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive() {
        let mut config = ObservabilityConfig::default();
        assert_eq!(filter_directive(&config), "warboot=info");

        config.debug = true;
        assert_eq!(filter_directive(&config), "warboot=debug");

        config.filter = Some("warboot=trace,zip=debug".into());
        assert_eq!(filter_directive(&config), "warboot=trace,zip=debug");
    }
}
