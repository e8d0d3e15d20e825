//! Settings validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject empty host and webserver config overrides
//! - Check the log level is one the subscriber understands
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: LauncherSettings → Result<(), Vec<ValidationError>>

use std::fmt;

use crate::config::schema::LauncherSettings;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single rejected setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a fully overlaid settings value.
pub fn validate_settings(settings: &LauncherSettings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Some(host) = &settings.overrides.host {
        if host.trim().is_empty() {
            errors.push(ValidationError::new("overrides.host", "host must not be empty"));
        }
    }
    if let Some(config) = &settings.overrides.webserver_config {
        if config.trim().is_empty() {
            errors.push(ValidationError::new(
                "overrides.webserver_config",
                "webserver config must not be empty",
            ));
        }
    }
    if !LOG_LEVELS.contains(&settings.observability.log_level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!(
                "unknown log level '{}' (expected one of {})",
                settings.observability.log_level,
                LOG_LEVELS.join(", ")
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_settings(&LauncherSettings::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut settings = LauncherSettings::default();
        settings.overrides.host = Some("  ".into());
        settings.overrides.webserver_config = Some(String::new());
        settings.observability.log_level = "loud".into();

        let errors = validate_settings(&settings).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].field, "overrides.host");
        assert!(errors[2].to_string().contains("loud"));
    }

    #[test]
    fn test_port_is_not_validated() {
        let mut settings = LauncherSettings::default();
        settings.overrides.port = Some("0".into());
        settings.ambient_port = Some("abc".into());
        assert!(validate_settings(&settings).is_ok());
    }
}
