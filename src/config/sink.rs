//! Process-wide setting injection for the `props` key.
//!
//! The only side effect the resolver has outside its return value goes
//! through [`PropertySink`]: one `key → value` write per named property,
//! applied after placeholder substitution.

use std::collections::BTreeMap;

use crate::error::LaunchError;

/// Destination for ambient settings the launched program reads.
pub trait PropertySink {
    fn set_property(&mut self, key: &str, value: &str) -> Result<(), LaunchError>;
}

/// Writes properties into the launcher's own environment, inherited by the
/// in-process server and any child it spawns.
///
/// Must only be used from the launch thread before the entry point runs.
/// The Tokio signal listener is the only other thread alive then and it
/// never reads the environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnvironment;

impl PropertySink for ProcessEnvironment {
    fn set_property(&mut self, key: &str, value: &str) -> Result<(), LaunchError> {
        if key.is_empty() || key.contains('=') || key.contains('\0') {
            return Err(LaunchError::InvalidInvocation(format!(
                "property name {key:?} cannot be set in the environment"
            )));
        }
        if value.contains('\0') {
            return Err(LaunchError::InvalidInvocation(format!(
                "value of property {key:?} contains a NUL byte"
            )));
        }
        tracing::debug!(key, value, "Setting process property");
        std::env::set_var(key, value);
        Ok(())
    }
}

impl PropertySink for BTreeMap<String, String> {
    fn set_property(&mut self, key: &str, value: &str) -> Result<(), LaunchError> {
        self.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
