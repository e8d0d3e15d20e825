//! Configuration resolution.
//!
//! # Data Flow
//! ```text
//! WEB-INF/webserver.properties (absent → empty)
//!     → properties.rs parse
//!     → {{warfile}} {{port}} {{host}} {{config}} {{webroot}} substituted in every value
//!     → ResolvedConfig (read-only)
//!     → props: pushed through a PropertySink
//!     → args: prepended to the original argument vector
//! ```

use std::path::Path;

use crate::archive::layout::{WEBSERVER_CONFIG, WEBSERVER_PROPERTIES};
use crate::archive::Archive;
use crate::config::properties::Properties;
use crate::config::schema::LauncherSettings;
use crate::config::sink::PropertySink;
use crate::error::LaunchError;

pub const KEY_MAINCLASS: &str = "mainclass";
pub const KEY_ARGS: &str = "args";
pub const KEY_PROPS: &str = "props";

/// Run-time values substituted into the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunValues {
    pub warfile: String,
    pub port: String,
    pub host: String,
    pub config: String,
    pub webroot: String,
}

impl RunValues {
    /// Replace every placeholder token in `value`.
    pub fn substitute(&self, value: &str) -> String {
        value
            .replace("{{warfile}}", &self.warfile)
            .replace("{{port}}", &self.port)
            .replace("{{host}}", &self.host)
            .replace("{{config}}", &self.config)
            .replace("{{webroot}}", &self.webroot)
    }
}

/// URI of the structured configuration packaged inside the archive.
pub fn embedded_config_uri(archive_path: &Path) -> String {
    let file_uri = url::Url::from_file_path(archive_path)
        .map(|url| url.to_string())
        .unwrap_or_else(|()| format!("file:{}", archive_path.display()));
    format!("jar:{file_uri}!/{WEBSERVER_CONFIG}")
}

/// Computes run-time values and resolves the configuration resource.
pub struct Resolver<'s> {
    settings: &'s LauncherSettings,
}

impl<'s> Resolver<'s> {
    pub fn new(settings: &'s LauncherSettings) -> Self {
        Self { settings }
    }

    /// Values for this run; explicit overrides beat packaged defaults.
    pub fn run_values(&self, archive_path: &Path, webroot: &Path) -> RunValues {
        let config = self
            .settings
            .overrides
            .webserver_config
            .clone()
            .unwrap_or_else(|| embedded_config_uri(archive_path));

        RunValues {
            warfile: archive_path.display().to_string(),
            port: self.settings.port().to_string(),
            host: self.settings.host().to_string(),
            config,
            webroot: webroot.display().to_string(),
        }
    }

    /// Load the configuration resource from the archive and resolve it.
    pub fn resolve(&self, archive: &mut Archive, webroot: &Path) -> ResolvedConfig {
        let text = match archive.read_to_string(WEBSERVER_PROPERTIES) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unreadable {}", WEBSERVER_PROPERTIES);
                None
            }
        };
        if text.is_none() {
            tracing::debug!("No {} in archive, using empty configuration", WEBSERVER_PROPERTIES);
        }

        let values = self.run_values(archive.path(), webroot);
        resolve_text(text.as_deref(), &values)
    }
}

/// Parse and substitute configuration text.
pub fn resolve_text(text: Option<&str>, values: &RunValues) -> ResolvedConfig {
    let mut properties = text.map(Properties::parse).unwrap_or_default();
    properties.map_values(|value| values.substitute(value));
    ResolvedConfig::new(properties)
}

/// Fully substituted configuration.
#[derive(Debug, Clone, Default)]
pub struct ResolvedConfig {
    properties: Properties,
    arg_keys: Option<Vec<String>>,
    prop_keys: Vec<String>,
}

impl ResolvedConfig {
    pub fn new(properties: Properties) -> Self {
        let arg_keys = properties.get(KEY_ARGS).map(split_key_list);
        let prop_keys = properties
            .get(KEY_PROPS)
            .map(split_key_list)
            .unwrap_or_default();
        Self {
            properties,
            arg_keys,
            prop_keys,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key)
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Ordered keys named by `args`, if present.
    pub fn arg_keys(&self) -> Option<&[String]> {
        self.arg_keys.as_deref()
    }

    /// Keys named by `props`.
    pub fn prop_keys(&self) -> &[String] {
        &self.prop_keys
    }

    /// Entry point named by `mainclass`.
    pub fn entry_point(&self) -> Result<&str, LaunchError> {
        self.get(KEY_MAINCLASS)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(LaunchError::MissingEntryPoint)
    }

    /// Final server argument vector: values of the `args` keys, then `original`.
    pub fn invocation_args(&self, original: &[String]) -> Vec<String> {
        match &self.arg_keys {
            Some(keys) => keys
                .iter()
                .map(|key| self.get(key).unwrap_or_default().to_string())
                .chain(original.iter().cloned())
                .collect(),
            None => original.to_vec(),
        }
    }

    /// Push each `props` key into `sink`. Keys missing from the configuration are skipped.
    pub fn apply_props(&self, sink: &mut dyn PropertySink) -> Result<usize, LaunchError> {
        let mut applied = 0;
        for key in &self.prop_keys {
            match self.get(key) {
                Some(value) => {
                    sink.set_property(key, value)?;
                    applied += 1;
                }
                None => tracing::debug!(key = %key, "Property listed in props is not configured"),
            }
        }
        Ok(applied)
    }
}

fn split_key_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect()
}
