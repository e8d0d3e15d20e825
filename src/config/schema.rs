//! Launcher settings schema.
//!
//! Settings are the explicit override tier: they win over anything packaged
//! inside the archive. All types derive Serde traits for loading from TOML.

use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

/// Default port substituted for `{{port}}`.
pub const DEFAULT_PORT: &str = "8080";

/// Default host substituted for `{{host}}`.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Root settings for the launcher.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LauncherSettings {
    /// Which archive to launch.
    pub launcher: LauncherConfig,

    /// Explicit values for the configuration placeholders.
    pub overrides: OverrideConfig,

    /// Script runtime settings.
    pub runtime: RuntimeConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Value of the ambient `PORT` variable, consulted after `overrides.port`.
    #[serde(skip)]
    pub ambient_port: Option<String>,
}

impl LauncherSettings {
    /// Port for `{{port}}`: explicit override, then ambient `PORT`, then 8080.
    ///
    /// Substituted as text; whatever the variable holds reaches the configuration.
    pub fn port(&self) -> &str {
        self.overrides
            .port
            .as_deref()
            .or(self.ambient_port.as_deref())
            .unwrap_or(DEFAULT_PORT)
    }

    /// Host for `{{host}}`.
    pub fn host(&self) -> &str {
        self.overrides.host.as_deref().unwrap_or(DEFAULT_HOST)
    }
}

/// Archive selection.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LauncherConfig {
    /// Archive path; the running executable when unset.
    pub archive: Option<PathBuf>,
}

/// Explicit placeholder overrides.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct OverrideConfig {
    /// Port override (`WARBLER_PORT`). Accepts `port = 9292` or `port = "9292"`.
    #[serde(deserialize_with = "port_text")]
    pub port: Option<String>,

    /// Host override (`WARBLER_HOST`).
    pub host: Option<String>,

    /// Webserver configuration URI or path (`WARBLER_WEBSERVER_CONFIG`).
    pub webserver_config: Option<String>,
}

fn port_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PortValue {
        Number(i64),
        Text(String),
    }

    Ok(Option::<PortValue>::deserialize(deserializer)?.map(|value| match value {
        PortValue::Number(n) => n.to_string(),
        PortValue::Text(text) => text,
    }))
}

/// Script runtime configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Interpreter program; the packaged runtime home or `jruby` on PATH when unset.
    pub program: Option<PathBuf>,

    /// Activate the packaged Gemfile before locating executables.
    pub bundler_setup: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            program: None,
            bundler_setup: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Force debug output (`WARBLER_DEBUG`).
    pub debug: bool,

    /// Raw filter directive (`WARBOOT_LOG`); wins over `log_level`.
    pub filter: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            debug: false,
            filter: None,
        }
    }
}
