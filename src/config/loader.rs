//! Settings loading from disk and the environment.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::LauncherSettings;
use crate::config::validation::{validate_settings, ValidationError};

/// Path of an optional TOML settings file.
pub const ENV_SETTINGS: &str = "WARBOOT_SETTINGS";
pub const ENV_ARCHIVE: &str = "WARBOOT_ARCHIVE";
pub const ENV_SCRIPT_RUNTIME: &str = "WARBOOT_SCRIPT_RUNTIME";
pub const ENV_LOG: &str = "WARBOOT_LOG";
pub const ENV_PORT_OVERRIDE: &str = "WARBLER_PORT";
pub const ENV_HOST: &str = "WARBLER_HOST";
pub const ENV_WEBSERVER_CONFIG: &str = "WARBLER_WEBSERVER_CONFIG";
pub const ENV_BUNDLER_SETUP: &str = "WARBLER_BUNDLER_SETUP";
pub const ENV_DEBUG: &str = "WARBLER_DEBUG";
/// Ambient port, consulted after the explicit override.
pub const ENV_PORT: &str = "PORT";

/// Error type for settings loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { key: String, value: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { key, value } => write!(f, "Invalid value for {}: {:?}", key, value),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate settings from a TOML file.
pub fn load_settings(path: &Path) -> Result<LauncherSettings, ConfigError> {
    let settings = read_settings(path)?;
    validate_settings(&settings).map_err(ConfigError::Validation)?;
    Ok(settings)
}

/// Build settings from the real process environment.
pub fn settings_from_process_env() -> Result<LauncherSettings, ConfigError> {
    settings_from_vars(std::env::vars())
}

/// Build settings from an explicit set of environment variables.
///
/// Reads the file named by `WARBOOT_SETTINGS` (if any), overlays the
/// variables, then validates the result.
pub fn settings_from_vars<I>(vars: I) -> Result<LauncherSettings, ConfigError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let vars: HashMap<String, String> = vars.into_iter().collect();

    let mut settings = match vars.get(ENV_SETTINGS).filter(|p| !p.is_empty()) {
        Some(path) => read_settings(Path::new(path))?,
        None => LauncherSettings::default(),
    };
    apply_env_overrides(&mut settings, &vars)?;

    validate_settings(&settings).map_err(ConfigError::Validation)?;
    Ok(settings)
}

/// Overlay environment variables onto settings. Variables win over the file.
pub fn apply_env_overrides(
    settings: &mut LauncherSettings,
    vars: &HashMap<String, String>,
) -> Result<(), ConfigError> {
    let get = |key: &str| vars.get(key).filter(|v| !v.is_empty());

    if let Some(port) = get(ENV_PORT_OVERRIDE) {
        settings.overrides.port = Some(port.clone());
    }
    if let Some(port) = get(ENV_PORT) {
        settings.ambient_port = Some(port.clone());
    }
    if let Some(host) = get(ENV_HOST) {
        settings.overrides.host = Some(host.clone());
    }
    if let Some(config) = get(ENV_WEBSERVER_CONFIG) {
        settings.overrides.webserver_config = Some(config.clone());
    }
    if let Some(flag) = get(ENV_BUNDLER_SETUP) {
        settings.runtime.bundler_setup = flag != "false";
    }
    if let Some(flag) = get(ENV_DEBUG) {
        settings.observability.debug = parse_flag(ENV_DEBUG, flag)?;
    }
    if let Some(archive) = get(ENV_ARCHIVE) {
        settings.launcher.archive = Some(PathBuf::from(archive));
    }
    if let Some(program) = get(ENV_SCRIPT_RUNTIME) {
        settings.runtime.program = Some(PathBuf::from(program));
    }
    if let Some(filter) = get(ENV_LOG) {
        settings.observability.filter = Some(filter.clone());
    }

    Ok(())
}

fn read_settings(path: &Path) -> Result<LauncherSettings, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Env {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}
