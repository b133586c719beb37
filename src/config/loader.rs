//! Settings resolution and loading from disk.
//!
//! The settings file is named by `--config`, else by the `FRONTDOOR_SETTINGS`
//! environment variable, else `frontdoor.toml`. Only the implicit default is
//! allowed to be missing.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::{GatewayConfig, SettingsSource};
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable naming the settings file.
pub const SETTINGS_ENV_KEY: &str = "FRONTDOOR_SETTINGS";

/// Settings file used when nothing else is named.
pub const DEFAULT_SETTINGS_PATH: &str = "frontdoor.toml";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse settings file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Where the settings file is expected to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsLocation {
    /// Named by the operator; must exist.
    Explicit(PathBuf),
    /// Fallback path; built-in defaults apply if it is absent.
    Default(PathBuf),
}

/// Pick the settings file from a CLI flag and the environment value.
pub fn resolve_settings(cli: Option<PathBuf>, env_value: Option<String>) -> SettingsLocation {
    if let Some(path) = cli {
        return SettingsLocation::Explicit(path);
    }
    match env_value.filter(|v| !v.trim().is_empty()) {
        Some(value) => SettingsLocation::Explicit(PathBuf::from(value)),
        None => SettingsLocation::Default(PathBuf::from(DEFAULT_SETTINGS_PATH)),
    }
}

/// Resolve the settings location, reading the environment once.
pub fn settings_from_env(cli: Option<PathBuf>) -> SettingsLocation {
    resolve_settings(cli, std::env::var(SETTINGS_ENV_KEY).ok())
}

/// Load the configuration from a resolved location.
pub fn load_settings(location: &SettingsLocation) -> Result<GatewayConfig, ConfigError> {
    match location {
        SettingsLocation::Explicit(path) => load_config(path),
        SettingsLocation::Default(path) if path.exists() => load_config(path),
        SettingsLocation::Default(path) => {
            tracing::info!(
                path = %path.display(),
                "No settings file found, using built-in defaults"
            );
            let config = GatewayConfig::default();
            validate_config(&config).map_err(ConfigError::Validation)?;
            Ok(config)
        }
    }
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config: GatewayConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    config.settings_source = SettingsSource::File(path.display().to_string());
    Ok(config)
}
