//! Config loading: embedded defaults → file → environment.

use std::collections::HashMap;
use std::path::Path;

use tracing::info;

use crate::error::{ConfigError, ConfigResult};
use crate::types::{Config, StorageBackend};
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Environment variables recognized as overrides.
const ENV_STORAGE_BACKEND: &str = "GUARDIAN_STORAGE_BACKEND";
const ENV_STORAGE_PATH: &str = "GUARDIAN_STORAGE_PATH";
const ENV_LOG_LEVEL: &str = "GUARDIAN_LOG_LEVEL";
const ENV_LOG_FORMAT: &str = "GUARDIAN_LOG_FORMAT";
const ENV_NOTIFICATIONS_ENABLED: &str = "GUARDIAN_NOTIFICATIONS_ENABLED";

/// Load the configuration with full precedence.
///
/// `path` points at an optional TOML file; a missing file is only an error
/// when a path was explicitly supplied.
///
/// # Errors
///
/// Fails on unreadable or malformed layers and on validation failures.
pub fn load(path: Option<&Path>) -> ConfigResult<Config> {
    let env: HashMap<String, String> = std::env::vars().collect();
    load_with_env(path, &env)
}

/// [`load`] with an explicit environment, for tests.
///
/// # Errors
///
/// Same as [`load`].
pub fn load_with_env(
    path: Option<&Path>,
    env: &HashMap<String, String>,
) -> ConfigResult<Config> {
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|source| ConfigError::Parse {
            path: "<embedded defaults>".to_string(),
            source,
        })?;

    if let Some(path) = path {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let overlay: toml::Value = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        deep_merge(&mut merged, overlay);
        info!(path = %path.display(), "loaded config file");
    }

    let mut config: Config = merged
        .try_into()
        .map_err(|source| ConfigError::Parse {
            path: "<merged config>".to_string(),
            source,
        })?;

    apply_env_overrides(&mut config, env)?;
    validate::validate(&config)?;
    Ok(config)
}

/// Recursively merge `overlay` into `base`; overlay wins on scalars.
fn deep_merge(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => {
                        base_table.insert(key, overlay_value);
                    },
                }
            }
        },
        (base_slot, overlay_value) => *base_slot = overlay_value,
    }
}

/// Apply `GUARDIAN_*` environment overrides on top of the merged config.
fn apply_env_overrides(config: &mut Config, env: &HashMap<String, String>) -> ConfigResult<()> {
    if let Some(backend) = env.get(ENV_STORAGE_BACKEND) {
        config.storage.backend = match backend.as_str() {
            "memory" => StorageBackend::Memory,
            "surrealdb" => StorageBackend::Surrealdb,
            other => {
                return Err(ConfigError::Validation {
                    field: "storage.backend".to_string(),
                    message: format!("unknown backend {other:?} (from {ENV_STORAGE_BACKEND})"),
                })
            },
        };
    }
    if let Some(path) = env.get(ENV_STORAGE_PATH) {
        config.storage.path = Some(path.clone());
    }
    if let Some(level) = env.get(ENV_LOG_LEVEL) {
        config.logging.level = level.clone();
    }
    if let Some(format) = env.get(ENV_LOG_FORMAT) {
        config.logging.format = format.clone();
    }
    if let Some(enabled) = env.get(ENV_NOTIFICATIONS_ENABLED) {
        config.notifications.enabled = match enabled.as_str() {
            "true" | "1" => true,
            "false" | "0" => false,
            other => {
                return Err(ConfigError::Validation {
                    field: "notifications.enabled".to_string(),
                    message: format!(
                        "expected true/false, got {other:?} (from {ENV_NOTIFICATIONS_ENABLED})"
                    ),
                })
            },
        };
    }
    Ok(())
}
