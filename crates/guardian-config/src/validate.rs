//! Post-merge configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::{Config, StorageBackend};

/// Known logging formats.
const LOG_FORMATS: &[&str] = &["pretty", "compact", "json"];

/// Known base level names; directives beyond these are validated by the
/// telemetry layer at setup time.
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Validate a fully-merged configuration.
///
/// # Errors
///
/// Returns the first validation failure found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    if config.storage.backend != StorageBackend::Memory && config.storage.path.is_none() {
        return Err(ConfigError::Validation {
            field: "storage.path".to_string(),
            message: "a data directory is required for durable backends".to_string(),
        });
    }

    if !LOG_FORMATS.contains(&config.logging.format.as_str()) {
        return Err(ConfigError::Validation {
            field: "logging.format".to_string(),
            message: format!(
                "unknown format {:?}; expected one of: {}",
                config.logging.format,
                LOG_FORMATS.join(", ")
            ),
        });
    }

    // The base level must be recognizable; comma-separated directives are
    // allowed through as-is.
    let base = config
        .logging
        .level
        .split(',')
        .next()
        .unwrap_or_default()
        .trim();
    if !base.is_empty() && !base.contains('=') && !LOG_LEVELS.contains(&base) {
        return Err(ConfigError::Validation {
            field: "logging.level".to_string(),
            message: format!("unknown level {base:?}"),
        });
    }

    Ok(())
}
