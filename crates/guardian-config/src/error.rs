//! Configuration error types.

use thiserror::Error;

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file exists but could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// The offending path.
        path: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A config layer failed to parse as TOML.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// The offending path (or `<embedded defaults>`).
        path: String,
        /// The underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// The merged configuration failed a validation check.
    #[error("invalid config value for {field}: {message}")]
    Validation {
        /// The dotted field path.
        field: String,
        /// What was wrong with it.
        message: String,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
