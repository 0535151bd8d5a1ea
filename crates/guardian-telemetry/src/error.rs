//! Telemetry error types.

use thiserror::Error;

/// Errors from logging setup.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A level or directive failed to parse.
    #[error("invalid log filter: {0}")]
    InvalidFilter(String),

    /// The global subscriber could not be installed (usually because one
    /// is already set).
    #[error("failed to initialize logging: {0}")]
    InitFailed(String),
}

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
