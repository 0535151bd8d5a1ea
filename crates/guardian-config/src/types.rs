//! Configuration struct definitions.
//!
//! Every section implements [`Default`] with the embedded-defaults values,
//! so a bare `[section]` header in TOML produces a working configuration.

use serde::{Deserialize, Serialize};

/// Root configuration for the Guardian service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Persistence backend selection.
    pub storage: StorageSection,
    /// Logging level and format.
    pub logging: LoggingSection,
    /// Notification delivery switches.
    pub notifications: NotificationsSection,
}

/// Which persistence backend to run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// In-process maps; state dies with the process.
    #[default]
    Memory,
    /// Embedded `SurrealDB` at `storage.path`.
    Surrealdb,
}

/// Persistence configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Backend selection.
    pub backend: StorageBackend,
    /// Data directory for the embedded backend. Required when `backend`
    /// is not `memory`.
    pub path: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Default level filter (`trace` … `error`), plus optional per-crate
    /// directives in `tracing` syntax.
    pub level: String,
    /// Output format: `pretty`, `compact`, or `json`.
    pub format: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Notification delivery configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsSection {
    /// Master switch; when off, the dispatcher drops everything silently.
    pub enabled: bool,
}

impl Default for NotificationsSection {
    fn default() -> Self {
        Self { enabled: true }
    }
}
