//! Logging configuration and subscriber installation.

use tracing_subscriber::filter::EnvFilter;

use crate::error::{TelemetryError, TelemetryResult};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Multi-line human-readable output.
    #[default]
    Pretty,
    /// Single-line output for terminals and files.
    Compact,
    /// Structured JSON, one object per line.
    Json,
}

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogTarget {
    /// Standard error.
    #[default]
    Stderr,
    /// Standard output.
    Stdout,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Base level filter (`trace` … `error`).
    pub level: String,
    /// Output format.
    pub format: LogFormat,
    /// Output target.
    pub target: LogTarget,
    /// Additional per-crate directives (`guardian_engine=debug`).
    pub directives: Vec<String>,
}

impl LogConfig {
    /// Create a config with the given base level and defaults elsewhere.
    #[must_use]
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            format: LogFormat::default(),
            target: LogTarget::default(),
            directives: Vec::new(),
        }
    }

    /// Set the output format (builder style).
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the output target (builder style).
    #[must_use]
    pub fn with_target(mut self, target: LogTarget) -> Self {
        self.target = target;
        self
    }

    /// Add a per-crate directive (builder style).
    #[must_use]
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    /// Build the combined `EnvFilter` for this config.
    fn filter(&self) -> TelemetryResult<EnvFilter> {
        let mut spec = self.level.clone();
        for directive in &self.directives {
            spec.push(',');
            spec.push_str(directive);
        }
        EnvFilter::try_new(&spec).map_err(|e| TelemetryError::InvalidFilter(e.to_string()))
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new("info")
    }
}

/// Install the global subscriber described by `config`.
///
/// # Errors
///
/// Fails when the filter does not parse or a global subscriber is already
/// installed.
pub fn setup_logging(config: &LogConfig) -> TelemetryResult<()> {
    let filter = config.filter()?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let init_result = match (config.format, config.target) {
        (LogFormat::Pretty, LogTarget::Stderr) => {
            builder.pretty().with_writer(std::io::stderr).try_init()
        },
        (LogFormat::Pretty, LogTarget::Stdout) => builder.pretty().try_init(),
        (LogFormat::Compact, LogTarget::Stderr) => {
            builder.compact().with_writer(std::io::stderr).try_init()
        },
        (LogFormat::Compact, LogTarget::Stdout) => builder.compact().try_init(),
        (LogFormat::Json, LogTarget::Stderr) => {
            builder.json().with_writer(std::io::stderr).try_init()
        },
        (LogFormat::Json, LogTarget::Stdout) => builder.json().try_init(),
    };
    init_result.map_err(|e| TelemetryError::InitFailed(e.to_string()))
}

/// Install an `info`-level pretty subscriber on stderr.
///
/// # Errors
///
/// Same failure modes as [`setup_logging`].
pub fn setup_default_logging() -> TelemetryResult<()> {
    setup_logging(&LogConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_accumulates() {
        let config = LogConfig::new("debug")
            .with_format(LogFormat::Json)
            .with_target(LogTarget::Stdout)
            .with_directive("guardian_engine=trace")
            .with_directive("guardian_store=warn");
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.target, LogTarget::Stdout);
        assert_eq!(config.directives.len(), 2);
    }

    #[test]
    fn test_filter_parses_levels_and_directives() {
        let config = LogConfig::new("info").with_directive("guardian_engine=debug");
        assert!(config.filter().is_ok());
    }

    #[test]
    fn test_invalid_filter_is_reported() {
        let config = LogConfig::new("not=a=level");
        assert!(matches!(
            config.filter(),
            Err(TelemetryError::InvalidFilter(_))
        ));
    }
}
