//! Guardian Telemetry - logging setup for the Guardian service.
//!
//! # Example
//!
//! ```rust,no_run
//! use guardian_telemetry::{setup_logging, LogConfig, LogFormat};
//!
//! # fn main() -> Result<(), guardian_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Compact)
//!     .with_directive("guardian_engine=debug");
//! setup_logging(&config)?;
//! tracing::info!("engine starting");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{setup_default_logging, setup_logging, LogConfig, LogFormat, LogTarget};
