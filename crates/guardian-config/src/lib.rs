//! Guardian Config - layered service configuration.
//!
//! A single [`Config`] type loaded with file-over-defaults precedence:
//!
//! 1. **Environment variables** (`GUARDIAN_*`) — highest priority
//! 2. **Config file** (path supplied by the deployment)
//! 3. **Embedded defaults** (`defaults.toml` compiled into the binary)
//!
//! This crate has no dependencies on other guardian crates; conversion to
//! domain types (log setup, store construction) happens at the integration
//! boundary.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod error;
pub mod loader;
pub mod types;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::load;
pub use types::{Config, LoggingSection, NotificationsSection, StorageBackend, StorageSection};
