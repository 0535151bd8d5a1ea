//! Guardian Test - shared test support.
//!
//! Mock implementations of the engine's external collaborators (identity,
//! notifier, provider adapter, clock) plus fixtures for the common entity
//! shapes. Production code must never depend on this crate.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod fixtures;
pub mod mocks;

pub use fixtures::{
    test_appellant, test_draft, test_policy, test_provider, test_resource, OWNER_EMAIL,
};
pub use mocks::{FrozenClock, MockIdentityService, MockProviderAdapter, RecordingNotifier};
