//! Guardian Core - Foundation types for the Guardian access-governance engine.
//!
//! This crate provides:
//! - The domain entities: [`Appeal`], [`Approval`], [`Resource`], [`Policy`],
//!   and [`ProviderConfig`]
//! - Typed identifiers and the validated [`Email`] identity type
//! - Status enums for the appeal and approval state machines
//! - The injected [`Clock`] so time-dependent logic is testable

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod appeal;
pub mod clock;
pub mod policy;
pub mod provider;
pub mod resource;
pub mod types;

pub use appeal::{
    Appeal, AppealAction, AppealDraft, AppealOptions, AppealStatus, Approval, ApprovalAction,
    ApprovalStatus,
};
pub use clock::{Clock, SystemClock};
pub use policy::{ApprovalCondition, MatchCondition, Policy, PolicyStep};
pub use provider::{AppealConfig, PolicyRef, ProviderConfig, ResourceConfig, RoleConfig};
pub use resource::Resource;
pub use types::{AppealId, Email, InvalidEmail, ResourceId, Timestamp};
