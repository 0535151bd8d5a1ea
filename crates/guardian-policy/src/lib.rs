//! Guardian Policy - Policy-driven evaluation of appeals.
//!
//! This crate provides the three pure-ish pieces between intake and the
//! lifecycle engine:
//! - [`PolicyResolver`]: maps a `(provider, resource type, role)` request to
//!   its pinned policy and ordered steps
//! - [`ApproverResolver`]: turns a step's approver specifier into a concrete
//!   set of validated email identities
//! - [`evaluator::advance`]: folds auto-resolution conditions over an
//!   appeal's approval trail
//!
//! Only approver resolution may block (it can call out to the identity
//! service); everything else is synchronous and side-effect free.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod approvers;
pub mod condition;
pub mod error;
pub mod evaluator;
mod path;
pub mod resolver;

pub use approvers::{ApproverResolver, ApproverSpec, IdentityError, IdentityService};
pub use error::{PolicyError, PolicyResult};
pub use resolver::{PolicyResolver, ResolvedPolicy};
