//! Policy evaluation error types.

use guardian_core::InvalidEmail;
use thiserror::Error;

use crate::approvers::IdentityError;

/// Errors from policy resolution, approver resolution, and step evaluation.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The resource names a provider type nobody registered.
    #[error("provider type not found: {provider_type}")]
    ProviderTypeNotFound {
        /// The unknown provider type.
        provider_type: String,
    },

    /// The provider type exists but not under this URN.
    #[error("provider URN not found: {provider_type}/{urn}")]
    ProviderUrnNotFound {
        /// The provider type.
        provider_type: String,
        /// The unknown URN.
        urn: String,
    },

    /// The provider does not declare this resource type.
    #[error("resource type not declared by provider: {resource_type}")]
    ResourceTypeNotFound {
        /// The undeclared resource type.
        resource_type: String,
    },

    /// The requested role is not among the resource's allowed roles.
    #[error("invalid role: {role}")]
    InvalidRole {
        /// The rejected role id.
        role: String,
    },

    /// The bound policy id is absent from the policy store.
    #[error("policy not found: {id}")]
    PolicyIdNotFound {
        /// The missing policy id.
        id: String,
    },

    /// The policy id exists but not at the bound version.
    #[error("policy version not found: {id}@{version}")]
    PolicyVersionNotFound {
        /// The policy id.
        id: String,
        /// The missing version.
        version: u32,
    },

    /// The approver specifier uses an unrecognized prefix.
    #[error("approver key not recognized: {key:?}")]
    ApproverKeyNotRecognized {
        /// The offending specifier.
        key: String,
    },

    /// The approver path does not exist in the resource tree.
    #[error("approver key not found in resource: {path:?}")]
    ApproverKeyNotFound {
        /// The missing path.
        path: String,
    },

    /// The approver path resolved to something other than a string or a
    /// list of strings.
    #[error("approver value has invalid type at {path:?}")]
    ApproverInvalidType {
        /// The offending path.
        path: String,
    },

    /// A condition field uses an unrecognized prefix.
    #[error("condition key not recognized: {key:?}")]
    ConditionKeyNotRecognized {
        /// The offending field.
        key: String,
    },

    /// A resolved approver identity failed email validation.
    #[error(transparent)]
    InvalidEmail(#[from] InvalidEmail),

    /// The identity service failed.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Internal evaluation failure (serialization and the like).
    #[error("policy evaluation failed: {0}")]
    Internal(String),
}

/// Result type for policy operations.
pub type PolicyResult<T> = Result<T, PolicyError>;
