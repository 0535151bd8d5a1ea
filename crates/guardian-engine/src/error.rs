//! Lifecycle engine error types.
//!
//! The engine prefers surfacing a clean error over silent partial
//! progress: every variant below leaves the stored appeal unchanged except
//! where the operation contract says otherwise (a failed grant still
//! persists the approval that triggered it).

use thiserror::Error;

use guardian_core::{AppealId, ResourceId};
use guardian_policy::PolicyError;
use guardian_store::StorageError;

use crate::orchestrator::ProviderError;

/// Errors from the appeal lifecycle operations.
#[derive(Debug, Error)]
pub enum AppealError {
    // Validation
    /// The appeal id is the nil uuid.
    #[error("appeal id is empty")]
    AppealIdEmpty,

    /// The approval name is empty.
    #[error("approval name is required")]
    ApprovalNameEmpty,

    /// The provider disallows permanent access and the draft carries no
    /// expiration.
    #[error("an expiration date is required for this provider")]
    ExpirationDateRequired,

    // Not found
    /// No appeal with this id.
    #[error("appeal not found: {0}")]
    AppealNotFound(AppealId),

    /// A draft references an unknown resource.
    #[error("resource not found: {0}")]
    ResourceNotFound(ResourceId),

    /// The named approval step does not exist on the appeal.
    #[error("approval step not found: {0:?}")]
    ApprovalNameNotFound(String),

    // Duplicate
    /// A pending appeal already exists for the same
    /// `(appellant, resource, role)` tuple.
    #[error("a pending appeal already exists for this resource and role")]
    AppealDuplicate,

    // Authorization
    /// The actor is not in the step's approver set.
    #[error("actor is not an eligible approver for this step")]
    ActionForbidden,

    // State violations: appeal status
    /// The appeal was already canceled.
    #[error("appeal has been canceled")]
    AppealStatusCanceled,

    /// The appeal is already active.
    #[error("appeal has already been approved")]
    AppealStatusApproved,

    /// The appeal was already rejected.
    #[error("appeal has been rejected")]
    AppealStatusRejected,

    /// The appeal was already terminated.
    #[error("appeal access has been terminated")]
    AppealStatusTerminated,

    /// The appeal is still pending (for operations requiring an active
    /// appeal).
    #[error("appeal is still pending")]
    AppealStatusPending,

    // State violations: approval steps
    /// An earlier step has not settled yet.
    #[error("an earlier approval step is still pending")]
    ApprovalDependencyIsPending,

    /// The named step was already approved.
    #[error("approval step has already been approved")]
    ApprovalStatusApproved,

    /// The named step was already rejected.
    #[error("approval step has already been rejected")]
    ApprovalStatusRejected,

    /// The named step was already skipped.
    #[error("approval step has been skipped")]
    ApprovalStatusSkipped,

    // External collaborators, propagated verbatim
    /// Policy or approver resolution failed.
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// The persistence layer failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A provider adapter failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Result type for lifecycle operations.
pub type AppealResult<T> = Result<T, AppealError>;
