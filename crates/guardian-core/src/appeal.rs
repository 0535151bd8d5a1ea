//! Appeals and their approval trail.
//!
//! An [`Appeal`] is a user's request for a role on a resource. It owns an
//! ordered list of [`Approval`]s, one per step of the policy that was pinned
//! at intake. The lifecycle engine is the only writer of these records once
//! they exist; the status enums below define the legal states.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::resource::Resource;
use crate::types::{AppealId, Email, ResourceId, Timestamp};

/// Lifecycle state of an appeal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppealStatus {
    /// Waiting on one or more approval steps.
    Pending,
    /// Fully approved and granted on the provider.
    Active,
    /// An approver rejected a step.
    Rejected,
    /// Withdrawn by the appellant before resolution.
    Canceled,
    /// Access was revoked after having been active.
    Terminated,
}

impl AppealStatus {
    /// Terminal states admit no further transitions.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for AppealStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Active => write!(f, "active"),
            Self::Rejected => write!(f, "rejected"),
            Self::Canceled => write!(f, "canceled"),
            Self::Terminated => write!(f, "terminated"),
        }
    }
}

/// State of a single approval step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    /// Waiting for an approver decision.
    Pending,
    /// Approved, either by an actor or by an auto-resolution condition.
    Approved,
    /// Rejected by an actor.
    Rejected,
    /// Bypassed because an earlier step was rejected.
    Skipped,
    /// No approvers and no satisfied condition; stuck until amended.
    Blocked,
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
            Self::Skipped => write!(f, "skipped"),
            Self::Blocked => write!(f, "blocked"),
        }
    }
}

/// Appellant-supplied options on an appeal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppealOptions {
    /// Absolute time at which granted access should expire. Required for
    /// providers that disallow permanent access.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<Timestamp>,
}

/// A user's request for a role on a resource, plus its lifecycle state and
/// approval trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appeal {
    /// Unique identifier.
    pub id: AppealId,
    /// The requesting identity.
    pub appellant: Email,
    /// The resource being appealed for.
    pub resource_id: ResourceId,
    /// Snapshot of the resource, hydrated at intake so downstream paths
    /// need no join. `resource_id` stays the canonical reference.
    pub resource: Resource,
    /// The requested role id.
    pub role: String,
    /// Current lifecycle state.
    pub status: AppealStatus,
    /// Pinned policy id; immutable after creation.
    pub policy_id: String,
    /// Pinned policy version; immutable after creation.
    pub policy_version: u32,
    /// Appellant-supplied options.
    #[serde(default)]
    pub options: AppealOptions,
    /// Free-form labels, opaque to the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<serde_json::Value>,
    /// The approval trail, ordered by step index.
    pub approvals: Vec<Approval>,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last mutation time.
    pub updated_at: Timestamp,
    /// When access was revoked, for terminated appeals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<Timestamp>,
    /// Who revoked access.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_by: Option<Email>,
    /// Why access was revoked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoke_reason: Option<String>,
}

impl Appeal {
    /// The next approval waiting on a human decision.
    ///
    /// Walks the trail in index order, skipping settled steps. Returns
    /// `None` when the walk hits a blocked or rejected step: later steps
    /// are unreachable, so nobody should be notified about them.
    #[must_use]
    pub fn next_pending_approval(&self) -> Option<&Approval> {
        for approval in &self.approvals {
            match approval.status {
                ApprovalStatus::Approved | ApprovalStatus::Skipped => continue,
                ApprovalStatus::Pending => return Some(approval),
                ApprovalStatus::Blocked | ApprovalStatus::Rejected => return None,
            }
        }
        None
    }

    /// Look up an approval step by name.
    #[must_use]
    pub fn approval_named(&self, name: &str) -> Option<&Approval> {
        self.approvals.iter().find(|a| a.name == name)
    }

    /// Whether every step has settled successfully and the final step is
    /// approved — the precondition for activating the appeal.
    #[must_use]
    pub fn is_fully_approved(&self) -> bool {
        !self.approvals.is_empty()
            && self
                .approvals
                .iter()
                .all(|a| matches!(a.status, ApprovalStatus::Approved | ApprovalStatus::Skipped))
            && matches!(
                self.approvals.last().map(|a| a.status),
                Some(ApprovalStatus::Approved)
            )
    }
}

/// One step in an appeal's review, bound to a policy step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Approval {
    /// Step name, from the policy.
    pub name: String,
    /// 0-based position in the trail.
    pub index: usize,
    /// Current step state.
    pub status: ApprovalStatus,
    /// Pinned policy id.
    pub policy_id: String,
    /// Pinned policy version.
    pub policy_version: u32,
    /// The identities allowed to decide this step.
    pub approvers: Vec<Email>,
    /// The identity that decided the step, once decided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<Email>,
    /// Last mutation time.
    pub updated_at: Timestamp,
}

/// A draft appeal submitted to intake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppealDraft {
    /// The requesting identity.
    pub appellant: Email,
    /// The resource being appealed for.
    pub resource_id: ResourceId,
    /// The requested role id.
    pub role: String,
    /// Appellant-supplied options.
    #[serde(default)]
    pub options: AppealOptions,
    /// Free-form labels, opaque to the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<serde_json::Value>,
}

/// The decision an actor can take on an approval step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppealAction {
    /// Approve the step.
    Approve,
    /// Reject the step, which rejects the whole appeal.
    Reject,
}

impl fmt::Display for AppealAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approve => write!(f, "approve"),
            Self::Reject => write!(f, "reject"),
        }
    }
}

/// An actor's decision on a named approval step of an appeal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalAction {
    /// The appeal being acted on.
    pub appeal_id: AppealId,
    /// The named step being decided.
    pub approval_name: String,
    /// Who is deciding.
    pub actor: Email,
    /// The decision.
    pub action: AppealAction,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approval(index: usize, status: ApprovalStatus) -> Approval {
        Approval {
            name: format!("step-{index}"),
            index,
            status,
            policy_id: "p1".to_string(),
            policy_version: 1,
            approvers: vec![Email::parse("bob@x").unwrap()],
            actor: None,
            updated_at: Timestamp::now(),
        }
    }

    fn appeal_with(approvals: Vec<Approval>) -> Appeal {
        Appeal {
            id: AppealId::new(),
            appellant: Email::parse("u@x").unwrap(),
            resource_id: ResourceId::new(),
            resource: Resource::new(ResourceId::new(), "metabase", "my-mb", "database", "db/1"),
            role: "read".to_string(),
            status: AppealStatus::Pending,
            policy_id: "p1".to_string(),
            policy_version: 1,
            options: AppealOptions::default(),
            labels: None,
            approvals,
            created_at: Timestamp::now(),
            updated_at: Timestamp::now(),
            revoked_at: None,
            revoked_by: None,
            revoke_reason: None,
        }
    }

    #[test]
    fn test_next_pending_skips_settled_steps() {
        let appeal = appeal_with(vec![
            approval(0, ApprovalStatus::Approved),
            approval(1, ApprovalStatus::Pending),
        ]);
        assert_eq!(appeal.next_pending_approval().unwrap().index, 1);
    }

    #[test]
    fn test_next_pending_stops_at_blocked() {
        let appeal = appeal_with(vec![
            approval(0, ApprovalStatus::Blocked),
            approval(1, ApprovalStatus::Pending),
        ]);
        assert!(appeal.next_pending_approval().is_none());
    }

    #[test]
    fn test_fully_approved_requires_final_approval() {
        let settled = appeal_with(vec![
            approval(0, ApprovalStatus::Skipped),
            approval(1, ApprovalStatus::Approved),
        ]);
        assert!(settled.is_fully_approved());

        let skipped_tail = appeal_with(vec![
            approval(0, ApprovalStatus::Approved),
            approval(1, ApprovalStatus::Skipped),
        ]);
        assert!(!skipped_tail.is_fully_approved());

        let empty = appeal_with(vec![]);
        assert!(!empty.is_fully_approved());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(AppealStatus::Pending.to_string(), "pending");
        assert_eq!(ApprovalStatus::Blocked.to_string(), "blocked");
        assert_eq!(AppealAction::Reject.to_string(), "reject");
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!AppealStatus::Pending.is_terminal());
        for status in [
            AppealStatus::Active,
            AppealStatus::Rejected,
            AppealStatus::Canceled,
            AppealStatus::Terminated,
        ] {
            assert!(status.is_terminal());
        }
    }
}
