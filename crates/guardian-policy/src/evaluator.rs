//! Approval step evaluation.
//!
//! [`advance`] brings an appeal's approval trail to the minimal consistent
//! state under its pinned policy: auto-resolution conditions fire, steps
//! with nobody to decide them become blocked, and evaluation halts at the
//! first step that needs a human. It never touches the appeal's overall
//! status — that is the lifecycle engine's call.

use guardian_core::{Appeal, ApprovalStatus, Clock, Policy};

use crate::condition;
use crate::error::{PolicyError, PolicyResult};

/// Advance the appeal's approvals in place.
///
/// Walks the trail in index order:
/// - settled steps (`approved`/`skipped`) are passed over;
/// - a step whose condition evaluates true transitions to `approved`;
/// - a step with no approvers and no satisfied condition becomes `blocked`
///   and halts the walk;
/// - a step waiting on approvers stays `pending` and halts the walk;
/// - a `rejected` step halts the walk (everything after it is already
///   `skipped`).
///
/// Steps after the halt point are left untouched; their status is only
/// meaningful once the walk reaches them.
///
/// # Errors
///
/// Fails when a condition references an unrecognized context key or the
/// resource cannot be serialized for path lookup.
pub fn advance(appeal: &mut Appeal, policy: &Policy, clock: &dyn Clock) -> PolicyResult<()> {
    let appellant = appeal.appellant.clone();
    let resource_tree =
        serde_json::to_value(&appeal.resource).map_err(|e| PolicyError::Internal(e.to_string()))?;

    for i in 0..appeal.approvals.len() {
        match appeal.approvals[i].status {
            ApprovalStatus::Approved | ApprovalStatus::Skipped => continue,
            ApprovalStatus::Rejected => break,
            ApprovalStatus::Pending | ApprovalStatus::Blocked => {
                let auto_approved = match policy.steps.get(i).and_then(|s| s.condition.as_ref()) {
                    Some(cond) => condition::evaluate(cond, &appellant, &resource_tree)?,
                    None => false,
                };

                let approval = &mut appeal.approvals[i];
                if auto_approved {
                    approval.status = ApprovalStatus::Approved;
                    approval.updated_at = clock.now();
                    continue;
                }
                if approval.approvers.is_empty() {
                    if approval.status != ApprovalStatus::Blocked {
                        approval.status = ApprovalStatus::Blocked;
                        approval.updated_at = clock.now();
                    }
                    break;
                }
                break;
            },
        }
    }

    Ok(())
}
