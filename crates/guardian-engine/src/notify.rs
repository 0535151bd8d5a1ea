//! Notification fan-out.
//!
//! Pure message construction plus a best-effort delivery seam. Delivery
//! failures are logged at error level and swallowed; they never roll back
//! or poison a state transition.

use async_trait::async_trait;

use guardian_core::{Appeal, Email};

/// A message addressed to one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// The recipient.
    pub user: Email,
    /// The message body.
    pub message: String,
}

/// Error from the notification transport.
#[derive(Debug, thiserror::Error)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// External notification transport (email, chat, …).
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a batch of notifications.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] on delivery failure. Callers treat delivery
    /// as best-effort and only log the error.
    async fn notify(&self, notifications: Vec<Notification>) -> Result<(), NotifyError>;
}

/// Messages for the next pending step's approvers, one per approver.
///
/// Empty when the appeal has no reachable pending step (settled, blocked,
/// or rejected trails).
#[must_use]
pub fn next_approver_notifications(appeal: &Appeal) -> Vec<Notification> {
    let Some(approval) = appeal.next_pending_approval() else {
        return Vec::new();
    };
    approval
        .approvers
        .iter()
        .map(|approver| Notification {
            user: approver.clone(),
            message: format!(
                "You have an appeal from {} to access {}",
                appeal.appellant, appeal.resource.urn
            ),
        })
        .collect()
}

/// Message to the appellant when the appeal goes active.
#[must_use]
pub fn appeal_approved_notification(appeal: &Appeal) -> Notification {
    Notification {
        user: appeal.appellant.clone(),
        message: format!(
            "Your appeal to {} has been approved",
            appeal.resource.urn
        ),
    }
}

/// Message to the appellant when the appeal is rejected.
#[must_use]
pub fn appeal_rejected_notification(appeal: &Appeal) -> Notification {
    Notification {
        user: appeal.appellant.clone(),
        message: format!("Your appeal to {} is rejected", appeal.resource.urn),
    }
}

/// Message to the appellant when granted access is revoked.
#[must_use]
pub fn access_revoked_notification(appeal: &Appeal) -> Notification {
    Notification {
        user: appeal.appellant.clone(),
        message: format!(
            "Your access to {} has been revoked",
            appeal.resource.urn
        ),
    }
}
