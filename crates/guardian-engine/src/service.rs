//! The appeal lifecycle service.
//!
//! Public operations: [`AppealService::create`], [`AppealService::make_action`],
//! [`AppealService::cancel`], [`AppealService::revoke`], plus the read-side
//! [`AppealService::get_by_id`] and [`AppealService::find`]. Each executes
//! independently; operations on the same appeal serialize on an internal
//! per-appeal lock.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use guardian_core::{
    Appeal, AppealAction, AppealDraft, AppealId, AppealStatus, Approval, ApprovalAction,
    ApprovalStatus, Clock, Email, Policy, Resource,
};
use guardian_policy::{evaluator, ApproverResolver, IdentityService, PolicyError, PolicyResolver};
use guardian_store::{
    AppealFilter, AppealRepository, PolicyStore, ProviderStore, ResourceStore, StorageError,
};

use crate::error::{AppealError, AppealResult};
use crate::index::PendingIndex;
use crate::locks::AppealLocks;
use crate::notify::{
    access_revoked_notification, appeal_approved_notification, appeal_rejected_notification,
    next_approver_notifications, Notification, Notifier,
};
use crate::orchestrator::AccessOrchestrator;

/// The persistence handles the service operates on.
#[derive(Clone)]
pub struct Stores {
    /// Appeals and their approval trails.
    pub appeals: Arc<dyn AppealRepository>,
    /// Resources available for appeal.
    pub resources: Arc<dyn ResourceStore>,
    /// Provider registrations.
    pub providers: Arc<dyn ProviderStore>,
    /// Approval policies.
    pub policies: Arc<dyn PolicyStore>,
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}

/// The appeal lifecycle engine.
pub struct AppealService {
    stores: Stores,
    approver_resolver: ApproverResolver,
    notifier: Arc<dyn Notifier>,
    orchestrator: AccessOrchestrator,
    clock: Arc<dyn Clock>,
    locks: AppealLocks,
}

impl AppealService {
    /// Assemble the service from its collaborators.
    #[must_use]
    pub fn new(
        stores: Stores,
        identity: Arc<dyn IdentityService>,
        notifier: Arc<dyn Notifier>,
        orchestrator: AccessOrchestrator,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            stores,
            approver_resolver: ApproverResolver::new(identity),
            notifier,
            orchestrator,
            clock,
            locks: AppealLocks::new(),
        }
    }

    /// Fetch one appeal by id.
    ///
    /// # Errors
    ///
    /// Rejects the nil id; a missing appeal is [`AppealError::AppealNotFound`].
    pub async fn get_by_id(&self, id: AppealId) -> AppealResult<Appeal> {
        if id.is_nil() {
            return Err(AppealError::AppealIdEmpty);
        }
        self.stores
            .appeals
            .get_by_id(id)
            .await?
            .ok_or(AppealError::AppealNotFound(id))
    }

    /// Fetch appeals matching a filter.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub async fn find(&self, filter: &AppealFilter) -> AppealResult<Vec<Appeal>> {
        Ok(self.stores.appeals.find(filter).await?)
    }

    /// Intake a batch of appeal drafts.
    ///
    /// The whole batch is validated and resolved before anything is
    /// persisted; the insert itself is atomic, so a failure anywhere leaves
    /// no partial writes. Notification of the first pending approvers is
    /// best-effort.
    ///
    /// # Errors
    ///
    /// Fails on unknown resources, policy-resolution failures, a missing
    /// required expiration, and duplicate pending appeals (both against the
    /// store and within the batch).
    pub async fn create(&self, drafts: Vec<AppealDraft>) -> AppealResult<Vec<Appeal>> {
        if drafts.is_empty() {
            return Ok(Vec::new());
        }

        let resources = self.load_resources(&drafts).await?;
        let resolver = PolicyResolver::new(
            &self.stores.providers.list().await?,
            &self.stores.policies.list().await?,
        );
        let mut pending = self.pending_index_for(&drafts).await?;

        let mut created = Vec::with_capacity(drafts.len());
        let mut notifications = Vec::new();
        for draft in drafts {
            if pending.contains(&draft.appellant, draft.resource_id, &draft.role) {
                return Err(AppealError::AppealDuplicate);
            }
            let resource = resources
                .get(&draft.resource_id)
                .ok_or(AppealError::ResourceNotFound(draft.resource_id))?
                .clone();

            let appeal = self.admit(draft, resource, &resolver).await?;
            pending.insert(&appeal);
            notifications.extend(next_approver_notifications(&appeal));
            created.push(appeal);
        }

        // A policy whose steps all auto-resolve settles at intake; those
        // appeals are granted and activated before the batch is persisted.
        for appeal in &mut created {
            if appeal.is_fully_approved() {
                self.orchestrator.grant(appeal).await?;
                appeal.status = AppealStatus::Active;
                notifications.push(appeal_approved_notification(appeal));
            }
        }

        match self.stores.appeals.bulk_insert(&created).await {
            Ok(()) => {},
            Err(StorageError::Conflict(_)) => return Err(AppealError::AppealDuplicate),
            Err(e) => return Err(e.into()),
        }

        info!(count = created.len(), "appeals created");
        self.dispatch(notifications).await;
        Ok(created)
    }

    /// Apply an actor's approve/reject decision to a named step.
    ///
    /// On the final approval the provider grant runs first; only on grant
    /// success does the appeal flip to active. On grant failure the
    /// approval mutation alone is persisted, the appeal stays pending, and
    /// the adapter error is surfaced.
    ///
    /// # Errors
    ///
    /// Fails on unknown appeals or step names, non-pending appeals or
    /// steps, out-of-order actions, actors outside the approver set, and
    /// collaborator failures.
    pub async fn make_action(&self, action: ApprovalAction) -> AppealResult<Appeal> {
        if action.appeal_id.is_nil() {
            return Err(AppealError::AppealIdEmpty);
        }
        if action.approval_name.is_empty() {
            return Err(AppealError::ApprovalNameEmpty);
        }

        let _guard = self.locks.acquire(action.appeal_id).await;
        let mut appeal = self.get_by_id(action.appeal_id).await?;
        ensure_pending(appeal.status)?;
        let policy = self.pinned_policy(&appeal).await?;

        let step = self.locate_step(&appeal, &action)?;
        let now = self.clock.now();
        {
            let approval = &mut appeal.approvals[step];
            approval.actor = Some(action.actor.clone());
            approval.updated_at = now;
        }

        match action.action {
            AppealAction::Approve => {
                appeal.approvals[step].status = ApprovalStatus::Approved;
                evaluator::advance(&mut appeal, &policy, self.clock.as_ref())?;
                appeal.updated_at = now;

                if appeal.is_fully_approved() {
                    if let Err(e) = self.orchestrator.grant(&appeal).await {
                        // Keep the audit trail: persist the approval, but
                        // the appeal must not claim active.
                        self.stores.appeals.update(&appeal).await?;
                        return Err(e.into());
                    }
                    appeal.status = AppealStatus::Active;
                }
                self.stores.appeals.update(&appeal).await?;
            },
            AppealAction::Reject => {
                appeal.approvals[step].status = ApprovalStatus::Rejected;
                appeal.status = AppealStatus::Rejected;
                for later in &mut appeal.approvals[step + 1..] {
                    later.status = ApprovalStatus::Skipped;
                    later.updated_at = now;
                }
                appeal.updated_at = now;
                self.stores.appeals.update(&appeal).await?;
            },
        }

        info!(
            appeal = %appeal.id,
            step = %action.approval_name,
            actor = %action.actor,
            action = %action.action,
            status = %appeal.status,
            "approval action applied"
        );

        let notifications = match appeal.status {
            AppealStatus::Active => vec![appeal_approved_notification(&appeal)],
            AppealStatus::Rejected => vec![appeal_rejected_notification(&appeal)],
            _ => next_approver_notifications(&appeal),
        };
        self.dispatch(notifications).await;

        Ok(appeal)
    }

    /// Cancel a pending appeal.
    ///
    /// No provider interaction; actor identity checks are deferred.
    ///
    /// # Errors
    ///
    /// Fails when the appeal is missing or no longer pending.
    pub async fn cancel(&self, id: AppealId) -> AppealResult<Appeal> {
        let _guard = self.locks.acquire(id).await;
        let mut appeal = self.get_by_id(id).await?;
        ensure_pending(appeal.status)?;

        appeal.status = AppealStatus::Canceled;
        appeal.updated_at = self.clock.now();
        self.stores.appeals.update(&appeal).await?;
        info!(appeal = %appeal.id, "appeal canceled");
        Ok(appeal)
    }

    /// Revoke an active appeal's access.
    ///
    /// The terminated record is persisted first; if the provider revoke
    /// then fails, the stored appeal is rolled back to its active state and
    /// the adapter error is surfaced.
    ///
    /// # Errors
    ///
    /// Fails when the appeal is missing or not active, and on collaborator
    /// failures.
    pub async fn revoke(
        &self,
        id: AppealId,
        actor: Email,
        reason: impl Into<String> + Send,
    ) -> AppealResult<Appeal> {
        let _guard = self.locks.acquire(id).await;
        let appeal = self.get_by_id(id).await?;
        ensure_active(appeal.status)?;

        let now = self.clock.now();
        let mut revoked = appeal.clone();
        revoked.status = AppealStatus::Terminated;
        revoked.revoked_at = Some(now);
        revoked.revoked_by = Some(actor);
        revoked.revoke_reason = Some(reason.into());
        revoked.updated_at = now;

        self.stores.appeals.update(&revoked).await?;
        if let Err(e) = self.orchestrator.revoke(&appeal).await {
            self.stores.appeals.update(&appeal).await?;
            return Err(e.into());
        }

        info!(appeal = %revoked.id, "access revoked");
        self.dispatch(vec![access_revoked_notification(&appeal)]).await;
        Ok(revoked)
    }

    // -- intake helpers --

    async fn load_resources(
        &self,
        drafts: &[AppealDraft],
    ) -> AppealResult<HashMap<guardian_core::ResourceId, Resource>> {
        let ids: Vec<_> = drafts.iter().map(|d| d.resource_id).collect();
        let resources = self.stores.resources.find_by_ids(&ids).await?;
        Ok(resources.into_iter().map(|r| (r.id, r)).collect())
    }

    async fn pending_index_for(&self, drafts: &[AppealDraft]) -> AppealResult<PendingIndex> {
        let mut appellants: Vec<Email> = drafts.iter().map(|d| d.appellant.clone()).collect();
        appellants.sort();
        appellants.dedup();
        let pending = self
            .stores
            .appeals
            .find(
                &AppealFilter::new()
                    .with_statuses(vec![AppealStatus::Pending])
                    .with_appellants(appellants),
            )
            .await?;
        Ok(PendingIndex::from_appeals(&pending))
    }

    /// Resolve one draft into a pending appeal with its approval trail.
    async fn admit(
        &self,
        draft: AppealDraft,
        resource: Resource,
        resolver: &PolicyResolver,
    ) -> AppealResult<Appeal> {
        let resolved = resolver.resolve(&resource, &draft.role)?;
        if !resolved.allow_permanent_access && draft.options.expiration.is_none() {
            return Err(AppealError::ExpirationDateRequired);
        }

        let now = self.clock.now();
        let mut approvals = Vec::with_capacity(resolved.steps.len());
        for (index, step) in resolved.steps.iter().enumerate() {
            let approvers = self
                .approver_resolver
                .resolve(&draft.appellant, &resource, &step.approvers)
                .await?;
            approvals.push(Approval {
                name: step.name.clone(),
                index,
                status: ApprovalStatus::Pending,
                policy_id: resolved.policy_id.clone(),
                policy_version: resolved.policy_version,
                approvers,
                actor: None,
                updated_at: now,
            });
        }

        let mut appeal = Appeal {
            id: AppealId::new(),
            appellant: draft.appellant,
            resource_id: draft.resource_id,
            resource,
            role: draft.role,
            status: AppealStatus::Pending,
            policy_id: resolved.policy_id.clone(),
            policy_version: resolved.policy_version,
            options: draft.options,
            labels: draft.labels,
            approvals,
            created_at: now,
            updated_at: now,
            revoked_at: None,
            revoked_by: None,
            revoke_reason: None,
        };

        let policy = Policy::new(resolved.policy_id, resolved.policy_version, resolved.steps);
        evaluator::advance(&mut appeal, &policy, self.clock.as_ref())?;
        debug!(appeal = %appeal.id, policy = %appeal.policy_id, "draft admitted");
        Ok(appeal)
    }

    // -- action helpers --

    /// Load the policy pinned into the appeal at intake.
    async fn pinned_policy(&self, appeal: &Appeal) -> AppealResult<Policy> {
        self.stores
            .policies
            .get(&appeal.policy_id, appeal.policy_version)
            .await?
            .ok_or_else(|| {
                AppealError::Policy(PolicyError::PolicyVersionNotFound {
                    id: appeal.policy_id.clone(),
                    version: appeal.policy_version,
                })
            })
    }

    /// Walk the trail to the named step, asserting every earlier step has
    /// settled successfully and the named step is actionable by the actor.
    fn locate_step(&self, appeal: &Appeal, action: &ApprovalAction) -> AppealResult<usize> {
        for (i, approval) in appeal.approvals.iter().enumerate() {
            if approval.name != action.approval_name {
                match approval.status {
                    ApprovalStatus::Approved | ApprovalStatus::Skipped => continue,
                    ApprovalStatus::Pending | ApprovalStatus::Blocked => {
                        return Err(AppealError::ApprovalDependencyIsPending)
                    },
                    ApprovalStatus::Rejected => return Err(AppealError::AppealStatusRejected),
                }
            }

            match approval.status {
                ApprovalStatus::Pending => {},
                ApprovalStatus::Approved => return Err(AppealError::ApprovalStatusApproved),
                ApprovalStatus::Rejected => return Err(AppealError::ApprovalStatusRejected),
                ApprovalStatus::Skipped => return Err(AppealError::ApprovalStatusSkipped),
                // A blocked step has an empty approver set, so no actor can
                // ever be eligible for it.
                ApprovalStatus::Blocked => return Err(AppealError::ActionForbidden),
            }
            if !approval.approvers.contains(&action.actor) {
                return Err(AppealError::ActionForbidden);
            }
            return Ok(i);
        }
        Err(AppealError::ApprovalNameNotFound(
            action.approval_name.clone(),
        ))
    }

    /// Best-effort notification delivery; failures are logged, never
    /// surfaced.
    async fn dispatch(&self, notifications: Vec<Notification>) {
        if notifications.is_empty() {
            return;
        }
        if let Err(e) = self.notifier.notify(notifications).await {
            tracing::error!(error = %e, "failed to deliver notifications");
        }
    }
}

impl std::fmt::Debug for AppealService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppealService")
            .field("stores", &self.stores)
            .field("orchestrator", &self.orchestrator)
            .finish_non_exhaustive()
    }
}

/// Map a non-pending appeal status to its state-violation error.
fn ensure_pending(status: AppealStatus) -> AppealResult<()> {
    match status {
        AppealStatus::Pending => Ok(()),
        AppealStatus::Canceled => Err(AppealError::AppealStatusCanceled),
        AppealStatus::Active => Err(AppealError::AppealStatusApproved),
        AppealStatus::Rejected => Err(AppealError::AppealStatusRejected),
        AppealStatus::Terminated => Err(AppealError::AppealStatusTerminated),
    }
}

/// Map a non-active appeal status to its state-violation error.
fn ensure_active(status: AppealStatus) -> AppealResult<()> {
    match status {
        AppealStatus::Active => Ok(()),
        AppealStatus::Pending => Err(AppealError::AppealStatusPending),
        AppealStatus::Canceled => Err(AppealError::AppealStatusCanceled),
        AppealStatus::Rejected => Err(AppealError::AppealStatusRejected),
        AppealStatus::Terminated => Err(AppealError::AppealStatusTerminated),
    }
}
