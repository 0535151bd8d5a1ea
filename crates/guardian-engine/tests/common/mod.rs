//! Shared test harness wiring the engine to in-memory stores and mocks.

use std::sync::Arc;

use guardian_core::{Appeal, AppealStatus, ApprovalStatus, Policy, ProviderConfig, ResourceId};
use guardian_engine::{AccessOrchestrator, AppealService, Stores};
use guardian_store::{
    MemoryAppealRepository, MemoryPolicyStore, MemoryProviderStore, MemoryResourceStore,
    PolicyStore, ProviderStore, ResourceStore,
};
use guardian_test::{
    test_policy, test_provider, test_resource, FrozenClock, MockIdentityService,
    MockProviderAdapter, RecordingNotifier,
};

/// A self-contained engine with one seeded resource, provider, and policy.
#[allow(dead_code)]
pub struct EngineHarness {
    pub service: Arc<AppealService>,
    pub appeals: Arc<MemoryAppealRepository>,
    pub notifier: Arc<RecordingNotifier>,
    pub adapter: Arc<MockProviderAdapter>,
    pub identity: Arc<MockIdentityService>,
    pub clock: Arc<FrozenClock>,
    pub resource_id: ResourceId,
}

/// Default topology: `metabase/my-mb`, the two-step `p1@1` policy, and the
/// identity service answering `u@x -> [bob@x]`.
#[allow(dead_code)]
pub async fn harness() -> EngineHarness {
    harness_with(test_provider(false), test_policy()).await
}

/// Build a harness with a custom provider registration and policy.
pub async fn harness_with(provider: ProviderConfig, policy: Policy) -> EngineHarness {
    let appeals = Arc::new(MemoryAppealRepository::new());
    let resources = Arc::new(MemoryResourceStore::new());
    let providers = Arc::new(MemoryProviderStore::new());
    let policies = Arc::new(MemoryPolicyStore::new());

    let resource_id = ResourceId::new();
    resources
        .insert(test_resource(resource_id))
        .await
        .expect("seed resource");
    providers.insert(provider).await.expect("seed provider");
    policies.insert(policy).await.expect("seed policy");

    let identity = Arc::new(MockIdentityService::new().with_approvers("u@x", vec!["bob@x"]));
    let notifier = Arc::new(RecordingNotifier::new());
    let adapter = Arc::new(MockProviderAdapter::new());
    let clock = Arc::new(FrozenClock::from_now());

    let orchestrator =
        AccessOrchestrator::new(providers.clone()).with_adapter("metabase", adapter.clone());

    let service = Arc::new(AppealService::new(
        Stores {
            appeals: appeals.clone(),
            resources: resources.clone(),
            providers: providers.clone(),
            policies: policies.clone(),
        },
        identity.clone(),
        notifier.clone(),
        orchestrator,
        clock.clone(),
    ));

    EngineHarness {
        service,
        appeals,
        notifier,
        adapter,
        identity,
        clock,
        resource_id,
    }
}

/// Assert the structural invariants that must hold after every operation.
#[allow(dead_code)]
pub fn assert_invariants(appeal: &Appeal) {
    for (i, approval) in appeal.approvals.iter().enumerate() {
        assert_eq!(approval.index, i, "approval indices follow list order");
        assert_eq!(approval.policy_id, appeal.policy_id);
        assert_eq!(approval.policy_version, appeal.policy_version);
    }

    // A pending appeal always has a step someone could still act on, and
    // never a settled final step.
    if appeal.status == AppealStatus::Pending {
        assert!(
            appeal
                .approvals
                .iter()
                .any(|a| matches!(a.status, ApprovalStatus::Pending | ApprovalStatus::Blocked)),
            "pending appeal with no open step: {appeal:?}"
        );
        assert_ne!(
            appeal.approvals.last().map(|a| a.status),
            Some(ApprovalStatus::Approved),
            "pending appeal with settled final step: {appeal:?}"
        );
    }

    // An active appeal is fully settled and ends approved.
    if appeal.status == AppealStatus::Active {
        assert!(
            appeal.is_fully_approved(),
            "active but not settled: {appeal:?}"
        );
    }

    // Step ordering: a rejected step is followed only by skipped steps;
    // otherwise open steps come after settled ones and everything past the
    // first open step is untouched pending.
    if let Some(rejected) = appeal
        .approvals
        .iter()
        .position(|a| a.status == ApprovalStatus::Rejected)
    {
        for approval in &appeal.approvals[rejected + 1..] {
            assert_eq!(
                approval.status,
                ApprovalStatus::Skipped,
                "rejected step followed by non-skipped step: {appeal:?}"
            );
        }
    } else if let Some(open) = appeal
        .approvals
        .iter()
        .position(|a| matches!(a.status, ApprovalStatus::Pending | ApprovalStatus::Blocked))
    {
        for approval in &appeal.approvals[..open] {
            assert!(
                matches!(
                    approval.status,
                    ApprovalStatus::Approved | ApprovalStatus::Skipped
                ),
                "open step before settled steps: {appeal:?}"
            );
        }
        for approval in &appeal.approvals[open + 1..] {
            assert_eq!(
                approval.status,
                ApprovalStatus::Pending,
                "step past the halt point was touched: {appeal:?}"
            );
        }
    }
}
