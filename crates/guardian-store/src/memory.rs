//! In-memory storage backend.
//!
//! `RwLock`-guarded maps with the same semantics as the durable backend.
//! The duplicate constraint is enforced under the write lock, so two racing
//! `bulk_insert` calls cannot both land a pending appeal for the same
//! `(appellant, resource, role)` tuple.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use guardian_core::{
    Appeal, AppealId, AppealStatus, Policy, ProviderConfig, Resource, ResourceId,
};

use crate::error::{StorageError, StorageResult};
use crate::repository::{
    AppealFilter, AppealRepository, PolicyStore, ProviderStore, ResourceStore,
};

/// In-memory [`AppealRepository`].
#[derive(Debug, Default)]
pub struct MemoryAppealRepository {
    appeals: RwLock<HashMap<AppealId, Appeal>>,
}

impl MemoryAppealRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored appeals.
    pub async fn count(&self) -> usize {
        self.appeals.read().await.len()
    }
}

#[async_trait]
impl AppealRepository for MemoryAppealRepository {
    async fn get_by_id(&self, id: AppealId) -> StorageResult<Option<Appeal>> {
        Ok(self.appeals.read().await.get(&id).cloned())
    }

    async fn find(&self, filter: &AppealFilter) -> StorageResult<Vec<Appeal>> {
        let appeals = self.appeals.read().await;
        let mut matched: Vec<Appeal> = appeals
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        matched.sort_by_key(|a| a.created_at);
        Ok(matched)
    }

    async fn bulk_insert(&self, batch: &[Appeal]) -> StorageResult<()> {
        let mut appeals = self.appeals.write().await;

        for (i, appeal) in batch.iter().enumerate() {
            if appeals.contains_key(&appeal.id) {
                return Err(StorageError::Conflict(format!(
                    "appeal already exists: {}",
                    appeal.id
                )));
            }
            if appeal.status == AppealStatus::Pending {
                let duplicate = appeals.values().chain(batch[..i].iter()).any(|other| {
                    other.status == AppealStatus::Pending
                        && other.appellant == appeal.appellant
                        && other.resource_id == appeal.resource_id
                        && other.role == appeal.role
                });
                if duplicate {
                    return Err(StorageError::Conflict(format!(
                        "pending appeal already exists for {} on {} as {}",
                        appeal.appellant, appeal.resource_id, appeal.role
                    )));
                }
            }
        }

        for appeal in batch {
            appeals.insert(appeal.id, appeal.clone());
        }
        Ok(())
    }

    async fn update(&self, appeal: &Appeal) -> StorageResult<()> {
        let mut appeals = self.appeals.write().await;
        if !appeals.contains_key(&appeal.id) {
            return Err(StorageError::NotFound(appeal.id.to_string()));
        }
        appeals.insert(appeal.id, appeal.clone());
        Ok(())
    }
}

/// In-memory [`ResourceStore`].
#[derive(Debug, Default)]
pub struct MemoryResourceStore {
    resources: RwLock<HashMap<ResourceId, Resource>>,
}

impl MemoryResourceStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResourceStore for MemoryResourceStore {
    async fn get(&self, id: ResourceId) -> StorageResult<Option<Resource>> {
        Ok(self.resources.read().await.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[ResourceId]) -> StorageResult<Vec<Resource>> {
        let resources = self.resources.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| resources.get(id).cloned())
            .collect())
    }

    async fn insert(&self, resource: Resource) -> StorageResult<()> {
        self.resources.write().await.insert(resource.id, resource);
        Ok(())
    }
}

/// In-memory [`PolicyStore`].
#[derive(Debug, Default)]
pub struct MemoryPolicyStore {
    policies: RwLock<HashMap<(String, u32), Policy>>,
}

impl MemoryPolicyStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PolicyStore for MemoryPolicyStore {
    async fn list(&self) -> StorageResult<Vec<Policy>> {
        Ok(self.policies.read().await.values().cloned().collect())
    }

    async fn get(&self, id: &str, version: u32) -> StorageResult<Option<Policy>> {
        Ok(self
            .policies
            .read()
            .await
            .get(&(id.to_string(), version))
            .cloned())
    }

    async fn insert(&self, policy: Policy) -> StorageResult<()> {
        self.policies
            .write()
            .await
            .insert((policy.id.clone(), policy.version), policy);
        Ok(())
    }
}

/// In-memory [`ProviderStore`].
#[derive(Debug, Default)]
pub struct MemoryProviderStore {
    providers: RwLock<HashMap<(String, String), ProviderConfig>>,
}

impl MemoryProviderStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProviderStore for MemoryProviderStore {
    async fn list(&self) -> StorageResult<Vec<ProviderConfig>> {
        Ok(self.providers.read().await.values().cloned().collect())
    }

    async fn get(&self, provider_type: &str, urn: &str) -> StorageResult<Option<ProviderConfig>> {
        Ok(self
            .providers
            .read()
            .await
            .get(&(provider_type.to_string(), urn.to_string()))
            .cloned())
    }

    async fn insert(&self, provider: ProviderConfig) -> StorageResult<()> {
        self.providers
            .write()
            .await
            .insert((provider.provider_type.clone(), provider.urn.clone()), provider);
        Ok(())
    }
}
