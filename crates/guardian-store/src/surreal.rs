//! `SurrealDB`-backed repository implementations.
//!
//! Every record is stored under a `data` field (`CREATE … SET data = $x`)
//! so domain ids never fight with the engine's record ids, and reads use
//! `SELECT VALUE data`. Record ids are derived from the domain keys:
//! appeals and resources by uuid, policies by `id@version`, providers by
//! `type:urn`.

use std::sync::Arc;

use async_trait::async_trait;

use guardian_core::{
    Appeal, AppealId, AppealStatus, Policy, ProviderConfig, Resource, ResourceId,
};

use crate::db::Database;
use crate::error::{StorageError, StorageResult};
use crate::repository::{
    AppealFilter, AppealRepository, PolicyStore, ProviderStore, ResourceStore,
};

/// Sentinel thrown inside the intake transaction on a duplicate tuple.
const DUPLICATE_SENTINEL: &str = "duplicate pending appeal";

/// Sentinel thrown when an update targets a missing appeal.
const NOT_FOUND_SENTINEL: &str = "appeal not found";

fn internal(e: surrealdb::Error) -> StorageError {
    StorageError::Internal(e.to_string())
}

/// Durable [`AppealRepository`] on an embedded [`Database`].
#[derive(Debug, Clone)]
pub struct SurrealAppealRepository {
    db: Arc<Database>,
}

impl SurrealAppealRepository {
    /// Create a repository on the given database.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AppealRepository for SurrealAppealRepository {
    async fn get_by_id(&self, id: AppealId) -> StorageResult<Option<Appeal>> {
        let mut response = self
            .db
            .client()
            .query("SELECT VALUE data FROM type::thing('appeal', $id)")
            .bind(("id", id.0.to_string()))
            .await
            .map_err(internal)?;
        let mut appeals: Vec<Appeal> = response.take(0).map_err(internal)?;
        Ok(appeals.pop())
    }

    async fn find(&self, filter: &AppealFilter) -> StorageResult<Vec<Appeal>> {
        let mut clauses = Vec::new();
        if !filter.statuses.is_empty() {
            clauses.push("data.status IN $statuses");
        }
        if !filter.appellants.is_empty() {
            clauses.push("data.appellant IN $appellants");
        }
        if !filter.resource_ids.is_empty() {
            clauses.push("data.resource_id IN $resource_ids");
        }
        if !filter.roles.is_empty() {
            clauses.push("data.role IN $roles");
        }
        let mut sql = "SELECT VALUE data FROM appeal".to_string();
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        let mut response = self
            .db
            .client()
            .query(sql)
            .bind(("statuses", filter.statuses.clone()))
            .bind(("appellants", filter.appellants.clone()))
            .bind(("resource_ids", filter.resource_ids.clone()))
            .bind(("roles", filter.roles.clone()))
            .await
            .map_err(internal)?;
        let mut appeals: Vec<Appeal> = response.take(0).map_err(internal)?;
        appeals.sort_by_key(|a| a.created_at);
        Ok(appeals)
    }

    async fn bulk_insert(&self, batch: &[Appeal]) -> StorageResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        // One transaction for the whole batch: each pending appeal re-checks
        // the duplicate tuple, and a THROW rolls everything back.
        let mut sql = "BEGIN TRANSACTION;".to_string();
        for (i, appeal) in batch.iter().enumerate() {
            if appeal.status == AppealStatus::Pending {
                sql.push_str(&format!(
                    "IF (SELECT VALUE id FROM appeal WHERE data.status == 'pending' \
                     AND data.appellant == $a{i}.appellant \
                     AND data.resource_id == $a{i}.resource_id \
                     AND data.role == $a{i}.role) != [] \
                     {{ THROW '{DUPLICATE_SENTINEL}' }};"
                ));
            }
            sql.push_str(&format!(
                "CREATE type::thing('appeal', $id{i}) SET data = $a{i};"
            ));
        }
        sql.push_str("COMMIT TRANSACTION;");

        let mut query = self.db.client().query(sql);
        for (i, appeal) in batch.iter().enumerate() {
            query = query
                .bind((format!("a{i}"), appeal.clone()))
                .bind((format!("id{i}"), appeal.id.0.to_string()));
        }

        let response = query.await.map_err(internal)?;
        match response.check() {
            Ok(_) => Ok(()),
            Err(e) if e.to_string().contains(DUPLICATE_SENTINEL) => {
                Err(StorageError::Conflict(DUPLICATE_SENTINEL.to_string()))
            },
            Err(e) => Err(internal(e)),
        }
    }

    async fn update(&self, appeal: &Appeal) -> StorageResult<()> {
        let sql = format!(
            "BEGIN TRANSACTION; \
             IF (SELECT VALUE id FROM type::thing('appeal', $id)) == [] \
             {{ THROW '{NOT_FOUND_SENTINEL}' }}; \
             UPDATE type::thing('appeal', $id) SET data = $appeal; \
             COMMIT TRANSACTION;"
        );
        let response = self
            .db
            .client()
            .query(sql)
            .bind(("id", appeal.id.0.to_string()))
            .bind(("appeal", appeal.clone()))
            .await
            .map_err(internal)?;
        match response.check() {
            Ok(_) => Ok(()),
            Err(e) if e.to_string().contains(NOT_FOUND_SENTINEL) => {
                Err(StorageError::NotFound(appeal.id.to_string()))
            },
            Err(e) => Err(internal(e)),
        }
    }
}

/// Durable [`ResourceStore`] on an embedded [`Database`].
#[derive(Debug, Clone)]
pub struct SurrealResourceStore {
    db: Arc<Database>,
}

impl SurrealResourceStore {
    /// Create a store on the given database.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ResourceStore for SurrealResourceStore {
    async fn get(&self, id: ResourceId) -> StorageResult<Option<Resource>> {
        let mut response = self
            .db
            .client()
            .query("SELECT VALUE data FROM type::thing('resource', $id)")
            .bind(("id", id.0.to_string()))
            .await
            .map_err(internal)?;
        let mut resources: Vec<Resource> = response.take(0).map_err(internal)?;
        Ok(resources.pop())
    }

    async fn find_by_ids(&self, ids: &[ResourceId]) -> StorageResult<Vec<Resource>> {
        let mut response = self
            .db
            .client()
            .query("SELECT VALUE data FROM resource WHERE data.id IN $ids")
            .bind(("ids", ids.to_vec()))
            .await
            .map_err(internal)?;
        response.take(0).map_err(internal)
    }

    async fn insert(&self, resource: Resource) -> StorageResult<()> {
        let id = resource.id.0.to_string();
        self.db
            .client()
            .query("UPSERT type::thing('resource', $id) SET data = $resource")
            .bind(("id", id))
            .bind(("resource", resource))
            .await
            .map_err(internal)?
            .check()
            .map_err(internal)?;
        Ok(())
    }
}

/// Durable [`PolicyStore`] on an embedded [`Database`].
#[derive(Debug, Clone)]
pub struct SurrealPolicyStore {
    db: Arc<Database>,
}

impl SurrealPolicyStore {
    /// Create a store on the given database.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn record_key(id: &str, version: u32) -> String {
        format!("{id}@{version}")
    }
}

#[async_trait]
impl PolicyStore for SurrealPolicyStore {
    async fn list(&self) -> StorageResult<Vec<Policy>> {
        let mut response = self
            .db
            .client()
            .query("SELECT VALUE data FROM policy")
            .await
            .map_err(internal)?;
        response.take(0).map_err(internal)
    }

    async fn get(&self, id: &str, version: u32) -> StorageResult<Option<Policy>> {
        let mut response = self
            .db
            .client()
            .query("SELECT VALUE data FROM type::thing('policy', $key)")
            .bind(("key", Self::record_key(id, version)))
            .await
            .map_err(internal)?;
        let mut policies: Vec<Policy> = response.take(0).map_err(internal)?;
        Ok(policies.pop())
    }

    async fn insert(&self, policy: Policy) -> StorageResult<()> {
        let key = Self::record_key(&policy.id, policy.version);
        self.db
            .client()
            .query("UPSERT type::thing('policy', $key) SET data = $policy")
            .bind(("key", key))
            .bind(("policy", policy))
            .await
            .map_err(internal)?
            .check()
            .map_err(internal)?;
        Ok(())
    }
}

/// Durable [`ProviderStore`] on an embedded [`Database`].
#[derive(Debug, Clone)]
pub struct SurrealProviderStore {
    db: Arc<Database>,
}

impl SurrealProviderStore {
    /// Create a store on the given database.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn record_key(provider_type: &str, urn: &str) -> String {
        format!("{provider_type}:{urn}")
    }
}

#[async_trait]
impl ProviderStore for SurrealProviderStore {
    async fn list(&self) -> StorageResult<Vec<ProviderConfig>> {
        let mut response = self
            .db
            .client()
            .query("SELECT VALUE data FROM provider")
            .await
            .map_err(internal)?;
        response.take(0).map_err(internal)
    }

    async fn get(&self, provider_type: &str, urn: &str) -> StorageResult<Option<ProviderConfig>> {
        let mut response = self
            .db
            .client()
            .query("SELECT VALUE data FROM type::thing('provider', $key)")
            .bind(("key", Self::record_key(provider_type, urn)))
            .await
            .map_err(internal)?;
        let mut providers: Vec<ProviderConfig> = response.take(0).map_err(internal)?;
        Ok(providers.pop())
    }

    async fn insert(&self, provider: ProviderConfig) -> StorageResult<()> {
        let key = Self::record_key(&provider.provider_type, &provider.urn);
        self.db
            .client()
            .query("UPSERT type::thing('provider', $key) SET data = $provider")
            .bind(("key", key))
            .bind(("provider", provider))
            .await
            .map_err(internal)?
            .check()
            .map_err(internal)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guardian_core::{AppealOptions, Approval, ApprovalStatus, Email, Timestamp};

    async fn database() -> Arc<Database> {
        let db = Database::connect_memory().await.expect("connect");
        db.migrate().await.expect("migrate");
        Arc::new(db)
    }

    fn appeal(appellant: &str, resource_id: ResourceId, role: &str) -> Appeal {
        Appeal {
            id: AppealId::new(),
            appellant: Email::parse(appellant).unwrap(),
            resource_id,
            resource: Resource::new(resource_id, "metabase", "my-mb", "database", "db/1"),
            role: role.to_string(),
            status: AppealStatus::Pending,
            policy_id: "p1".to_string(),
            policy_version: 1,
            options: AppealOptions::default(),
            labels: None,
            approvals: vec![Approval {
                name: "manager".to_string(),
                index: 0,
                status: ApprovalStatus::Pending,
                policy_id: "p1".to_string(),
                policy_version: 1,
                approvers: vec![Email::parse("bob@x").unwrap()],
                actor: None,
                updated_at: Timestamp::now(),
            }],
            created_at: Timestamp::now(),
            updated_at: Timestamp::now(),
            revoked_at: None,
            revoked_by: None,
            revoke_reason: None,
        }
    }

    #[tokio::test]
    async fn test_appeal_roundtrip() {
        let repo = SurrealAppealRepository::new(database().await);
        let a = appeal("u@x", ResourceId::new(), "read");
        repo.bulk_insert(std::slice::from_ref(&a)).await.unwrap();

        let loaded = repo.get_by_id(a.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, a.id);
        assert_eq!(loaded.approvals.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_pending_rolls_back_batch() {
        let repo = SurrealAppealRepository::new(database().await);
        let resource_id = ResourceId::new();
        repo.bulk_insert(&[appeal("u@x", resource_id, "read")])
            .await
            .unwrap();

        let fresh = appeal("v@x", ResourceId::new(), "read");
        let dup = appeal("u@x", resource_id, "read");
        let err = repo.bulk_insert(&[fresh.clone(), dup]).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));
        // The non-duplicate entry must have been rolled back too.
        assert!(repo.get_by_id(fresh.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_appeal() {
        let repo = SurrealAppealRepository::new(database().await);
        let a = appeal("u@x", ResourceId::new(), "read");
        let err = repo.update(&a).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_find_by_status() {
        let repo = SurrealAppealRepository::new(database().await);
        repo.bulk_insert(&[appeal("u@x", ResourceId::new(), "read")])
            .await
            .unwrap();

        let pending = repo
            .find(&AppealFilter::new().with_statuses(vec![AppealStatus::Pending]))
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);

        let active = repo
            .find(&AppealFilter::new().with_statuses(vec![AppealStatus::Active]))
            .await
            .unwrap();
        assert!(active.is_empty());
    }

    #[tokio::test]
    async fn test_resource_store_roundtrip() {
        let store = SurrealResourceStore::new(database().await);
        let resource = Resource::new(ResourceId::new(), "metabase", "my-mb", "database", "db/1");
        store.insert(resource.clone()).await.unwrap();
        assert_eq!(store.get(resource.id).await.unwrap(), Some(resource));
    }

    #[tokio::test]
    async fn test_policy_store_roundtrip() {
        use guardian_core::{Policy, PolicyStep};
        let store = SurrealPolicyStore::new(database().await);
        store
            .insert(Policy::new("p1", 1, vec![PolicyStep::new("manager", "")]))
            .await
            .unwrap();
        assert!(store.get("p1", 1).await.unwrap().is_some());
        assert!(store.get("p1", 2).await.unwrap().is_none());
        assert_eq!(store.list().await.unwrap().len(), 1);
    }
}
