//! Repository contracts consumed by the lifecycle engine.
//!
//! Every operation is transactional from the engine's point of view: a
//! failed call leaves the backend unchanged.

use async_trait::async_trait;

use guardian_core::{
    Appeal, AppealId, AppealStatus, Email, Policy, ProviderConfig, Resource, ResourceId,
};

use crate::error::StorageResult;

/// Filters for [`AppealRepository::find`]. Empty lists match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppealFilter {
    /// Match any of these statuses.
    pub statuses: Vec<AppealStatus>,
    /// Match any of these appellants.
    pub appellants: Vec<Email>,
    /// Match any of these resources.
    pub resource_ids: Vec<ResourceId>,
    /// Match any of these roles.
    pub roles: Vec<String>,
}

impl AppealFilter {
    /// An empty filter matching every appeal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to the given statuses.
    #[must_use]
    pub fn with_statuses(mut self, statuses: Vec<AppealStatus>) -> Self {
        self.statuses = statuses;
        self
    }

    /// Restrict to the given appellants.
    #[must_use]
    pub fn with_appellants(mut self, appellants: Vec<Email>) -> Self {
        self.appellants = appellants;
        self
    }

    /// Restrict to the given resources.
    #[must_use]
    pub fn with_resource_ids(mut self, resource_ids: Vec<ResourceId>) -> Self {
        self.resource_ids = resource_ids;
        self
    }

    /// Restrict to the given roles.
    #[must_use]
    pub fn with_roles(mut self, roles: Vec<String>) -> Self {
        self.roles = roles;
        self
    }

    /// Whether an appeal satisfies every populated restriction.
    #[must_use]
    pub fn matches(&self, appeal: &Appeal) -> bool {
        (self.statuses.is_empty() || self.statuses.contains(&appeal.status))
            && (self.appellants.is_empty() || self.appellants.contains(&appeal.appellant))
            && (self.resource_ids.is_empty() || self.resource_ids.contains(&appeal.resource_id))
            && (self.roles.is_empty() || self.roles.iter().any(|r| *r == appeal.role))
    }
}

/// Persistent store of appeals and their approval trails.
#[async_trait]
pub trait AppealRepository: Send + Sync {
    /// Fetch one appeal by id.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend fails; a missing appeal is
    /// `Ok(None)`.
    async fn get_by_id(&self, id: AppealId) -> StorageResult<Option<Appeal>>;

    /// Fetch all appeals matching the filter.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend fails.
    async fn find(&self, filter: &AppealFilter) -> StorageResult<Vec<Appeal>>;

    /// Insert a batch of appeals atomically (all-or-nothing).
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Conflict`](crate::StorageError::Conflict)
    /// when a pending appeal already exists for the same
    /// `(appellant, resource, role)` tuple, leaving the batch unwritten.
    async fn bulk_insert(&self, appeals: &[Appeal]) -> StorageResult<()>;

    /// Replace a stored appeal, cascading to its approvals.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`](crate::StorageError::NotFound)
    /// when the appeal does not exist.
    async fn update(&self, appeal: &Appeal) -> StorageResult<()>;
}

/// Store of resources available for appeal.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Fetch one resource by id.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend fails.
    async fn get(&self, id: ResourceId) -> StorageResult<Option<Resource>>;

    /// Fetch every resource whose id is in `ids`, in one query.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend fails. Unknown ids are simply
    /// absent from the result; the caller decides whether that is fatal.
    async fn find_by_ids(&self, ids: &[ResourceId]) -> StorageResult<Vec<Resource>>;

    /// Register or replace a resource.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend fails.
    async fn insert(&self, resource: Resource) -> StorageResult<()>;
}

/// Store of approval policies, keyed by `(id, version)`.
#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// Every stored policy version.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend fails.
    async fn list(&self) -> StorageResult<Vec<Policy>>;

    /// Fetch one policy version.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend fails.
    async fn get(&self, id: &str, version: u32) -> StorageResult<Option<Policy>>;

    /// Register or replace a policy version.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend fails.
    async fn insert(&self, policy: Policy) -> StorageResult<()>;
}

/// Store of provider registrations, keyed by `(type, urn)`.
#[async_trait]
pub trait ProviderStore: Send + Sync {
    /// Every registered provider.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend fails.
    async fn list(&self) -> StorageResult<Vec<ProviderConfig>>;

    /// Fetch one provider registration.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend fails.
    async fn get(&self, provider_type: &str, urn: &str) -> StorageResult<Option<ProviderConfig>>;

    /// Register or replace a provider.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend fails.
    async fn insert(&self, provider: ProviderConfig) -> StorageResult<()>;
}
