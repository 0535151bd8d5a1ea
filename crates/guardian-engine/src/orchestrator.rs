//! Provider access orchestration.
//!
//! The orchestrator is the single doorway between the lifecycle engine and
//! the provider adapters. It is called exactly once per state transition —
//! adapters are treated as best-effort idempotent, but the engine never
//! relies on that — and adapter errors propagate verbatim, with no retries
//! at this layer.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use guardian_core::{Appeal, ProviderConfig};
use guardian_store::ProviderStore;

/// Errors from provider access orchestration.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// No adapter is registered for the resource's provider type.
    #[error("no adapter registered for provider type: {0}")]
    AdapterNotFound(String),

    /// The provider registration is missing from the store.
    #[error("provider not registered: {provider_type}/{urn}")]
    ProviderNotFound {
        /// Provider type of the appeal's resource.
        provider_type: String,
        /// URN of the appeal's resource provider.
        urn: String,
    },

    /// Looking up the provider registration failed.
    #[error("provider lookup failed: {0}")]
    Lookup(String),

    /// The adapter itself failed; the message is adapter-normalized.
    #[error("{0}")]
    Adapter(String),
}

/// A provider-specific adapter that can grant and revoke access.
///
/// Each adapter owns its own authentication, resource-type dispatch, and
/// error normalization.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Grant the appeal's role on its resource.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Adapter`] with a normalized message when
    /// the provider call fails.
    async fn grant_access(
        &self,
        provider: &ProviderConfig,
        appeal: &Appeal,
    ) -> Result<(), ProviderError>;

    /// Revoke a previously granted role.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Adapter`] with a normalized message when
    /// the provider call fails.
    async fn revoke_access(
        &self,
        provider: &ProviderConfig,
        appeal: &Appeal,
    ) -> Result<(), ProviderError>;
}

/// Dispatches grant/revoke to the adapter for the appeal's provider type.
pub struct AccessOrchestrator {
    providers: Arc<dyn ProviderStore>,
    adapters: HashMap<String, Arc<dyn ProviderAdapter>>,
}

impl AccessOrchestrator {
    /// Create an orchestrator with no adapters registered.
    #[must_use]
    pub fn new(providers: Arc<dyn ProviderStore>) -> Self {
        Self {
            providers,
            adapters: HashMap::new(),
        }
    }

    /// Register an adapter for a provider type (builder style).
    #[must_use]
    pub fn with_adapter(
        mut self,
        provider_type: impl Into<String>,
        adapter: Arc<dyn ProviderAdapter>,
    ) -> Self {
        self.adapters.insert(provider_type.into(), adapter);
        self
    }

    /// Grant the appeal on its provider.
    ///
    /// # Errors
    ///
    /// Fails when no adapter or provider registration exists for the
    /// appeal's resource, or when the adapter call fails.
    pub async fn grant(&self, appeal: &Appeal) -> Result<(), ProviderError> {
        let (adapter, provider) = self.route(appeal).await?;
        adapter.grant_access(&provider, appeal).await
    }

    /// Revoke the appeal on its provider.
    ///
    /// # Errors
    ///
    /// Fails when no adapter or provider registration exists for the
    /// appeal's resource, or when the adapter call fails.
    pub async fn revoke(&self, appeal: &Appeal) -> Result<(), ProviderError> {
        let (adapter, provider) = self.route(appeal).await?;
        adapter.revoke_access(&provider, appeal).await
    }

    async fn route(
        &self,
        appeal: &Appeal,
    ) -> Result<(Arc<dyn ProviderAdapter>, ProviderConfig), ProviderError> {
        let provider_type = &appeal.resource.provider_type;
        let adapter = self
            .adapters
            .get(provider_type)
            .cloned()
            .ok_or_else(|| ProviderError::AdapterNotFound(provider_type.clone()))?;
        let provider = self
            .providers
            .get(provider_type, &appeal.resource.provider_urn)
            .await
            .map_err(|e| ProviderError::Lookup(e.to_string()))?
            .ok_or_else(|| ProviderError::ProviderNotFound {
                provider_type: provider_type.clone(),
                urn: appeal.resource.provider_urn.clone(),
            })?;
        Ok((adapter, provider))
    }
}

impl std::fmt::Debug for AccessOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessOrchestrator")
            .field("adapters", &self.adapters.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
