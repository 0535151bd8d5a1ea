//! Policy resolution for intake.
//!
//! Given the full sets of provider configs and policies (loaded once per
//! intake batch), the resolver answers: for this resource and role, which
//! policy governs the appeal, and may the grant be permanent?

use std::collections::{HashMap, HashSet};

use guardian_core::{Policy, PolicyStep, ProviderConfig, Resource};

use crate::error::{PolicyError, PolicyResult};

/// The outcome of resolving a `(resource, role)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPolicy {
    /// The pinned policy id.
    pub policy_id: String,
    /// The pinned policy version.
    pub policy_version: u32,
    /// Steps in declaration order; indices define approval indices for the
    /// appeal's lifetime.
    pub steps: Vec<PolicyStep>,
    /// Whether the provider allows grants without an expiration.
    pub allow_permanent_access: bool,
}

#[derive(Debug)]
struct ResourceEntry {
    role_ids: Vec<String>,
    policy_id: String,
    policy_version: u32,
}

#[derive(Debug)]
struct ProviderEntry {
    allow_permanent_access: bool,
    resources: HashMap<String, ResourceEntry>,
}

/// Indexes provider configs by `(type, urn)` and policies by
/// `(id, version)` for constant-time resolution.
#[derive(Debug)]
pub struct PolicyResolver {
    provider_types: HashSet<String>,
    providers: HashMap<(String, String), ProviderEntry>,
    policy_ids: HashSet<String>,
    policies: HashMap<(String, u32), Policy>,
}

impl PolicyResolver {
    /// Build the indexes from the registered providers and policies.
    #[must_use]
    pub fn new(providers: &[ProviderConfig], policies: &[Policy]) -> Self {
        let mut provider_types = HashSet::new();
        let mut provider_map = HashMap::new();
        for provider in providers {
            provider_types.insert(provider.provider_type.clone());
            let resources = provider
                .resources
                .iter()
                .map(|rc| {
                    (
                        rc.resource_type.clone(),
                        ResourceEntry {
                            role_ids: rc.roles.iter().map(|r| r.id.clone()).collect(),
                            policy_id: rc.policy.id.clone(),
                            policy_version: rc.policy.version,
                        },
                    )
                })
                .collect();
            provider_map.insert(
                (provider.provider_type.clone(), provider.urn.clone()),
                ProviderEntry {
                    allow_permanent_access: provider.appeal.allow_permanent_access,
                    resources,
                },
            );
        }

        let mut policy_ids = HashSet::new();
        let mut policy_map = HashMap::new();
        for policy in policies {
            policy_ids.insert(policy.id.clone());
            policy_map.insert((policy.id.clone(), policy.version), policy.clone());
        }

        Self {
            provider_types,
            providers: provider_map,
            policy_ids,
            policies: policy_map,
        }
    }

    /// Resolve the policy governing an appeal for `resource` and `role`.
    ///
    /// # Errors
    ///
    /// Fails when the provider type, provider URN, resource type, or role
    /// is unknown, or when the bound policy id/version is absent from the
    /// policy set.
    pub fn resolve(&self, resource: &Resource, role: &str) -> PolicyResult<ResolvedPolicy> {
        if !self.provider_types.contains(&resource.provider_type) {
            return Err(PolicyError::ProviderTypeNotFound {
                provider_type: resource.provider_type.clone(),
            });
        }
        let provider = self
            .providers
            .get(&(resource.provider_type.clone(), resource.provider_urn.clone()))
            .ok_or_else(|| PolicyError::ProviderUrnNotFound {
                provider_type: resource.provider_type.clone(),
                urn: resource.provider_urn.clone(),
            })?;

        let entry = provider
            .resources
            .get(&resource.resource_type)
            .ok_or_else(|| PolicyError::ResourceTypeNotFound {
                resource_type: resource.resource_type.clone(),
            })?;

        if !entry.role_ids.iter().any(|r| r == role) {
            return Err(PolicyError::InvalidRole {
                role: role.to_string(),
            });
        }

        if !self.policy_ids.contains(&entry.policy_id) {
            return Err(PolicyError::PolicyIdNotFound {
                id: entry.policy_id.clone(),
            });
        }
        let policy = self
            .policies
            .get(&(entry.policy_id.clone(), entry.policy_version))
            .ok_or_else(|| PolicyError::PolicyVersionNotFound {
                id: entry.policy_id.clone(),
                version: entry.policy_version,
            })?;

        Ok(ResolvedPolicy {
            policy_id: policy.id.clone(),
            policy_version: policy.version,
            steps: policy.steps.clone(),
            allow_permanent_access: provider.allow_permanent_access,
        })
    }
}
