//! Provider registrations and their per-resource appeal configuration.

use serde::{Deserialize, Serialize};

/// Configuration for one registered provider instance.
///
/// A provider instance is identified by `(provider_type, urn)`; the same
/// provider type (say, `"metabase"`) may be registered multiple times under
/// different URNs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider type (e.g. `"metabase"`, `"gcloud_iam"`, `"bigquery"`).
    pub provider_type: String,
    /// URN of this provider instance.
    pub urn: String,
    /// Appeal-intake rules for this provider.
    #[serde(default)]
    pub appeal: AppealConfig,
    /// The resource types this provider declares, with their allowed roles
    /// and bound policy.
    pub resources: Vec<ResourceConfig>,
    /// Opaque, encrypted credentials blob consumed only by the adapter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<serde_json::Value>,
}

impl ProviderConfig {
    /// Find the declared config for a resource type, if any.
    #[must_use]
    pub fn resource_config(&self, resource_type: &str) -> Option<&ResourceConfig> {
        self.resources
            .iter()
            .find(|r| r.resource_type == resource_type)
    }
}

/// Appeal-intake rules declared by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppealConfig {
    /// When false, every appeal against this provider must carry an
    /// expiration; permanent access is not grantable.
    #[serde(default)]
    pub allow_permanent_access: bool,
}

/// Per-resource-type configuration inside a [`ProviderConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// The resource type this block applies to.
    pub resource_type: String,
    /// Roles that may be appealed for on this resource type.
    pub roles: Vec<RoleConfig>,
    /// The approval policy bound to this resource type.
    pub policy: PolicyRef,
}

impl ResourceConfig {
    /// Check whether a role id is among the allowed roles.
    #[must_use]
    pub fn allows_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.id == role)
    }
}

/// A role a provider understands, offered for appeal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleConfig {
    /// Role identifier passed through to the provider (e.g. `"read"`).
    pub id: String,
    /// Human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl RoleConfig {
    /// Create a role with just an id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }
}

/// Reference to a policy pinned by `(id, version)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRef {
    /// Policy identifier.
    pub id: String,
    /// Policy version.
    pub version: u32,
}

impl PolicyRef {
    /// Create a policy reference.
    #[must_use]
    pub fn new(id: impl Into<String>, version: u32) -> Self {
        Self {
            id: id.into(),
            version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> ProviderConfig {
        ProviderConfig {
            provider_type: "metabase".to_string(),
            urn: "my-mb".to_string(),
            appeal: AppealConfig::default(),
            resources: vec![ResourceConfig {
                resource_type: "database".to_string(),
                roles: vec![RoleConfig::new("read"), RoleConfig::new("write")],
                policy: PolicyRef::new("p1", 1),
            }],
            credentials: None,
        }
    }

    #[test]
    fn test_resource_config_lookup() {
        let p = provider();
        assert!(p.resource_config("database").is_some());
        assert!(p.resource_config("dashboard").is_none());
    }

    #[test]
    fn test_role_membership() {
        let p = provider();
        let rc = p.resource_config("database").unwrap();
        assert!(rc.allows_role("read"));
        assert!(!rc.allows_role("admin"));
    }

    #[test]
    fn test_permanent_access_defaults_off() {
        assert!(!AppealConfig::default().allow_permanent_access);
    }
}
