//! Resources brokered by Guardian.

use serde::{Deserialize, Serialize};

use crate::types::ResourceId;

/// A specific object inside a provider (a database, a collection, a project).
///
/// Beyond the identifying fields, a resource carries a free-form tree of
/// display details (`owner`, `labels.team`, and so on). The tree is flattened
/// into the serialized form, which is what the `$resource.<path>` approver
/// specifier walks: `$resource.owner` reaches `details["owner"]` as well as
/// any fixed field such as `$resource.urn`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Unique identifier.
    pub id: ResourceId,
    /// Provider type hosting this resource (e.g. `"metabase"`).
    pub provider_type: String,
    /// URN of the provider instance (e.g. `"my-mb"`).
    pub provider_urn: String,
    /// Resource type within the provider (e.g. `"database"`).
    pub resource_type: String,
    /// The provider-scoped resource URN.
    pub urn: String,
    /// Free-form display details, flattened into the resource tree.
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl Resource {
    /// Create a resource with empty details.
    #[must_use]
    pub fn new(
        id: ResourceId,
        provider_type: impl Into<String>,
        provider_urn: impl Into<String>,
        resource_type: impl Into<String>,
        urn: impl Into<String>,
    ) -> Self {
        Self {
            id,
            provider_type: provider_type.into(),
            provider_urn: provider_urn.into(),
            resource_type: resource_type.into(),
            urn: urn.into(),
            details: serde_json::Map::new(),
        }
    }

    /// Attach a detail entry (builder style).
    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_details_are_flattened() {
        let resource = Resource::new(ResourceId::new(), "metabase", "my-mb", "database", "db/1")
            .with_detail("owner", json!("alice@x"));

        let tree = serde_json::to_value(&resource).unwrap();
        assert_eq!(tree["owner"], json!("alice@x"));
        assert_eq!(tree["urn"], json!("db/1"));
    }

    #[test]
    fn test_unknown_fields_deserialize_into_details() {
        let tree = serde_json::json!({
            "id": ResourceId::new(),
            "provider_type": "metabase",
            "provider_urn": "my-mb",
            "resource_type": "database",
            "urn": "db/1",
            "owner": "alice@x",
        });
        let resource: Resource = serde_json::from_value(tree).unwrap();
        assert_eq!(resource.details["owner"], json!("alice@x"));
    }
}
