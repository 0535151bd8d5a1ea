//! Entity fixtures for the common test topology.
//!
//! One Metabase-style provider (`metabase/my-mb`) exposing a `database`
//! resource type with `read`/`write` roles, bound to a two-step policy:
//! the appellant's manager (via the identity service), then the resource
//! owner.

use serde_json::json;

use guardian_core::{
    AppealConfig, AppealDraft, AppealOptions, Email, Policy, PolicyRef, PolicyStep,
    ProviderConfig, Resource, ResourceConfig, ResourceId, RoleConfig, Timestamp,
};

/// The owner recorded on [`test_resource`].
pub const OWNER_EMAIL: &str = "alice@x";

/// The default appellant.
#[must_use]
pub fn test_appellant() -> Email {
    Email::parse("u@x").expect("fixture email")
}

/// A database resource on `metabase/my-mb`, owned by [`OWNER_EMAIL`].
#[must_use]
pub fn test_resource(id: ResourceId) -> Resource {
    Resource::new(id, "metabase", "my-mb", "database", "db/1")
        .with_detail("owner", json!(OWNER_EMAIL))
        .with_detail("name", json!("orders"))
}

/// The two-step manager-then-owner policy, as `p1@1`.
#[must_use]
pub fn test_policy() -> Policy {
    Policy::new(
        "p1",
        1,
        vec![
            PolicyStep::new("manager", "$user_approvers"),
            PolicyStep::new("owner", "$resource.owner"),
        ],
    )
}

/// The `metabase/my-mb` provider registration binding `database` to `p1@1`.
///
/// `allow_permanent` controls whether drafts may omit an expiration.
#[must_use]
pub fn test_provider(allow_permanent: bool) -> ProviderConfig {
    ProviderConfig {
        provider_type: "metabase".to_string(),
        urn: "my-mb".to_string(),
        appeal: AppealConfig {
            allow_permanent_access: allow_permanent,
        },
        resources: vec![ResourceConfig {
            resource_type: "database".to_string(),
            roles: vec![RoleConfig::new("read"), RoleConfig::new("write")],
            policy: PolicyRef::new("p1", 1),
        }],
        credentials: None,
    }
}

/// A draft from [`test_appellant`] for `read` on the given resource, with a
/// far-future expiration.
#[must_use]
pub fn test_draft(resource_id: ResourceId) -> AppealDraft {
    AppealDraft {
        appellant: test_appellant(),
        resource_id,
        role: "read".to_string(),
        options: AppealOptions {
            expiration: Some(Timestamp::from_datetime(
                chrono::DateTime::parse_from_rfc3339("2099-01-01T00:00:00Z")
                    .expect("fixture timestamp")
                    .with_timezone(&chrono::Utc),
            )),
        },
        labels: None,
    }
}
