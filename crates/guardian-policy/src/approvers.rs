//! Approver specifier resolution.
//!
//! A policy step names its approvers through a small expression language
//! with two recognized prefixes:
//!
//! - `$resource.<path>` — look up `<path>` inside the resource entity,
//!   viewed as a nested key/value tree. The leaf must be a string or a list
//!   of strings.
//! - `$user_approvers` — ask the identity service for the appellant's
//!   registered approvers.
//!
//! An empty specifier resolves to an empty set, which is meaningful: such a
//! step has no human gatekeepers and can only settle through its
//! auto-resolution condition.

use async_trait::async_trait;
use std::sync::Arc;

use guardian_core::{Email, Resource};
use serde_json::Value;

use crate::error::{PolicyError, PolicyResult};
use crate::path;

/// Specifier prefix addressing the resource tree.
pub(crate) const RESOURCE_PREFIX: &str = "$resource.";

/// Specifier delegating to the identity service.
pub(crate) const USER_APPROVERS_KEY: &str = "$user_approvers";

/// A parsed approver specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApproverSpec {
    /// No approvers; the step relies on its condition.
    None,
    /// Look up a dotted path inside the resource tree.
    Resource(String),
    /// Delegate to the identity service.
    UserApprovers,
}

impl ApproverSpec {
    /// Parse a specifier string.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::ApproverKeyNotRecognized`] for anything that
    /// is not empty, `$user_approvers`, or `$resource.<path>`.
    pub fn parse(spec: &str) -> PolicyResult<Self> {
        if spec.is_empty() {
            return Ok(Self::None);
        }
        if spec == USER_APPROVERS_KEY {
            return Ok(Self::UserApprovers);
        }
        if let Some(rest) = spec.strip_prefix(RESOURCE_PREFIX) {
            if !rest.is_empty() {
                return Ok(Self::Resource(rest.to_string()));
            }
        }
        Err(PolicyError::ApproverKeyNotRecognized {
            key: spec.to_string(),
        })
    }
}

/// Error from the identity service.
#[derive(Debug, thiserror::Error)]
#[error("identity lookup failed: {0}")]
pub struct IdentityError(pub String);

/// External identity/IAM lookup.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// The registered approver emails for a user.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] when the lookup fails; the error is
    /// propagated verbatim to the caller of the engine operation.
    async fn get_user_approver_emails(&self, user: &Email) -> Result<Vec<String>, IdentityError>;
}

/// Resolves approver specifiers into validated email identities.
pub struct ApproverResolver {
    identity: Arc<dyn IdentityService>,
}

impl ApproverResolver {
    /// Create a resolver backed by the given identity service.
    #[must_use]
    pub fn new(identity: Arc<dyn IdentityService>) -> Self {
        Self { identity }
    }

    /// Resolve a step's approver specifier for an appellant and resource.
    ///
    /// # Errors
    ///
    /// Fails on unrecognized specifiers, missing or mistyped resource
    /// paths, identity-service failures, and invalid email addresses.
    pub async fn resolve(
        &self,
        appellant: &Email,
        resource: &Resource,
        spec: &str,
    ) -> PolicyResult<Vec<Email>> {
        match ApproverSpec::parse(spec)? {
            ApproverSpec::None => Ok(Vec::new()),
            ApproverSpec::Resource(resource_path) => {
                let tree = serde_json::to_value(resource)
                    .map_err(|e| PolicyError::Internal(e.to_string()))?;
                let leaf = path::lookup(&tree, &resource_path).ok_or_else(|| {
                    PolicyError::ApproverKeyNotFound {
                        path: resource_path.clone(),
                    }
                })?;
                validate_emails(leaf_to_strings(leaf, &resource_path)?)
            },
            ApproverSpec::UserApprovers => {
                let emails = self.identity.get_user_approver_emails(appellant).await?;
                validate_emails(emails)
            },
        }
    }
}

impl std::fmt::Debug for ApproverResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApproverResolver").finish_non_exhaustive()
    }
}

/// Extract the approver strings from a resource-tree leaf.
fn leaf_to_strings(leaf: &Value, resource_path: &str) -> PolicyResult<Vec<String>> {
    match leaf {
        Value::String(s) => Ok(vec![s.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                _ => Err(PolicyError::ApproverInvalidType {
                    path: resource_path.to_string(),
                }),
            })
            .collect(),
        _ => Err(PolicyError::ApproverInvalidType {
            path: resource_path.to_string(),
        }),
    }
}

/// Validate every candidate as an email address.
fn validate_emails(candidates: Vec<String>) -> PolicyResult<Vec<Email>> {
    candidates
        .into_iter()
        .map(|c| Email::parse(c).map_err(PolicyError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use guardian_core::ResourceId;
    use serde_json::json;

    struct StaticIdentity(Vec<String>);

    #[async_trait]
    impl IdentityService for StaticIdentity {
        async fn get_user_approver_emails(
            &self,
            _user: &Email,
        ) -> Result<Vec<String>, IdentityError> {
            Ok(self.0.clone())
        }
    }

    struct FailingIdentity;

    #[async_trait]
    impl IdentityService for FailingIdentity {
        async fn get_user_approver_emails(
            &self,
            _user: &Email,
        ) -> Result<Vec<String>, IdentityError> {
            Err(IdentityError("directory unavailable".to_string()))
        }
    }

    fn resource() -> Resource {
        Resource::new(ResourceId::new(), "metabase", "my-mb", "database", "db/1")
            .with_detail("owner", json!("alice@x"))
            .with_detail("stewards", json!(["a@x", "b@x"]))
            .with_detail("size_gb", json!(12))
    }

    fn appellant() -> Email {
        Email::parse("u@x").unwrap()
    }

    fn resolver(identity: impl IdentityService + 'static) -> ApproverResolver {
        ApproverResolver::new(Arc::new(identity))
    }

    #[test]
    fn test_spec_parsing() {
        assert_eq!(ApproverSpec::parse("").unwrap(), ApproverSpec::None);
        assert_eq!(
            ApproverSpec::parse("$user_approvers").unwrap(),
            ApproverSpec::UserApprovers
        );
        assert_eq!(
            ApproverSpec::parse("$resource.owner").unwrap(),
            ApproverSpec::Resource("owner".to_string())
        );
        assert!(matches!(
            ApproverSpec::parse("$manager"),
            Err(PolicyError::ApproverKeyNotRecognized { .. })
        ));
        assert!(matches!(
            ApproverSpec::parse("$resource."),
            Err(PolicyError::ApproverKeyNotRecognized { .. })
        ));
    }

    #[tokio::test]
    async fn test_resolve_single_string_leaf() {
        let approvers = resolver(StaticIdentity(vec![]))
            .resolve(&appellant(), &resource(), "$resource.owner")
            .await
            .unwrap();
        assert_eq!(approvers, vec![Email::parse("alice@x").unwrap()]);
    }

    #[tokio::test]
    async fn test_resolve_list_leaf() {
        let approvers = resolver(StaticIdentity(vec![]))
            .resolve(&appellant(), &resource(), "$resource.stewards")
            .await
            .unwrap();
        assert_eq!(approvers.len(), 2);
    }

    #[tokio::test]
    async fn test_non_string_leaf_is_invalid() {
        let err = resolver(StaticIdentity(vec![]))
            .resolve(&appellant(), &resource(), "$resource.size_gb")
            .await
            .unwrap_err();
        assert!(matches!(err, PolicyError::ApproverInvalidType { .. }));
    }

    #[tokio::test]
    async fn test_missing_path() {
        let err = resolver(StaticIdentity(vec![]))
            .resolve(&appellant(), &resource(), "$resource.nobody")
            .await
            .unwrap_err();
        assert!(matches!(err, PolicyError::ApproverKeyNotFound { .. }));
    }

    #[tokio::test]
    async fn test_user_approvers_delegates_to_identity() {
        let approvers = resolver(StaticIdentity(vec!["bob@x".to_string()]))
            .resolve(&appellant(), &resource(), "$user_approvers")
            .await
            .unwrap();
        assert_eq!(approvers, vec![Email::parse("bob@x").unwrap()]);
    }

    #[tokio::test]
    async fn test_identity_failure_propagates() {
        let err = resolver(FailingIdentity)
            .resolve(&appellant(), &resource(), "$user_approvers")
            .await
            .unwrap_err();
        assert!(matches!(err, PolicyError::Identity(_)));
    }

    #[tokio::test]
    async fn test_invalid_email_from_identity_fails() {
        let err = resolver(StaticIdentity(vec!["not an email".to_string()]))
            .resolve(&appellant(), &resource(), "$user_approvers")
            .await
            .unwrap_err();
        assert!(matches!(err, PolicyError::InvalidEmail(_)));
    }

    #[tokio::test]
    async fn test_empty_spec_resolves_to_no_approvers() {
        let approvers = resolver(StaticIdentity(vec![]))
            .resolve(&appellant(), &resource(), "")
            .await
            .unwrap();
        assert!(approvers.is_empty());
    }
}
