//! Typed index of pending appeals for intake duplicate suppression.

use std::collections::HashMap;

use guardian_core::{Appeal, AppealId, Email, ResourceId};

/// Index over `(appellant, resource, role)` of pending appeals.
///
/// Built once per intake batch from the currently-pending appeals, then
/// updated as drafts are admitted so collisions inside the batch are caught
/// as well.
#[derive(Debug, Default)]
pub(crate) struct PendingIndex {
    inner: HashMap<(Email, ResourceId, String), AppealId>,
}

impl PendingIndex {
    pub(crate) fn from_appeals(appeals: &[Appeal]) -> Self {
        let mut index = Self::default();
        for appeal in appeals {
            index.insert(appeal);
        }
        index
    }

    pub(crate) fn insert(&mut self, appeal: &Appeal) {
        self.inner.insert(
            (
                appeal.appellant.clone(),
                appeal.resource_id,
                appeal.role.clone(),
            ),
            appeal.id,
        );
    }

    pub(crate) fn contains(&self, appellant: &Email, resource_id: ResourceId, role: &str) -> bool {
        self.get(appellant, resource_id, role).is_some()
    }

    pub(crate) fn get(
        &self,
        appellant: &Email,
        resource_id: ResourceId,
        role: &str,
    ) -> Option<AppealId> {
        self.inner
            .get(&(appellant.clone(), resource_id, role.to_string()))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guardian_core::{AppealOptions, AppealStatus, Resource, Timestamp};

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
            approvals: vec![],
            created_at: Timestamp::now(),
            updated_at: Timestamp::now(),
            revoked_at: None,
            revoked_by: None,
            revoke_reason: None,
        }
    }

    #[test]
    fn test_contains_and_get() {
        let resource_id = ResourceId::new();
        let a = appeal("u@x", resource_id, "read");
        let index = PendingIndex::from_appeals(std::slice::from_ref(&a));

        let u = Email::parse("u@x").unwrap();
        assert!(index.contains(&u, resource_id, "read"));
        assert_eq!(index.get(&u, resource_id, "read"), Some(a.id));
        assert!(!index.contains(&u, resource_id, "write"));
        assert!(!index.contains(&Email::parse("v@x").unwrap(), resource_id, "read"));
    }

    #[test]
    fn test_insert_catches_intra_batch_duplicates() {
        let resource_id = ResourceId::new();
        let mut index = PendingIndex::default();
        let u = Email::parse("u@x").unwrap();
        assert!(!index.contains(&u, resource_id, "read"));

        index.insert(&appeal("u@x", resource_id, "read"));
        assert!(index.contains(&u, resource_id, "read"));
    }
}
