//! Approval policies.
//!
//! A policy is a versioned, ordered list of approval steps. Appeals pin the
//! `(id, version)` pair at intake and it never changes afterwards, so editing
//! a policy (which bumps the version) cannot disturb in-flight appeals.

use serde::{Deserialize, Serialize};

/// An ordered list of approval steps, identified by `(id, version)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    /// Stable policy identifier (e.g. `"bi-database-access"`).
    pub id: String,
    /// Monotonically increasing version.
    pub version: u32,
    /// Steps in declaration order; the order defines approval indices.
    pub steps: Vec<PolicyStep>,
}

impl Policy {
    /// Create a policy from its parts.
    #[must_use]
    pub fn new(id: impl Into<String>, version: u32, steps: Vec<PolicyStep>) -> Self {
        Self {
            id: id.into(),
            version,
            steps,
        }
    }
}

/// One step of an approval policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyStep {
    /// Step name, unique within the policy (e.g. `"manager"`).
    pub name: String,
    /// Approver specifier: `$user_approvers`, `$resource.<path>`, or empty
    /// for a step with no human gatekeepers.
    #[serde(default)]
    pub approvers: String,
    /// Optional auto-resolution predicate. When it evaluates true the step
    /// approves itself without human action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ApprovalCondition>,
}

impl PolicyStep {
    /// Create a step with an approver specifier and no condition.
    #[must_use]
    pub fn new(name: impl Into<String>, approvers: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            approvers: approvers.into(),
            condition: None,
        }
    }

    /// Attach an auto-resolution condition (builder style).
    #[must_use]
    pub fn with_condition(mut self, condition: ApprovalCondition) -> Self {
        self.condition = Some(condition);
        self
    }
}

/// A boolean predicate over the appeal context.
///
/// `field` is a dotted path with a recognized prefix (`$resource.<path>` or
/// `$appellant`); the step auto-approves when the addressed value matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalCondition {
    /// The context path to test.
    pub field: String,
    /// The match applied to the addressed value.
    #[serde(rename = "match")]
    pub match_condition: MatchCondition,
}

impl ApprovalCondition {
    /// Create an equality condition on a context path.
    #[must_use]
    pub fn eq(field: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            field: field.into(),
            match_condition: MatchCondition { eq: value },
        }
    }
}

/// The comparison half of an [`ApprovalCondition`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCondition {
    /// The value the addressed field must equal.
    pub eq: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_condition_serializes_with_match_key() {
        let step = PolicyStep::new("auto", "")
            .with_condition(ApprovalCondition::eq("$resource.tier", json!("sandbox")));
        let value = serde_json::to_value(&step).unwrap();
        assert_eq!(value["condition"]["match"]["eq"], json!("sandbox"));
    }

    #[test]
    fn test_step_defaults() {
        let step: PolicyStep = serde_json::from_value(json!({"name": "manager"})).unwrap();
        assert_eq!(step.approvers, "");
        assert!(step.condition.is_none());
    }
}
