//! Auto-resolution condition evaluation.
//!
//! Conditions address the same context the approver language sees:
//! `$resource.<path>` walks the serialized resource tree, `$appellant` is
//! the requesting identity. A missing path evaluates to false rather than
//! erroring, so a condition can reference details only some resources carry.

use guardian_core::{ApprovalCondition, Email};
use serde_json::Value;

use crate::error::{PolicyError, PolicyResult};
use crate::path;

/// Condition field addressing the appellant identity.
const APPELLANT_KEY: &str = "$appellant";

/// Evaluate a condition against the appeal context.
///
/// `resource_tree` is the serialized resource entity, computed once per
/// evaluation pass by the caller.
///
/// # Errors
///
/// Returns [`PolicyError::ConditionKeyNotRecognized`] when the field uses
/// an unknown prefix.
pub fn evaluate(
    condition: &ApprovalCondition,
    appellant: &Email,
    resource_tree: &Value,
) -> PolicyResult<bool> {
    if let Some(resource_path) = condition.field.strip_prefix(crate::approvers::RESOURCE_PREFIX) {
        Ok(path::lookup(resource_tree, resource_path)
            .is_some_and(|value| *value == condition.match_condition.eq))
    } else if condition.field == APPELLANT_KEY {
        Ok(Value::String(appellant.as_str().to_string()) == condition.match_condition.eq)
    } else {
        Err(PolicyError::ConditionKeyNotRecognized {
            key: condition.field.clone(),
        })
    }
}
