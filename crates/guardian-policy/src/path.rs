//! Dotted-path lookup over a JSON tree.
//!
//! The specifier language only ever addresses object members, so this walk
//! is deliberately narrow: no array indexing, no wildcards, no escaping.

use serde_json::Value;

/// Walk `tree` along a dotted path, returning the addressed value.
pub(crate) fn lookup<'a>(tree: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = tree;
    for segment in path.split('.') {
        if segment.is_empty() {
            return None;
        }
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree() -> Value {
        json!({
            "owner": "alice@x",
            "labels": { "team": "analytics", "reviewers": ["a@x", "b@x"] },
        })
    }

    #[test]
    fn test_top_level_lookup() {
        assert_eq!(lookup(&tree(), "owner"), Some(&json!("alice@x")));
    }

    #[test]
    fn test_nested_lookup() {
        assert_eq!(lookup(&tree(), "labels.team"), Some(&json!("analytics")));
        assert_eq!(
            lookup(&tree(), "labels.reviewers"),
            Some(&json!(["a@x", "b@x"]))
        );
    }

    #[test]
    fn test_missing_segments() {
        assert!(lookup(&tree(), "missing").is_none());
        assert!(lookup(&tree(), "owner.sub").is_none());
        assert!(lookup(&tree(), "labels..team").is_none());
        assert!(lookup(&tree(), "").is_none());
    }
}
