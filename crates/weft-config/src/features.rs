//! Feature flag merging.

use serde_json::{Map, Value};

use crate::Result;

/// Merge feature flags: main wins, then the first import that sets a flag.
///
/// Flags are additive, so a later import setting an already-set flag is
/// ignored rather than reported.
pub fn merge_features(
    top: &Map<String, Value>,
    imported: &[Map<String, Value>],
) -> Result<Map<String, Value>> {
    let mut result = top.clone();
    for features in imported {
        for (flag, value) in features {
            if result.contains_key(flag) {
                tracing::debug!(flag = %flag, "feature flag already set, ignoring import value");
                continue;
            }
            result.insert(flag.clone(), value.clone());
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_no_imports_returns_top() {
        let top = map(json!({"cache-memory": true}));
        assert_eq!(merge_features(&top, &[]).unwrap(), top);
    }

    #[test]
    fn test_top_takes_precedence() {
        let top = map(json!({"cache-memory": false}));
        let imports = vec![map(json!({"cache-memory": true}))];
        let merged = merge_features(&top, &imports).unwrap();
        assert_eq!(merged["cache-memory"], json!(false));
    }

    #[test]
    fn test_first_import_wins() {
        let top = map(json!({}));
        let imports = vec![
            map(json!({"agent-sessions": "v1"})),
            map(json!({"agent-sessions": "v2", "dangerous-writes": true})),
        ];
        let merged = merge_features(&top, &imports).unwrap();
        assert_eq!(merged["agent-sessions"], json!("v1"));
        assert_eq!(merged["dangerous-writes"], json!(true));
    }
}
