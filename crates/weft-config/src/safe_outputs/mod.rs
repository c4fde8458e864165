//! Safe-outputs merging and conflict detection.
//!
//! Precedence rules:
//! - A type defined in the main workflow always wins; imports defining the
//!   same type are silently overridden.
//! - A type defined by two different imports (and not by main) is an error.
//! - Meta fields (`staged`, `env`, `github-token`, ...) are taken from main
//!   when set there, otherwise from the first import that sets them.
//! - `jobs` is not merged here.

mod schema;
mod types;

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::{ConfigError, Result};

pub use schema::{META_KEYS, safe_output_type_keys};
pub use types::{
    AddCommentConfig, CloseEntityConfig, CreateDiscussionConfig, CreateIssueConfig,
    CreatePullRequestConfig, GenericSafeOutputConfig, LabelsConfig, SafeOutputBase,
    SafeOutputMessages, SafeOutputsConfig, TYPE_FIELD_KEYS, ThreatDetectionConfig,
    UpdateEntityConfig,
};

/// Merge imported safe-outputs sections into the main workflow's.
///
/// `imported` holds one JSON object per import, in import order. Entries
/// that are not JSON objects are logged and skipped.
pub fn merge_safe_outputs(
    top: Option<&SafeOutputsConfig>,
    imported: &[String],
) -> Result<Option<SafeOutputsConfig>> {
    if imported.iter().all(|json| is_blank(json)) {
        return Ok(top.cloned());
    }

    let type_keys = safe_output_type_keys()?;
    let top_keys: HashSet<&str> = top
        .map(SafeOutputsConfig::populated_type_keys)
        .unwrap_or_default()
        .into_iter()
        .collect();

    // type key -> 1-based number of the import that claimed it
    let mut claimed: HashMap<String, usize> = HashMap::new();
    let mut surviving = Vec::new();

    for (index, json) in imported.iter().enumerate() {
        if is_blank(json) {
            continue;
        }
        let import_number = index + 1;
        let mut map = match serde_json::from_str::<Value>(json) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                tracing::debug!(import = import_number, "skipping non-object safe-outputs import");
                continue;
            }
            Err(e) => {
                tracing::debug!(import = import_number, error = %e, "skipping malformed safe-outputs import");
                continue;
            }
        };

        let declared: Vec<String> = map
            .iter()
            .filter(|(key, value)| type_keys.contains(*key) && **value != Value::Bool(false))
            .map(|(key, _)| key.clone())
            .collect();

        for key in declared {
            if let Err(e) = decode_type_entry(&key, &map) {
                tracing::debug!(key = %key, import = import_number, error = %e, "skipping undecodable safe output");
                map.remove(&key);
                continue;
            }
            if top_keys.contains(key.as_str()) {
                tracing::debug!(key = %key, import = import_number, "safe output overridden by main workflow");
                map.remove(&key);
            } else if let Some(&first) = claimed.get(&key) {
                return Err(ConfigError::SafeOutputConflict {
                    key,
                    first,
                    second: import_number,
                });
            } else {
                claimed.insert(key, import_number);
            }
        }

        match SafeOutputsConfig::from_value(&Value::Object(map.clone())) {
            Ok(config) => surviving.push(config),
            Err(e) => {
                // Type entries decoded individually above, so a failure here
                // comes from the meta fields. Keep the types without them.
                tracing::debug!(import = import_number, error = %e, "dropping undecodable safe-outputs meta fields");
                map.retain(|key, _| type_keys.contains(key));
                match SafeOutputsConfig::from_value(&Value::Object(map)) {
                    Ok(config) => surviving.push(config),
                    Err(e) => {
                        tracing::debug!(import = import_number, error = %e, "skipping undecodable safe-outputs import");
                    }
                }
            }
        }
    }

    let mut result = top.cloned().unwrap_or_default();
    for mut config in surviving {
        result.fill_type_fields_from(&mut config);
        result.fill_meta_from(&config);
    }

    if top.is_none() && result == SafeOutputsConfig::default() {
        return Ok(None);
    }
    Ok(Some(result))
}

/// Decode a single type entry on its own so one bad sub-config cannot
/// take its siblings down with it.
fn decode_type_entry(key: &str, map: &serde_json::Map<String, Value>) -> serde_json::Result<()> {
    let mut single = serde_json::Map::new();
    if let Some(value) = map.get(key) {
        single.insert(key.to_string(), value.clone());
    }
    SafeOutputsConfig::from_value(&Value::Object(single))?;
    Ok(())
}

fn is_blank(json: &str) -> bool {
    let json = json.trim();
    json.is_empty() || json == "{}" || json == "null"
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(value: Value) -> SafeOutputsConfig {
        SafeOutputsConfig::from_value(&value).unwrap()
    }

    fn imports(values: &[Value]) -> Vec<String> {
        values.iter().map(Value::to_string).collect()
    }

    #[test]
    fn test_no_imports_returns_top() {
        let top = config(json!({"create-issue": {"max": 1}}));
        assert_eq!(merge_safe_outputs(Some(&top), &[]).unwrap(), Some(top.clone()));
        assert_eq!(merge_safe_outputs(None, &[]).unwrap(), None);
    }

    #[test]
    fn test_main_overrides_import() {
        let top = config(json!({"create-issue": {"title-prefix": "[main] "}}));
        let imported = imports(&[json!({"create-issue": {"title-prefix": "[import] ", "max": 9}})]);

        let merged = merge_safe_outputs(Some(&top), &imported).unwrap().unwrap();
        assert_eq!(merged.create_issues, top.create_issues);
    }

    #[test]
    fn test_conflict_between_imports() {
        let imported = imports(&[
            json!({"create-issue": {}}),
            json!({"add-comment": {}}),
            json!({"create-issue": {"max": 2}}),
        ]);

        let err = merge_safe_outputs(None, &imported).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::SafeOutputConflict { ref key, first: 1, second: 3 } if key == "create-issue"
        ));
        let message = err.to_string();
        assert!(message.contains("create-issue"));
        assert!(message.contains("multiple imports"));
    }

    #[test]
    fn test_conflict_regardless_of_order() {
        let a = json!({"create-issue": {"max": 1}, "add-labels": {}});
        let b = json!({"create-issue": {"max": 2}});
        assert!(merge_safe_outputs(None, &imports(&[a.clone(), b.clone()])).is_err());
        assert!(merge_safe_outputs(None, &imports(&[b, a])).is_err());
    }

    #[test]
    fn test_main_definition_resolves_import_conflict() {
        let top = config(json!({"create-issue": {"max": 3}}));
        let imported = imports(&[
            json!({"create-issue": {"max": 1}}),
            json!({"create-issue": {"max": 2}}),
        ]);

        let merged = merge_safe_outputs(Some(&top), &imported).unwrap().unwrap();
        assert_eq!(merged.create_issues.unwrap().base.max, Some(3));
    }

    #[test]
    fn test_types_from_different_imports_combined() {
        let top = config(json!({"add-comment": {}}));
        let imported = imports(&[
            json!({"create-issue": {"labels": ["bug"]}}),
            json!({"add-labels": {"allowed": ["triage"]}}),
        ]);

        let merged = merge_safe_outputs(Some(&top), &imported).unwrap().unwrap();
        assert_eq!(
            merged.populated_type_keys(),
            vec!["create-issue", "add-comment", "add-labels"]
        );
        assert_eq!(merged.add_labels.unwrap().allowed, vec!["triage"]);
    }

    #[test]
    fn test_meta_only_import_merged() {
        let top = config(json!({"create-issue": {}, "github-token": "${{ secrets.MAIN }}"}));
        let imported = imports(&[
            json!({"staged": true, "github-token": "${{ secrets.IMPORT }}", "runs-on": "ubuntu-latest"}),
            json!({"runs-on": "self-hosted", "allowed-domains": ["example.com"], "max-patch-size": 512}),
        ]);

        let merged = merge_safe_outputs(Some(&top), &imported).unwrap().unwrap();
        assert!(merged.staged);
        assert_eq!(merged.github_token.as_deref(), Some("${{ secrets.MAIN }}"));
        assert_eq!(merged.runs_on.as_deref(), Some("ubuntu-latest"));
        assert_eq!(merged.allowed_domains, vec!["example.com"]);
        assert_eq!(merged.maximum_patch_size, Some(512));
    }

    #[test]
    fn test_messages_merged_per_field() {
        let top = config(json!({"messages": {"footer": "main"}}));
        let imported = imports(&[
            json!({"messages": {"footer": "import", "run-success": "done"}}),
            json!({"messages": {"run-success": "later", "append-only-comments": true}}),
        ]);

        let merged = merge_safe_outputs(Some(&top), &imported).unwrap().unwrap();
        let messages = merged.messages.unwrap();
        assert_eq!(messages.footer.as_deref(), Some("main"));
        assert_eq!(messages.run_success.as_deref(), Some("done"));
        assert!(messages.append_only_comments);
    }

    #[test]
    fn test_jobs_not_merged() {
        let imported = imports(&[json!({"jobs": {"notify": {"runs-on": "ubuntu-latest"}}, "noop": {}})]);
        let merged = merge_safe_outputs(None, &imported).unwrap().unwrap();
        assert!(merged.jobs.is_empty());
        assert!(merged.noop.is_some());
    }

    #[test]
    fn test_malformed_import_skipped() {
        let imported = vec!["{not json".to_string(), json!({"noop": {}}).to_string()];
        let merged = merge_safe_outputs(None, &imported).unwrap().unwrap();
        assert!(merged.noop.is_some());
    }

    #[test]
    fn test_disabled_type_does_not_claim() {
        let imported = imports(&[json!({"create-issue": false}), json!({"create-issue": {}})]);
        let merged = merge_safe_outputs(None, &imported).unwrap().unwrap();
        assert!(merged.create_issues.is_some());
    }

    #[test]
    fn test_bad_type_entry_skipped_alone() {
        let imported = imports(&[
            json!({"create-issue": {"max": "many"}, "add-comment": {"max": 2}, "staged": true}),
            json!({"create-issue": {"max": 4}}),
        ]);
        let merged = merge_safe_outputs(None, &imported).unwrap().unwrap();
        assert_eq!(merged.add_comments.unwrap().base.max, Some(2));
        assert!(merged.staged);
        assert_eq!(merged.create_issues.unwrap().base.max, Some(4));
    }

    #[test]
    fn test_bad_meta_keeps_types() {
        let imported = imports(&[json!({"noop": {}, "staged": "sometimes"})]);
        let merged = merge_safe_outputs(None, &imported).unwrap().unwrap();
        assert!(merged.noop.is_some());
        assert!(!merged.staged);
    }
}
