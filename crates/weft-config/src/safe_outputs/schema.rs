//! Access to the embedded safe-outputs schema.
//!
//! The schema is parsed once per process; every caller afterwards shares the
//! same read-only set of type keys.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use serde_json::Value;

use crate::{ConfigError, Result};

const SCHEMA_JSON: &str = include_str!("../../schemas/safe_outputs.schema.json");

/// Schema properties that configure the safe-outputs block as a whole
/// rather than naming an output type.
pub const META_KEYS: &[&str] = &[
    "allowed-domains",
    "staged",
    "env",
    "github-token",
    "max-patch-size",
    "runs-on",
    "messages",
    "jobs",
];

static TYPE_KEYS: OnceLock<std::result::Result<BTreeSet<String>, String>> = OnceLock::new();

/// The set of valid safe-output type keys (`create-issue`, `add-comment`, ...).
pub fn safe_output_type_keys() -> Result<&'static BTreeSet<String>> {
    TYPE_KEYS
        .get_or_init(|| load_type_keys(SCHEMA_JSON))
        .as_ref()
        .map_err(|e| ConfigError::Schema(e.clone()))
}

fn load_type_keys(schema: &str) -> std::result::Result<BTreeSet<String>, String> {
    let schema: Value = serde_json::from_str(schema).map_err(|e| e.to_string())?;
    let properties = schema
        .get("properties")
        .and_then(Value::as_object)
        .ok_or_else(|| "schema has no `properties` object".to_string())?;

    let keys: BTreeSet<String> = properties
        .keys()
        .filter(|k| !META_KEYS.contains(&k.as_str()))
        .cloned()
        .collect();
    tracing::debug!(count = keys.len(), "loaded safe-output type keys");
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_keys_exclude_meta() {
        let keys = safe_output_type_keys().unwrap();
        assert!(keys.contains("create-issue"));
        assert!(keys.contains("add-comment"));
        assert!(keys.contains("noop"));
        for meta in META_KEYS {
            assert!(!keys.contains(*meta), "{meta} should not be a type key");
        }
    }

    #[test]
    fn test_cached_instance_shared() {
        let first = safe_output_type_keys().unwrap();
        let second = safe_output_type_keys().unwrap();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_missing_properties_rejected() {
        assert!(load_type_keys(r#"{"type": "object"}"#).is_err());
        assert!(load_type_keys("not json").is_err());
    }
}
