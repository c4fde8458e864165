//! Tool configuration merging.
//!
//! Tools from imports are combined with the main workflow's tools:
//! - Mappings: merged key by key (recursive)
//! - Lists: union, existing entries first, duplicates dropped
//! - Null / `true`: an "enabled" marker; any richer declaration replaces it
//! - Scalars: the first writer (main, then imports in order) wins
//! - List vs mapping: a structural error

use serde_json::{Map, Value};

use crate::lines::json_objects;
use crate::{ConfigError, Result};

/// Fold the imported tool declarations into `top`.
///
/// `imported` holds one JSON object per line. Lines that fail to parse are
/// skipped; shapes that cannot be combined are an error.
pub fn merge_tools(top: &Map<String, Value>, imported: &str) -> Result<Map<String, Value>> {
    let mut result = top.clone();
    for tools in json_objects(imported, "tools") {
        for (name, incoming) in tools {
            let merged = match result.remove(&name) {
                Some(existing) => merge_tool_values(existing, incoming, &name)?,
                None => incoming,
            };
            result.insert(name, merged);
        }
    }
    Ok(result)
}

/// Merge two declarations of the same tool (or of a nested key within it).
pub fn merge_tool_values(existing: Value, incoming: Value, path: &str) -> Result<Value> {
    match (existing, incoming) {
        (Value::Object(mut base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                let child_path = format!("{}.{}", path, key);
                let merged = match base.remove(&key) {
                    Some(current) => merge_tool_values(current, value, &child_path)?,
                    None => value,
                };
                base.insert(key, merged);
            }
            Ok(Value::Object(base))
        }

        (Value::Array(mut base), Value::Array(overlay)) => {
            for item in overlay {
                if !base.contains(&item) {
                    base.push(item);
                }
            }
            Ok(Value::Array(base))
        }

        (existing @ (Value::Array(_) | Value::Object(_)), Value::Null | Value::Bool(true)) => {
            Ok(existing)
        }
        (Value::Null | Value::Bool(true), incoming) => Ok(incoming),

        (Value::Array(_), Value::Object(_)) => Err(ConfigError::ToolMerge {
            path: path.to_string(),
            reason: "declared as a list in one file and as a mapping in another".to_string(),
        }),
        (Value::Object(_), Value::Array(_)) => Err(ConfigError::ToolMerge {
            path: path.to_string(),
            reason: "declared as a mapping in one file and as a list in another".to_string(),
        }),

        (existing, _) => Ok(existing),
    }
}
