//! Engine declarations.
//!
//! The `engine:` key is either a bare ID or a mapping:
//!
//! ```yaml
//! engine: claude
//! ```
//!
//! ```yaml
//! engine:
//!   id: copilot
//!   model: gpt-5
//!   max-turns: 20
//! ```
//!
//! Both shapes are decoded once, at the boundary, into [`EngineSpec`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Result, TypeError};

/// A decoded `engine:` declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineSpec {
    /// `engine: <id>`
    Id(String),
    /// `engine: { id: <id>, ... }`
    Config(EngineConfig),
}

impl EngineSpec {
    /// Decode a frontmatter/fragment value.
    ///
    /// An object must carry a string `id`; anything else is rejected rather
    /// than ignored.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(id) if !id.trim().is_empty() => Ok(Self::Id(id.clone())),
            Value::String(_) => Err(TypeError::InvalidEngine(
                "engine ID must not be empty".to_string(),
            )),
            Value::Object(map) => {
                match map.get("id") {
                    Some(Value::String(id)) if !id.trim().is_empty() => {}
                    Some(Value::String(_)) => {
                        return Err(TypeError::InvalidEngine(
                            "engine `id` must not be empty".to_string(),
                        ));
                    }
                    Some(other) => {
                        return Err(TypeError::InvalidEngine(format!(
                            "engine `id` must be a string, got {}",
                            other
                        )));
                    }
                    None => {
                        return Err(TypeError::InvalidEngine(
                            "engine object must have an `id` field, e.g. `engine: { id: copilot }`"
                                .to_string(),
                        ));
                    }
                }
                let config: EngineConfig = serde_json::from_value(value.clone())
                    .map_err(|e| TypeError::InvalidEngine(e.to_string()))?;
                Ok(Self::Config(config))
            }
            other => Err(TypeError::InvalidEngine(format!(
                "expected a string or mapping, got {}",
                other
            ))),
        }
    }

    /// Decode a JSON-encoded declaration as produced by import resolution.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| TypeError::InvalidEngine(format!("malformed JSON: {}", e)))?;
        Self::from_value(&value)
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) => id,
            Self::Config(config) => &config.id,
        }
    }

    /// Normalize into the object form.
    pub fn into_config(self) -> EngineConfig {
        match self {
            Self::Id(id) => EngineConfig::new(id),
            Self::Config(config) => config,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Id(id) => Value::String(id.clone()),
            Self::Config(config) => serde_json::to_value(config).unwrap_or(Value::Null),
        }
    }
}

/// Object form of an engine declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EngineConfig {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_turns: Option<u32>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Engine-specific keys this crate does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EngineConfig {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_id() {
        let spec = EngineSpec::from_value(&json!("claude")).unwrap();
        assert_eq!(spec, EngineSpec::Id("claude".to_string()));
        assert_eq!(spec.id(), "claude");
    }

    #[test]
    fn test_object_form() {
        let spec = EngineSpec::from_value(&json!({
            "id": "copilot",
            "model": "gpt-5",
            "max-turns": 12,
            "env": {"DEBUG": "1"},
            "concurrency": "single"
        }))
        .unwrap();
        let EngineSpec::Config(config) = spec else {
            panic!("expected object form");
        };
        assert_eq!(config.id, "copilot");
        assert_eq!(config.model.as_deref(), Some("gpt-5"));
        assert_eq!(config.max_turns, Some(12));
        assert_eq!(config.env.get("DEBUG").map(String::as_str), Some("1"));
        assert_eq!(config.extra.get("concurrency"), Some(&json!("single")));
    }

    #[test]
    fn test_object_without_id() {
        let err = EngineSpec::from_value(&json!({"model": "gpt-5"})).unwrap_err();
        assert!(err.to_string().contains("`id`"));
    }

    #[test]
    fn test_non_string_id() {
        let err = EngineSpec::from_value(&json!({"id": 7})).unwrap_err();
        assert!(err.to_string().contains("must be a string"));
    }

    #[test]
    fn test_malformed_json() {
        let err = EngineSpec::from_json("{\"id\": ").unwrap_err();
        assert!(err.to_string().contains("malformed JSON"));
    }

    #[test]
    fn test_into_config_from_id() {
        let config = EngineSpec::Id("codex".to_string()).into_config();
        assert_eq!(config, EngineConfig::new("codex"));
    }
}
