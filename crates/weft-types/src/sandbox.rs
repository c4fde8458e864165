//! Agent sandbox selection.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Result, TypeError};

/// Which isolation layer wraps the agent process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SandboxAgent {
    /// Egress firewall container.
    Awf,
    /// Sandbox runtime with its own network isolation.
    Srt,
    /// Sandbox explicitly turned off.
    Disabled,
}

impl SandboxAgent {
    fn parse(s: &str) -> Result<Self> {
        match s {
            "awf" => Ok(Self::Awf),
            "srt" | "sandbox-runtime" => Ok(Self::Srt),
            other => Err(TypeError::InvalidSandbox(format!(
                "unknown sandbox agent '{}'. Expected `awf` or `srt`",
                other
            ))),
        }
    }
}

/// Sandbox configuration from the `sandbox:` frontmatter key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<SandboxAgent>,
}

impl SandboxConfig {
    /// Decode `sandbox: srt`, `sandbox: false` or `sandbox: { agent: awf }`.
    pub fn from_value(value: &Value) -> Result<Self> {
        let agent = match value {
            Value::Null => None,
            Value::Bool(false) => Some(SandboxAgent::Disabled),
            Value::String(s) => Some(SandboxAgent::parse(s)?),
            Value::Object(map) => match map.get("agent") {
                None | Some(Value::Null) => None,
                Some(Value::Bool(false)) => Some(SandboxAgent::Disabled),
                Some(Value::String(s)) => Some(SandboxAgent::parse(s)?),
                Some(other) => {
                    return Err(TypeError::InvalidSandbox(format!(
                        "`agent` must be a string or false, got {}",
                        other
                    )));
                }
            },
            other => {
                return Err(TypeError::InvalidSandbox(format!(
                    "expected a mapping or string, got {}",
                    other
                )));
            }
        };
        Ok(Self { agent })
    }

    /// Whether the sandbox brings its own network isolation, which rules
    /// out the egress firewall.
    pub fn isolates_network(&self) -> bool {
        self.agent == Some(SandboxAgent::Srt)
    }

    /// Whether the firewall must not be switched on implicitly.
    pub fn excludes_firewall(&self) -> bool {
        matches!(self.agent, Some(SandboxAgent::Srt | SandboxAgent::Disabled))
    }
}
