//! Network egress policy and firewall settings.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Result, TypeError};

/// The ecosystem-defaults allowance used when a workflow declares no network policy.
pub const DEFAULT_NETWORK: &str = "defaults";

/// Wildcard allowance meaning "no restriction".
pub const WILDCARD: &str = "*";

/// Network permissions for the agent job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkPermissions {
    /// Allowed domains (or ecosystem identifiers such as `defaults`, `python`).
    pub allowed: Vec<String>,

    /// Egress firewall settings. `None` means not configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firewall: Option<FirewallConfig>,
}

impl NetworkPermissions {
    /// The policy applied when the frontmatter has no `network:` key.
    pub fn defaults() -> Self {
        Self {
            allowed: vec![DEFAULT_NETWORK.to_string()],
            firewall: None,
        }
    }

    /// Decode the frontmatter `network:` value.
    ///
    /// Accepts the `defaults` shorthand or a mapping with `allowed` and
    /// `firewall` keys.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::defaults()),
            Value::String(s) if s == DEFAULT_NETWORK => Ok(Self::defaults()),
            Value::String(s) => Err(TypeError::InvalidNetwork(format!(
                "unknown shorthand '{}'. Use `network: defaults` or `network: {{ allowed: [\"example.com\"] }}`",
                s
            ))),
            Value::Object(_) => serde_json::from_value(value.clone())
                .map_err(|e| TypeError::InvalidNetwork(e.to_string())),
            other => Err(TypeError::InvalidNetwork(format!(
                "expected a mapping or `defaults`, got {}",
                other
            ))),
        }
    }

    /// Whether egress is restricted at all (no `*` allowance).
    pub fn has_restrictions(&self) -> bool {
        !self.allowed.iter().any(|d| d == WILDCARD)
    }

    pub fn firewall_enabled(&self) -> bool {
        self.firewall.as_ref().is_some_and(|f| f.enabled)
    }
}

/// Egress firewall configuration.
///
/// In frontmatter this is either a bare boolean or a mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "FirewallSetting")]
pub struct FirewallConfig {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(rename = "log-level", skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl FirewallConfig {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            version: None,
            log_level: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FirewallSetting {
    Flag(bool),
    Table {
        #[serde(default = "enabled_by_default")]
        enabled: bool,
        #[serde(default)]
        version: Option<String>,
        #[serde(default, rename = "log-level")]
        log_level: Option<String>,
    },
}

fn enabled_by_default() -> bool {
    true
}

impl From<FirewallSetting> for FirewallConfig {
    fn from(setting: FirewallSetting) -> Self {
        match setting {
            FirewallSetting::Flag(enabled) => Self {
                enabled,
                version: None,
                log_level: None,
            },
            FirewallSetting::Table {
                enabled,
                version,
                log_level,
            } => Self {
                enabled,
                version,
                log_level,
            },
        }
    }
}
