//! Token permission scopes and levels.
//!
//! Permissions are written in frontmatter either as a mapping:
//!
//! ```yaml
//! permissions:
//!   contents: read
//!   issues: write
//! ```
//!
//! or as a shorthand string (`read-all`, `write-all`) that expands to every
//! known scope at that level.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Result, TypeError};

/// Scopes understood by the shorthand expansions.
pub const KNOWN_SCOPES: &[&str] = &[
    "actions",
    "attestations",
    "checks",
    "contents",
    "deployments",
    "discussions",
    "id-token",
    "issues",
    "metadata",
    "models",
    "packages",
    "pages",
    "pull-requests",
    "repository-projects",
    "security-events",
    "statuses",
];

/// Access level granted (or required) for one scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    None,
    Read,
    Write,
}

impl PermissionLevel {
    /// Whether holding `self` satisfies a requirement of `required`.
    ///
    /// Equal levels satisfy each other and `write` satisfies `read`.
    /// Nothing else does.
    pub fn satisfies(self, required: PermissionLevel) -> bool {
        self == required || (self == Self::Write && required == Self::Read)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            other => Err(other.to_string()),
        }
    }
}

/// A scope → level mapping.
///
/// Backed by a `BTreeMap` so iteration (and therefore rendering) is always
/// in alphabetical scope order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet {
    scopes: BTreeMap<String, PermissionLevel>,
}

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every known scope at the same level.
    pub fn all(level: PermissionLevel) -> Self {
        Self {
            scopes: KNOWN_SCOPES
                .iter()
                .map(|scope| (scope.to_string(), level))
                .collect(),
        }
    }

    /// Decode a permissions value.
    ///
    /// Accepts a mapping of scope to level, the `read-all`/`write-all`
    /// shorthands, or null (empty set).
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::new()),
            Value::String(s) => match s.as_str() {
                "read-all" => Ok(Self::all(PermissionLevel::Read)),
                "write-all" => Ok(Self::all(PermissionLevel::Write)),
                "{}" | "" => Ok(Self::new()),
                other => Err(TypeError::InvalidPermissions(format!(
                    "unknown shorthand '{}'",
                    other
                ))),
            },
            Value::Object(map) => {
                let mut set = Self::new();
                for (scope, level) in map {
                    let level_str = level.as_str().ok_or_else(|| {
                        TypeError::InvalidPermissionLevel {
                            scope: scope.clone(),
                            level: level.to_string(),
                        }
                    })?;
                    let level = level_str.parse::<PermissionLevel>().map_err(|level| {
                        TypeError::InvalidPermissionLevel {
                            scope: scope.clone(),
                            level,
                        }
                    })?;
                    set.insert(scope.clone(), level);
                }
                Ok(set)
            }
            other => Err(TypeError::InvalidPermissions(format!(
                "expected a mapping or string, got {}",
                other
            ))),
        }
    }

    /// Decode a permissions block written as YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::new());
        }
        let value: Value = serde_yaml::from_str(yaml)?;
        Self::from_value(&value)
    }

    /// Level held for `scope`, if the scope is declared at all.
    pub fn get(&self, scope: &str) -> Option<PermissionLevel> {
        self.scopes.get(scope).copied()
    }

    pub fn insert(&mut self, scope: impl Into<String>, level: PermissionLevel) {
        self.scopes.insert(scope.into(), level);
    }

    /// Raise `scope` to `level` if it is currently lower (or absent).
    pub fn raise(&mut self, scope: &str, level: PermissionLevel) {
        let entry = self.scopes.entry(scope.to_string()).or_insert(level);
        if level > *entry {
            *entry = level;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Scopes in alphabetical order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, PermissionLevel)> {
        self.scopes.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Render as a ready-to-paste `permissions:` frontmatter block.
    pub fn to_frontmatter_block(&self) -> String {
        let mut out = String::from("permissions:\n");
        for (scope, level) in self.iter() {
            out.push_str(&format!("  {}: {}\n", scope, level));
        }
        out
    }
}

impl FromIterator<(String, PermissionLevel)> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = (String, PermissionLevel)>>(iter: I) -> Self {
        Self {
            scopes: iter.into_iter().collect(),
        }
    }
}
