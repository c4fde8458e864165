//! The engine abstraction.

use serde::Serialize;

/// An automation backend a workflow can target.
///
/// Implementations describe capabilities the compiler consults while
/// resolving configuration; they do not run anything themselves.
pub trait Engine: Send + Sync {
    /// Registry ID (`engine: <id>` in frontmatter).
    fn id(&self) -> &str;

    /// Human-readable name.
    fn display_name(&self) -> &str;

    fn description(&self) -> &str;

    /// Experimental engines compile, with a warning.
    fn is_experimental(&self) -> bool {
        false
    }

    /// Whether the engine can honour a `network:` allowlist at all.
    fn supports_network_restrictions(&self) -> bool {
        true
    }

    /// Whether the engine can run behind the egress firewall.
    fn supports_firewall(&self) -> bool {
        false
    }

    /// Turn the firewall on when the network is restricted and the workflow
    /// did not configure it.
    fn enables_firewall_by_default(&self) -> bool {
        false
    }

    /// In strict mode, a restricted network must be enforced by the firewall.
    fn requires_firewall_in_strict(&self) -> bool {
        false
    }
}

/// Serializable summary of an engine, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineInfo {
    pub id: String,
    pub display_name: String,
    pub description: String,
    pub experimental: bool,
    pub default: bool,
}

impl EngineInfo {
    pub fn of(engine: &dyn Engine, default: bool) -> Self {
        Self {
            id: engine.id().to_string(),
            display_name: engine.display_name().to_string(),
            description: engine.description().to_string(),
            experimental: engine.is_experimental(),
            default,
        }
    }
}
