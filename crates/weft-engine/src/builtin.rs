//! Engines shipped with the compiler.

use crate::Engine;

/// GitHub Copilot CLI. The default engine.
#[derive(Debug, Default)]
pub struct CopilotEngine;

impl Engine for CopilotEngine {
    fn id(&self) -> &str {
        "copilot"
    }

    fn display_name(&self) -> &str {
        "GitHub Copilot CLI"
    }

    fn description(&self) -> &str {
        "Uses the GitHub Copilot CLI with MCP server support"
    }

    fn supports_firewall(&self) -> bool {
        true
    }

    fn enables_firewall_by_default(&self) -> bool {
        true
    }

    fn requires_firewall_in_strict(&self) -> bool {
        true
    }
}

/// Claude Code.
#[derive(Debug, Default)]
pub struct ClaudeEngine;

impl Engine for ClaudeEngine {
    fn id(&self) -> &str {
        "claude"
    }

    fn display_name(&self) -> &str {
        "Claude Code"
    }

    fn description(&self) -> &str {
        "Uses Claude Code with full MCP tool support and allow-listing"
    }

    fn supports_firewall(&self) -> bool {
        true
    }
}

/// OpenAI Codex CLI.
#[derive(Debug, Default)]
pub struct CodexEngine;

impl Engine for CodexEngine {
    fn id(&self) -> &str {
        "codex"
    }

    fn display_name(&self) -> &str {
        "Codex"
    }

    fn description(&self) -> &str {
        "Uses the OpenAI Codex CLI with MCP server support"
    }

    fn is_experimental(&self) -> bool {
        true
    }

    fn supports_firewall(&self) -> bool {
        true
    }

    fn enables_firewall_by_default(&self) -> bool {
        true
    }
}

/// User-defined steps instead of an agent CLI.
#[derive(Debug, Default)]
pub struct CustomEngine;

impl Engine for CustomEngine {
    fn id(&self) -> &str {
        "custom"
    }

    fn display_name(&self) -> &str {
        "Custom Steps"
    }

    fn description(&self) -> &str {
        "Runs user-defined steps; network access is not managed"
    }

    fn supports_network_restrictions(&self) -> bool {
        false
    }
}
