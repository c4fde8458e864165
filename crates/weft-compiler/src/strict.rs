//! Strict mode resolution and structural checks.

use weft_types::{PermissionLevel, WILDCARD};

use crate::frontmatter::MainDeclarations;
use crate::{CompileError, Result};

/// The one scope that may hold `write` in strict mode (OIDC token minting).
const STRICT_WRITE_EXEMPT: &str = "id-token";

/// Effective strict mode: explicit flag, then frontmatter, then the
/// configured default, then on.
pub fn resolve_strict_mode(
    explicit: Option<bool>,
    frontmatter: Option<bool>,
    fallback: Option<bool>,
) -> bool {
    explicit.or(frontmatter).or(fallback).unwrap_or(true)
}

/// Reject main-workflow declarations that strict mode forbids.
pub fn validate_strict_mode(main: &MainDeclarations) -> Result<()> {
    if let Some(permissions) = &main.permissions {
        let writes: Vec<&str> = permissions
            .iter()
            .filter(|(scope, level)| {
                *level == PermissionLevel::Write && *scope != STRICT_WRITE_EXEMPT
            })
            .map(|(scope, _)| scope)
            .collect();
        if !writes.is_empty() {
            return Err(CompileError::Strict(format!(
                "write permission is not allowed for {}. Request `read` and use safe-outputs for writes, e.g.\n\npermissions:\n  {}: read\nsafe-outputs:\n  create-issue:",
                writes.join(", "),
                writes[0]
            )));
        }
    }

    if main.network.allowed.iter().any(|d| d == WILDCARD) {
        return Err(CompileError::Strict(format!(
            "wildcard '{}' network access is not allowed. List the domains instead, e.g.\n\nnetwork:\n  allowed: [defaults, api.example.com]",
            WILDCARD
        )));
    }

    Ok(())
}
