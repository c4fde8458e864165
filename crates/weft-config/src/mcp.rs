//! MCP server merging.

use serde_json::{Map, Value};

use crate::Result;
use crate::lines::json_objects;

/// Fold imported MCP server definitions into `top`.
///
/// Servers are keyed by name. When more than one file defines the same
/// name, the last one processed replaces the earlier definition whole.
/// Unlike safe outputs this is not a conflict.
pub fn merge_mcp_servers(top: &Map<String, Value>, imported: &str) -> Result<Map<String, Value>> {
    let mut result = top.clone();
    for servers in json_objects(imported, "mcp-servers") {
        for (name, config) in servers {
            if result.insert(name.clone(), config).is_some() {
                tracing::debug!(server = %name, "MCP server redefined by import, using later definition");
            }
        }
    }
    Ok(result)
}
