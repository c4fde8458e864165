//! Configuration resolution and merge engine for weft workflows.
//!
//! Folds a main workflow's declarations together with the fragments it
//! imports into one consistent configuration:
//! - Tools: list union per tool (structural mismatches are errors)
//! - MCP servers: last definition of a name wins
//! - Network: sorted, deduplicated union of allowed domains
//! - Features: main wins, then first import
//! - Safe outputs: main wins; the same type in two imports is an error
//! - Permissions: imports may only require what main grants
//! - Engine: declared in at most one place
//!
//! Imported contributions arrive as newline-delimited JSON (one object per
//! import). Malformed lines are skipped for every domain except engines.
//!
//! Compiler settings (`weft.toml`) discovery also lives here.

pub mod engine;
pub mod error;
pub mod features;
mod lines;
pub mod mcp;
pub mod network;
pub mod permissions;
pub mod safe_outputs;
pub mod settings;
pub mod tools;

pub use engine::{extract_imported_engine_config, validate_single_engine_specification};
pub use error::{ConfigError, Result};
pub use features::merge_features;
pub use mcp::merge_mcp_servers;
pub use network::merge_network_permissions;
pub use permissions::{
    PermissionReport, validate_included_permissions, validate_included_permissions_yaml,
};
pub use safe_outputs::{SafeOutputsConfig, merge_safe_outputs, safe_output_type_keys};
pub use settings::{
    CompilerSection, CompilerSettings, LoadedSettings, SettingsSource, load_settings,
    load_settings_file, user_config_dir, user_settings_path,
};
pub use tools::{merge_tool_values, merge_tools};
