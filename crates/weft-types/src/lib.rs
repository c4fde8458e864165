//! Shared types for the weft workflow compiler.
//!
//! These are the typed forms of the frontmatter sections the merge engine
//! reconciles: permissions, network policy, sandbox, engine declarations,
//! plus the markdown document and fragment containers they come from.

pub mod engine;
pub mod error;
pub mod fragment;
pub mod network;
pub mod permissions;
pub mod sandbox;

pub use engine::{EngineConfig, EngineSpec};
pub use error::{Result, TypeError};
pub use fragment::{Fragment, IncludeDirective, WorkflowDocument};
pub use network::{DEFAULT_NETWORK, FirewallConfig, NetworkPermissions, WILDCARD};
pub use permissions::{KNOWN_SCOPES, PermissionLevel, PermissionSet};
pub use sandbox::{SandboxAgent, SandboxConfig};
