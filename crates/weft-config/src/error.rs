//! Merge and validation error types.

use crate::permissions::PermissionReport;

/// Result type alias for merge operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while reconciling a workflow with its imports.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Two tool declarations have shapes that cannot be combined.
    #[error(
        "cannot merge tool configuration at '{path}': {reason}. Declare the tool with the same shape (list or mapping) in every file"
    )]
    ToolMerge { path: String, reason: String },

    /// The same safe-output type is defined by more than one import.
    #[error(
        "safe output '{key}' is defined in multiple imports (import #{first} and import #{second}). \
         A safe output type may be defined in at most one import. Remove it from all but one import, \
         or define it in the main workflow to override the imports, e.g.:\n\nsafe-outputs:\n  {key}:\n    max: 1"
    )]
    SafeOutputConflict {
        key: String,
        first: usize,
        second: usize,
    },

    /// Imports require permissions the main workflow does not grant.
    #[error("{0}")]
    InsufficientPermissions(Box<PermissionReport>),

    /// More than one file declares `engine:`.
    #[error(
        "found {count} engine declarations across the main workflow and its imports, but only one is allowed. \
         Keep exactly one `engine:` field, either in the main workflow or in a single import, e.g.:\n\nengine: copilot"
    )]
    MultipleEngines { count: usize },

    /// An engine declaration could not be decoded.
    #[error("invalid engine declaration: {0}")]
    InvalidEngine(#[source] weft_types::TypeError),

    /// The main workflow's own permissions could not be decoded.
    #[error("invalid permissions in main workflow: {0}")]
    InvalidPermissions(#[source] weft_types::TypeError),

    /// Failed to read a settings file.
    #[error("failed to read settings file '{path}': {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    /// The embedded safe-outputs schema is unusable.
    #[error("safe-outputs schema error: {0}")]
    Schema(String),
}
