//! Compilation error types.

use thiserror::Error;
use weft_config::ConfigError;
use weft_engine::EngineError;
use weft_types::TypeError;

/// Result type for compilation.
pub type Result<T> = std::result::Result<T, CompileError>;

/// Errors that abort resolution of a single workflow.
#[derive(Debug, Error)]
pub enum CompileError {
    /// A merge or cross-fragment validation failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Engine lookup failed.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The main workflow's frontmatter could not be decoded.
    #[error("{path}: {source}")]
    InvalidFrontmatter {
        path: String,
        #[source]
        source: TypeError,
    },

    /// A frontmatter key has the wrong shape.
    #[error("{path}: `{key}` {reason}")]
    InvalidField {
        path: String,
        key: String,
        reason: String,
    },

    /// A required import or include does not exist.
    #[error(
        "import '{path}' not found (referenced by {importer}). Paths are relative to the workflow root, e.g. `imports: [shared/tools.md]`; use `@include? {path}` for optional includes"
    )]
    ImportNotFound { path: String, importer: String },

    /// An imported file could not be parsed.
    #[error("failed to parse import '{path}': {source}")]
    ImportParse {
        path: String,
        #[source]
        source: TypeError,
    },

    /// A strict-mode structural check failed.
    #[error("strict mode: {0}")]
    Strict(String),

    /// Strict mode requires the firewall for this engine.
    #[error(
        "strict mode: engine '{engine}' requires the network firewall when network access is restricted. \
         Enable it with:\n\nnetwork:\n  allowed: [defaults]\n  firewall: true\n\nor disable strict mode with `strict: false`"
    )]
    FirewallRequired { engine: String },

    /// Network restrictions configured for an engine that cannot enforce them.
    #[error(
        "engine '{engine}' does not support network restrictions, but the workflow configures `network:`. \
         Remove the network configuration or choose an engine that supports it, e.g. `engine: copilot`"
    )]
    NetworkUnsupported { engine: String },
}
