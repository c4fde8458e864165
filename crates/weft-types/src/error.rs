//! Error types for the shared weft data model.

use thiserror::Error;

/// Result type alias using the weft type error.
pub type Result<T> = std::result::Result<T, TypeError>;

/// Errors raised while decoding frontmatter values into typed configuration.
#[derive(Debug, Error)]
pub enum TypeError {
    #[error(
        "invalid permission level '{level}' for scope '{scope}': expected one of none, read, write"
    )]
    InvalidPermissionLevel { scope: String, level: String },

    #[error(
        "invalid permissions value: {0}. Expected a mapping like `contents: read` or one of `read-all`, `write-all`"
    )]
    InvalidPermissions(String),

    #[error("invalid engine specification: {0}")]
    InvalidEngine(String),

    #[error("invalid network configuration: {0}")]
    InvalidNetwork(String),

    #[error("invalid sandbox configuration: {0}")]
    InvalidSandbox(String),

    #[error("invalid frontmatter in '{path}': {message}")]
    Frontmatter { path: String, message: String },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
