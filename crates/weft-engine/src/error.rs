//! Engine registry errors.

use thiserror::Error;

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The requested engine is not registered.
    #[error("invalid engine: '{id}'. Valid engines are: {valid}. Example: `engine: copilot`")]
    UnknownEngine { id: String, valid: String },

    /// The configured default engine is not registered.
    #[error("default engine '{0}' is not registered")]
    MissingDefault(String),
}
