//! Engine registry for the weft workflow compiler.
//!
//! An engine is the agent backend a workflow runs on. The compiler only
//! needs to know which engines exist and what they support: experimental
//! status, network restriction support, and firewall behaviour.

mod builtin;
mod engine;
mod error;
mod registry;

pub use builtin::{ClaudeEngine, CodexEngine, CopilotEngine, CustomEngine};
pub use engine::{Engine, EngineInfo};
pub use error::{EngineError, Result};
pub use registry::{DEFAULT_ENGINE_ID, EngineRegistry, global};
