//! Engine registry.
//!
//! The process-wide registry is built once on first access and is
//! read-only afterwards. Tests and embedders can build their own
//! [`EngineRegistry`] instead.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use crate::builtin::{ClaudeEngine, CodexEngine, CopilotEngine, CustomEngine};
use crate::{Engine, EngineError, EngineInfo, Result};

/// ID of the engine used when a workflow declares none.
pub const DEFAULT_ENGINE_ID: &str = "copilot";

/// Registered engines keyed by ID.
pub struct EngineRegistry {
    engines: HashMap<String, Arc<dyn Engine>>,
    default_id: String,
}

impl std::fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineRegistry")
            .field("engines", &self.engine_ids())
            .field("default_id", &self.default_id)
            .finish()
    }
}

impl EngineRegistry {
    /// Create an empty registry whose default is `default_id`.
    pub fn new(default_id: impl Into<String>) -> Self {
        Self {
            engines: HashMap::new(),
            default_id: default_id.into(),
        }
    }

    /// A registry holding the built-in engines.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new(DEFAULT_ENGINE_ID);
        registry.register(CopilotEngine);
        registry.register(ClaudeEngine);
        registry.register(CodexEngine);
        registry.register(CustomEngine);
        registry
    }

    /// Register an engine, replacing any engine with the same ID.
    pub fn register<E: Engine + 'static>(&mut self, engine: E) {
        self.register_arc(Arc::new(engine));
    }

    pub fn register_arc(&mut self, engine: Arc<dyn Engine>) {
        self.engines.insert(engine.id().to_string(), engine);
    }

    pub fn is_valid_engine(&self, id: &str) -> bool {
        self.engines.contains_key(id)
    }

    /// Look up an engine by exact ID.
    pub fn get_engine(&self, id: &str) -> Result<Arc<dyn Engine>> {
        self.engines
            .get(id)
            .cloned()
            .ok_or_else(|| self.unknown(id))
    }

    /// Look up an engine whose ID prefixes `id`.
    ///
    /// Keeps versioned or variant IDs (`codex-experimental`) working. When
    /// several IDs match, the longest one wins.
    pub fn get_engine_by_prefix(&self, id: &str) -> Result<Arc<dyn Engine>> {
        self.engines
            .iter()
            .filter(|(engine_id, _)| id.starts_with(engine_id.as_str()))
            .max_by_key(|(engine_id, _)| engine_id.len())
            .map(|(_, engine)| Arc::clone(engine))
            .ok_or_else(|| self.unknown(id))
    }

    pub fn default_engine(&self) -> Result<Arc<dyn Engine>> {
        self.engines
            .get(&self.default_id)
            .cloned()
            .ok_or_else(|| EngineError::MissingDefault(self.default_id.clone()))
    }

    pub fn default_engine_id(&self) -> &str {
        &self.default_id
    }

    /// Registered IDs, sorted.
    pub fn engine_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.engines.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Summaries of every registered engine, sorted by ID.
    pub fn describe(&self) -> Vec<EngineInfo> {
        self.engine_ids()
            .iter()
            .filter_map(|id| self.engines.get(id))
            .map(|engine| EngineInfo::of(engine.as_ref(), engine.id() == self.default_id))
            .collect()
    }

    fn unknown(&self, id: &str) -> EngineError {
        EngineError::UnknownEngine {
            id: id.to_string(),
            valid: self.engine_ids().join(", "),
        }
    }
}

/// The process-wide registry of built-in engines.
pub fn global() -> &'static EngineRegistry {
    static REGISTRY: OnceLock<EngineRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let registry = EngineRegistry::with_builtins();
        tracing::debug!(engines = ?registry.engine_ids(), "engine registry initialized");
        registry
    })
}
