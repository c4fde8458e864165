//! CLI command handlers.

pub mod config;
pub mod engines;
pub mod resolve;

use std::path::PathBuf;

use weft_config::LoadedSettings;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Verbose output enabled.
    pub verbose: bool,
    /// User settings directory override.
    pub config_dir: Option<PathBuf>,
}

impl Context {
    /// Discover settings from the user and project layers, reporting
    /// unreadable layers as warnings.
    pub fn load_settings(&self) -> LoadedSettings {
        let loaded = weft_config::load_settings(None, self.config_dir.as_deref());
        for warning in &loaded.warnings {
            tracing::warn!("{}", warning);
        }
        loaded
    }
}
