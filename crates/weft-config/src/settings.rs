//! Compiler settings discovery and layered merging.
//!
//! Resolution order (later overrides earlier):
//! 1. `~/.config/weft/config.toml` (or `$WEFT_CONFIG_DIR/config.toml`)
//! 2. `./weft.toml` (project-local)
//! 3. CLI arguments (handled by the binary)
//!
//! ```toml
//! [compiler]
//! strict = false
//! engine = "claude"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

/// Project-local settings filename.
const PROJECT_SETTINGS_FILE: &str = "weft.toml";

/// Settings filename within the user config directory.
const USER_SETTINGS_FILE: &str = "config.toml";

const APP_NAME: &str = "weft";

/// Environment variable overriding the user config directory.
const CONFIG_DIR_ENV: &str = "WEFT_CONFIG_DIR";

/// Root settings structure. Every section is optional so partial files merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerSettings {
    pub compiler: CompilerSection,
}

/// The `[compiler]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerSection {
    /// Strict mode used when the command line does not say otherwise.
    pub strict: Option<bool>,
    /// Engine override applied to every compiled workflow.
    pub engine: Option<String>,
}

impl CompilerSettings {
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Merge another layer on top of this one (other takes priority).
    pub fn merge(&mut self, other: CompilerSettings) {
        if other.compiler.strict.is_some() {
            self.compiler.strict = other.compiler.strict;
        }
        if other.compiler.engine.is_some() {
            self.compiler.engine = other.compiler.engine;
        }
    }
}

/// Tracks where each settings layer was loaded from.
#[derive(Debug, Clone)]
pub struct SettingsSource {
    pub path: PathBuf,
    /// Whether the file was found and loaded.
    pub loaded: bool,
}

/// Result of settings discovery.
#[derive(Debug, Clone)]
pub struct LoadedSettings {
    pub settings: CompilerSettings,
    /// Sources checked, lowest precedence first.
    pub sources: Vec<SettingsSource>,
    /// Layers that existed but could not be loaded.
    pub warnings: Vec<String>,
}

impl LoadedSettings {
    pub fn loaded_from(&self) -> Vec<&Path> {
        self.sources
            .iter()
            .filter(|s| s.loaded)
            .map(|s| s.path.as_path())
            .collect()
    }
}

/// Discover and merge settings layers.
///
/// `config_dir` overrides both `WEFT_CONFIG_DIR` and the platform default.
/// `project_dir` defaults to the current directory.
pub fn load_settings(project_dir: Option<&Path>, config_dir: Option<&Path>) -> LoadedSettings {
    let mut settings = CompilerSettings::default();
    let mut sources = Vec::new();
    let mut warnings = Vec::new();

    let user_path = match config_dir {
        Some(dir) => Some(dir.join(USER_SETTINGS_FILE)),
        None => user_settings_path(),
    };
    if let Some(path) = user_path {
        sources.push(load_layer(&mut settings, &path, &mut warnings));
    }

    let project_path = project_dir
        .map(|d| d.join(PROJECT_SETTINGS_FILE))
        .unwrap_or_else(|| PathBuf::from(PROJECT_SETTINGS_FILE));
    sources.push(load_layer(&mut settings, &project_path, &mut warnings));

    LoadedSettings {
        settings,
        sources,
        warnings,
    }
}

/// Load settings from a specific file (no discovery, errors are returned).
pub fn load_settings_file(path: &Path) -> Result<CompilerSettings> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    CompilerSettings::from_toml(&contents)
}

/// Path of the user-level settings file.
pub fn user_settings_path() -> Option<PathBuf> {
    user_config_dir().map(|d| d.join(USER_SETTINGS_FILE))
}

/// The user config directory: `WEFT_CONFIG_DIR`, else the platform default.
pub fn user_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

fn load_layer(
    settings: &mut CompilerSettings,
    path: &Path,
    warnings: &mut Vec<String>,
) -> SettingsSource {
    if !path.is_file() {
        return SettingsSource {
            path: path.to_path_buf(),
            loaded: false,
        };
    }

    match load_settings_file(path) {
        Ok(layer) => {
            tracing::debug!(path = %path.display(), "loaded settings layer");
            settings.merge(layer);
            SettingsSource {
                path: path.to_path_buf(),
                loaded: true,
            }
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings file");
            warnings.push(format!("Failed to load {}: {}", path.display(), e));
            SettingsSource {
                path: path.to_path_buf(),
                loaded: false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse() {
        let settings = CompilerSettings::from_toml(
            r#"
[compiler]
strict = false
engine = "claude"
"#,
        )
        .unwrap();
        assert_eq!(settings.compiler.strict, Some(false));
        assert_eq!(settings.compiler.engine.as_deref(), Some("claude"));
    }

    #[test]
    fn test_empty_is_default() {
        assert_eq!(
            CompilerSettings::from_toml("").unwrap(),
            CompilerSettings::default()
        );
    }

    #[test]
    fn test_merge_override() {
        let mut base = CompilerSettings::from_toml("[compiler]\nstrict = true\nengine = \"copilot\"")
            .unwrap();
        let over = CompilerSettings::from_toml("[compiler]\nengine = \"codex\"").unwrap();
        base.merge(over);
        assert_eq!(base.compiler.strict, Some(true));
        assert_eq!(base.compiler.engine.as_deref(), Some("codex"));
    }

    #[test]
    fn test_layers_project_wins() {
        let user = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        std::fs::write(
            user.path().join("config.toml"),
            "[compiler]\nstrict = false\nengine = \"claude\"\n",
        )
        .unwrap();
        std::fs::write(project.path().join("weft.toml"), "[compiler]\nengine = \"codex\"\n")
            .unwrap();

        let loaded = load_settings(Some(project.path()), Some(user.path()));
        assert_eq!(loaded.settings.compiler.strict, Some(false));
        assert_eq!(loaded.settings.compiler.engine.as_deref(), Some("codex"));
        assert_eq!(loaded.loaded_from().len(), 2);
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn test_missing_files_skipped() {
        let empty = TempDir::new().unwrap();
        let loaded = load_settings(Some(empty.path()), Some(empty.path()));
        assert_eq!(loaded.settings, CompilerSettings::default());
        assert!(loaded.loaded_from().is_empty());
    }

    #[test]
    fn test_invalid_layer_becomes_warning() {
        let project = TempDir::new().unwrap();
        let config = TempDir::new().unwrap();
        std::fs::write(project.path().join("weft.toml"), "[compiler\nstrict = ").unwrap();

        let loaded = load_settings(Some(project.path()), Some(config.path()));
        assert_eq!(loaded.warnings.len(), 1);
        assert!(loaded.loaded_from().is_empty());
    }

    #[test]
    fn test_load_file_errors() {
        let err = load_settings_file(Path::new("/nonexistent/weft.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }
}
