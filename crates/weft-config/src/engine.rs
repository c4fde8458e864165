//! Engine declaration validation.
//!
//! A workflow runs on exactly one engine. The declaration may live in the
//! main workflow or in one import, never in more than one place.

use weft_types::{EngineConfig, EngineSpec};

use crate::{ConfigError, Result};

/// Ensure at most one engine is declared across main and imports.
///
/// Returns the declared engine ID, or `None` when nothing declares one (the
/// caller falls back to the registry default). Imported declarations are
/// JSON-encoded; a declaration that cannot be decoded is an error, never
/// skipped.
pub fn validate_single_engine_specification(
    main: Option<&EngineSpec>,
    imported: &[String],
) -> Result<Option<String>> {
    let imported: Vec<&str> = declared(imported).collect();
    let count = imported.len() + usize::from(main.is_some());

    match count {
        0 => Ok(None),
        1 => {
            if let Some(spec) = main {
                return Ok(Some(spec.id().to_string()));
            }
            let spec = EngineSpec::from_json(imported[0]).map_err(ConfigError::InvalidEngine)?;
            Ok(Some(spec.id().to_string()))
        }
        count => Err(ConfigError::MultipleEngines { count }),
    }
}

/// Decode the first imported engine declaration into its object form.
///
/// Used when the main workflow declares no engine but an import does.
pub fn extract_imported_engine_config(imported: &[String]) -> Result<Option<EngineConfig>> {
    let Some(json) = declared(imported).next() else {
        return Ok(None);
    };
    let spec = EngineSpec::from_json(json).map_err(ConfigError::InvalidEngine)?;
    Ok(Some(spec.into_config()))
}

fn declared(imported: &[String]) -> impl Iterator<Item = &str> {
    imported
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty() && *s != "null" && *s != "\"\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_none_declared() {
        assert_eq!(validate_single_engine_specification(None, &[]).unwrap(), None);
        assert_eq!(
            validate_single_engine_specification(None, &strings(&["", "null"])).unwrap(),
            None
        );
    }

    #[test]
    fn test_main_only() {
        let main = EngineSpec::Id("claude".to_string());
        assert_eq!(
            validate_single_engine_specification(Some(&main), &[]).unwrap(),
            Some("claude".to_string())
        );
    }

    #[test]
    fn test_import_string() {
        let imported = strings(&["\"codex\""]);
        assert_eq!(
            validate_single_engine_specification(None, &imported).unwrap(),
            Some("codex".to_string())
        );
    }

    #[test]
    fn test_import_object() {
        let imported = strings(&[r#"{"id": "copilot", "model": "gpt-5"}"#]);
        assert_eq!(
            validate_single_engine_specification(None, &imported).unwrap(),
            Some("copilot".to_string())
        );
    }

    #[test]
    fn test_import_object_without_id() {
        let imported = strings(&[r#"{"model": "gpt-5"}"#]);
        let err = validate_single_engine_specification(None, &imported).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEngine(_)));
    }

    #[test]
    fn test_import_non_string_id() {
        let imported = strings(&[r#"{"id": ["copilot"]}"#]);
        assert!(validate_single_engine_specification(None, &imported).is_err());
    }

    #[test]
    fn test_import_malformed_json() {
        let imported = strings(&["{\"id\": "]);
        let err = validate_single_engine_specification(None, &imported).unwrap_err();
        assert!(err.to_string().contains("malformed JSON"));
    }

    #[test]
    fn test_main_and_import_conflict() {
        let main = EngineSpec::Id("claude".to_string());
        let imported = strings(&["\"copilot\""]);
        let err = validate_single_engine_specification(Some(&main), &imported).unwrap_err();
        assert!(matches!(err, ConfigError::MultipleEngines { count: 2 }));
        assert!(err.to_string().contains("found 2 engine declarations"));
    }

    #[test]
    fn test_three_imports_count_reported() {
        let imported = strings(&["\"a\"", "\"b\"", "\"c\""]);
        let err = validate_single_engine_specification(None, &imported).unwrap_err();
        assert!(err.to_string().contains("found 3 engine declarations"));
    }

    #[test]
    fn test_extract_config() {
        let imported = strings(&["", r#"{"id": "copilot", "model": "gpt-5"}"#]);
        let config = extract_imported_engine_config(&imported).unwrap().unwrap();
        assert_eq!(config.id, "copilot");
        assert_eq!(config.model.as_deref(), Some("gpt-5"));

        assert!(extract_imported_engine_config(&[]).unwrap().is_none());
    }
}
