//! Permission sufficiency validation.
//!
//! Imports declare the permissions they need; the main workflow is the
//! only place permissions are granted. Every requirement an import declares
//! must be satisfied by the main workflow's grants.

use std::collections::BTreeMap;
use std::fmt;

use weft_types::{PermissionLevel, PermissionSet};

use crate::lines::json_values;
use crate::{ConfigError, Result};

/// Every permission shortfall found across all imports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionReport {
    /// Scopes the main workflow does not grant (or grants as `none`),
    /// with the level required. Sorted by scope.
    pub missing: Vec<(String, PermissionLevel)>,
    /// Scopes granted below the required level: (scope, current, required).
    /// Sorted by scope.
    pub insufficient: Vec<(String, PermissionLevel, PermissionLevel)>,
    /// The main workflow's grants raised to cover every requirement.
    pub suggested: PermissionSet,
}

impl fmt::Display for PermissionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "imported workflows require permissions that the main workflow does not grant."
        )?;
        if !self.missing.is_empty() {
            writeln!(f, "\nMissing permissions:")?;
            for (scope, required) in &self.missing {
                writeln!(f, "  - {}: {}", scope, required)?;
            }
        }
        if !self.insufficient.is_empty() {
            writeln!(f, "\nInsufficient permissions:")?;
            for (scope, current, required) in &self.insufficient {
                writeln!(f, "  - {}: has {}, requires {}", scope, current, required)?;
            }
        }
        writeln!(
            f,
            "\nAdd the required permissions to the main workflow frontmatter:\n"
        )?;
        write!(f, "{}", self.suggested.to_frontmatter_block())
    }
}

/// Check every import's declared permissions against the main workflow.
///
/// `top` is the main workflow's permission set (`None` when it declares no
/// `permissions:` key). `imported` holds one JSON permissions value per
/// line, either a scope mapping or a `read-all`/`write-all` shorthand;
/// lines that cannot be decoded are logged and skipped.
///
/// All violations are collected and reported in a single error.
pub fn validate_included_permissions(top: Option<&PermissionSet>, imported: &str) -> Result<()> {
    let empty = PermissionSet::new();
    let top = top.unwrap_or(&empty);

    let mut required: BTreeMap<String, PermissionLevel> = BTreeMap::new();
    for line in json_values(imported, "permissions") {
        let set = match PermissionSet::from_value(&line) {
            Ok(set) => set,
            Err(e) => {
                tracing::debug!(error = %e, "skipping malformed permissions import");
                continue;
            }
        };
        for (scope, level) in set.iter() {
            if level == PermissionLevel::None {
                continue;
            }
            let entry = required.entry(scope.to_string()).or_insert(level);
            if level > *entry {
                *entry = level;
            }
        }
    }

    let mut missing = Vec::new();
    let mut insufficient = Vec::new();
    for (scope, &level) in &required {
        match top.get(scope) {
            None | Some(PermissionLevel::None) => missing.push((scope.clone(), level)),
            Some(current) if !current.satisfies(level) => {
                insufficient.push((scope.clone(), current, level));
            }
            Some(_) => {}
        }
    }

    if missing.is_empty() && insufficient.is_empty() {
        return Ok(());
    }

    let mut suggested = top.clone();
    for (scope, &level) in &required {
        suggested.raise(scope, level);
    }

    Err(ConfigError::InsufficientPermissions(Box::new(
        PermissionReport {
            missing,
            insufficient,
            suggested,
        },
    )))
}

/// [`validate_included_permissions`] with the main workflow's
/// `permissions:` block given as YAML text. Blank text means no grants.
pub fn validate_included_permissions_yaml(top_yaml: &str, imported: &str) -> Result<()> {
    let top = PermissionSet::from_yaml(top_yaml).map_err(ConfigError::InvalidPermissions)?;
    validate_included_permissions(Some(&top), imported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn set(value: Value) -> PermissionSet {
        PermissionSet::from_value(&value).unwrap()
    }

    fn report(err: ConfigError) -> PermissionReport {
        match err {
            ConfigError::InsufficientPermissions(report) => *report,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_no_imports_ok() {
        assert!(validate_included_permissions(None, "").is_ok());
    }

    #[test]
    fn test_write_covers_read() {
        let top = set(json!({"issues": "write"}));
        assert!(validate_included_permissions(Some(&top), r#"{"issues": "read"}"#).is_ok());
    }

    #[test]
    fn test_missing_scope() {
        let top = set(json!({}));
        let err = validate_included_permissions(Some(&top), r#"{"contents": "write"}"#).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Missing permissions"));
        assert!(message.contains("contents: write"));

        let report = report(err);
        assert_eq!(
            report.missing,
            vec![("contents".to_string(), PermissionLevel::Write)]
        );
        assert!(report.insufficient.is_empty());
    }

    #[test]
    fn test_none_counts_as_missing() {
        let top = set(json!({"issues": "none"}));
        let err = validate_included_permissions(Some(&top), r#"{"issues": "read"}"#).unwrap_err();
        assert_eq!(
            report(err).missing,
            vec![("issues".to_string(), PermissionLevel::Read)]
        );
    }

    #[test]
    fn test_insufficient_level() {
        let top = set(json!({"issues": "read"}));
        let err = validate_included_permissions(Some(&top), r#"{"issues": "write"}"#).unwrap_err();
        assert!(err.to_string().contains("issues: has read, requires write"));
        assert_eq!(
            report(err).insufficient,
            vec![(
                "issues".to_string(),
                PermissionLevel::Read,
                PermissionLevel::Write
            )]
        );
    }

    #[test]
    fn test_all_violations_collected_and_sorted() {
        let top = set(json!({"pull-requests": "read", "contents": "read"}));
        let imported = concat!(
            r#"{"pull-requests": "write", "issues": "read"}"#,
            "\n",
            r#"{"actions": "read", "contents": "read"}"#
        );

        let report = report(validate_included_permissions(Some(&top), imported).unwrap_err());
        assert_eq!(
            report.missing,
            vec![
                ("actions".to_string(), PermissionLevel::Read),
                ("issues".to_string(), PermissionLevel::Read),
            ]
        );
        assert_eq!(report.insufficient.len(), 1);
        assert_eq!(report.insufficient[0].0, "pull-requests");
    }

    #[test]
    fn test_suggested_block_unions_requirements() {
        let top = set(json!({"contents": "read"}));
        let imported = "{\"issues\": \"read\"}\n{\"issues\": \"write\"}";

        let err = validate_included_permissions(Some(&top), imported).unwrap_err();
        assert!(
            err.to_string()
                .ends_with("permissions:\n  contents: read\n  issues: write\n")
        );
    }

    #[test]
    fn test_malformed_line_skipped() {
        let top = set(json!({"issues": "read"}));
        let imported = "{\"issues\": \"admin\"}\nnot json\n{\"issues\": \"read\"}";
        assert!(validate_included_permissions(Some(&top), imported).is_ok());
    }

    #[test]
    fn test_required_none_ignored() {
        assert!(validate_included_permissions(None, r#"{"contents": "none"}"#).is_ok());
    }

    #[test]
    fn test_shorthand_import_requires_every_scope() {
        let top = set(json!({}));
        let report = report(validate_included_permissions(Some(&top), "\"write-all\"").unwrap_err());
        assert!(report.insufficient.is_empty());
        assert!(report.missing.len() > 1);
        assert!(report.missing.iter().all(|(_, level)| *level == PermissionLevel::Write));
        assert!(report.missing.iter().any(|(scope, _)| scope == "contents"));

        let all_read = set(json!("read-all"));
        assert!(validate_included_permissions(Some(&all_read), "\"read-all\"").is_ok());
    }

    #[test]
    fn test_yaml_entry_point() {
        assert!(validate_included_permissions_yaml("issues: write\n", r#"{"issues": "read"}"#).is_ok());
        assert!(validate_included_permissions_yaml("", r#"{"contents": "read"}"#).is_err());
        assert!(matches!(
            validate_included_permissions_yaml("issues: admin\n", ""),
            Err(ConfigError::InvalidPermissions(_))
        ));
    }
}
