//! Workflow documents and importable fragments.
//!
//! Both are markdown files with optional YAML frontmatter:
//!
//! ```markdown
//! ---
//! imports:
//!   - shared/github-tools.md
//! tools:
//!   github:
//!     allowed: [get_issue]
//! ---
//!
//! # Triage
//!
//! @include shared/house-rules.md
//! ```

use serde_json::{Map, Value};

use crate::{Result, TypeError};

/// A parsed markdown file: frontmatter mapping plus body.
#[derive(Debug, Clone, Default)]
pub struct WorkflowDocument {
    pub path: String,
    pub frontmatter: Map<String, Value>,
    pub body: String,
}

/// An `@include` / `{{#import}}` directive found in a markdown body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeDirective {
    pub path: String,
    /// `@include?` / `{{#import?}}`: skip silently when the target is missing.
    pub optional: bool,
}

impl WorkflowDocument {
    /// Parse markdown content. A file without a leading `---` has an empty
    /// frontmatter.
    pub fn parse(path: &str, content: &str) -> Result<Self> {
        let (frontmatter_str, body) = split_frontmatter(path, content)?;

        let frontmatter = if frontmatter_str.trim().is_empty() {
            Map::new()
        } else {
            let value: Value = serde_yaml::from_str(&frontmatter_str).map_err(|e| {
                TypeError::Frontmatter {
                    path: path.to_string(),
                    message: e.to_string(),
                }
            })?;
            match value {
                Value::Object(map) => map,
                Value::Null => Map::new(),
                other => {
                    return Err(TypeError::Frontmatter {
                        path: path.to_string(),
                        message: format!("frontmatter must be a mapping, got {}", other),
                    });
                }
            }
        };

        Ok(Self {
            path: path.to_string(),
            frontmatter,
            body,
        })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.frontmatter.get(key).filter(|v| !v.is_null())
    }

    /// Paths listed under `imports:`.
    ///
    /// Entries may be plain strings or `{ path: ... }` mappings.
    pub fn imports(&self) -> Vec<String> {
        let Some(Value::Array(items)) = self.get("imports") else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Object(map) => map
                    .get("path")
                    .and_then(Value::as_str)
                    .map(|s| s.trim().to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Include directives in the body, in document order. Lines inside
    /// fenced code blocks are ignored.
    pub fn includes(&self) -> Vec<IncludeDirective> {
        let mut directives = Vec::new();
        let mut in_fence = false;
        for line in self.body.lines() {
            let trimmed = line.trim();
            if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
                in_fence = !in_fence;
                continue;
            }
            if in_fence {
                continue;
            }
            if let Some(directive) = parse_include(trimmed) {
                directives.push(directive);
            }
        }
        directives
    }
}

fn parse_include(line: &str) -> Option<IncludeDirective> {
    let (rest, optional) = if let Some(rest) = line.strip_prefix("@include?") {
        (rest, true)
    } else if let Some(rest) = line.strip_prefix("@include") {
        (rest, false)
    } else if let Some(rest) = line
        .strip_prefix("{{#import?")
        .and_then(|r| r.strip_suffix("}}"))
    {
        (rest, true)
    } else if let Some(rest) = line
        .strip_prefix("{{#import")
        .and_then(|r| r.strip_suffix("}}"))
    {
        (rest, false)
    } else {
        return None;
    };

    // `@includes` and friends are prose, not directives.
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let path = rest.trim();
    if path.is_empty() {
        return None;
    }
    Some(IncludeDirective {
        path: path.to_string(),
        optional,
    })
}

/// Split markdown content into frontmatter and body.
fn split_frontmatter(path: &str, content: &str) -> Result<(String, String)> {
    let trimmed = content.trim_start();

    if !trimmed.starts_with("---") {
        return Ok((String::new(), content.to_string()));
    }

    let after_first = &trimmed[3..];
    let close_pos = after_first
        .find("\n---")
        .ok_or_else(|| TypeError::Frontmatter {
            path: path.to_string(),
            message: "no closing --- delimiter found".to_string(),
        })?;

    let frontmatter = after_first[..close_pos].trim().to_string();
    let body = after_first[close_pos + 4..].trim().to_string();

    Ok((frontmatter, body))
}

/// One file's configuration contribution, as seen by the merge engine.
///
/// Values stay as raw JSON: each domain merger decides how to interpret
/// (or skip) them.
#[derive(Debug, Clone, Default)]
pub struct Fragment {
    pub path: String,
    pub imports: Vec<String>,
    pub includes: Vec<IncludeDirective>,
    pub engine: Option<Value>,
    pub tools: Option<Value>,
    pub mcp_servers: Option<Value>,
    pub network: Option<Value>,
    pub permissions: Option<Value>,
    pub safe_outputs: Option<Value>,
    pub features: Option<Map<String, Value>>,
}

impl Fragment {
    pub fn parse(path: &str, content: &str) -> Result<Self> {
        Ok(Self::from_document(&WorkflowDocument::parse(path, content)?))
    }

    pub fn from_document(doc: &WorkflowDocument) -> Self {
        Self {
            path: doc.path.clone(),
            imports: doc.imports(),
            includes: doc.includes(),
            engine: doc.get("engine").cloned(),
            tools: doc.get("tools").cloned(),
            mcp_servers: doc.get("mcp-servers").cloned(),
            network: doc.get("network").cloned(),
            permissions: doc.get("permissions").cloned(),
            safe_outputs: doc.get("safe-outputs").cloned(),
            features: doc.get("features").and_then(Value::as_object).cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const WORKFLOW: &str = r#"---
engine: claude
imports:
  - shared/tools.md
  - path: shared/network.md
tools:
  github:
    allowed: [get_issue]
---

# Triage

@include shared/rules.md
@include? shared/optional.md
{{#import shared/more.md}}

```
@include not/a/directive.md
```

We @include nothing here.
"#;

    #[test]
    fn test_parse_frontmatter_and_body() {
        let doc = WorkflowDocument::parse("triage.md", WORKFLOW).unwrap();
        assert_eq!(doc.get("engine"), Some(&json!("claude")));
        assert!(doc.body.starts_with("# Triage"));
    }

    #[test]
    fn test_imports_accept_strings_and_mappings() {
        let doc = WorkflowDocument::parse("triage.md", WORKFLOW).unwrap();
        assert_eq!(doc.imports(), vec!["shared/tools.md", "shared/network.md"]);
    }

    #[test]
    fn test_includes_skip_code_fences() {
        let doc = WorkflowDocument::parse("triage.md", WORKFLOW).unwrap();
        let includes = doc.includes();
        assert_eq!(
            includes,
            vec![
                IncludeDirective {
                    path: "shared/rules.md".to_string(),
                    optional: false
                },
                IncludeDirective {
                    path: "shared/optional.md".to_string(),
                    optional: true
                },
                IncludeDirective {
                    path: "shared/more.md".to_string(),
                    optional: false
                },
            ]
        );
    }

    #[test]
    fn test_no_frontmatter() {
        let doc = WorkflowDocument::parse("plain.md", "# Just markdown\n").unwrap();
        assert!(doc.frontmatter.is_empty());
        assert_eq!(doc.body, "# Just markdown\n");
    }

    #[test]
    fn test_unclosed_frontmatter() {
        let err = WorkflowDocument::parse("bad.md", "---\nengine: claude\n").unwrap_err();
        assert!(matches!(err, TypeError::Frontmatter { ref path, .. } if path == "bad.md"));
    }

    #[test]
    fn test_non_mapping_frontmatter() {
        let err = WorkflowDocument::parse("bad.md", "---\n- a\n- b\n---\nbody").unwrap_err();
        assert!(err.to_string().contains("must be a mapping"));
    }

    #[test]
    fn test_fragment_domains() {
        let fragment = Fragment::parse(
            "shared/tools.md",
            "---\nmcp-servers:\n  notion:\n    url: https://mcp.notion.com\nfeatures:\n  beta: true\n---\n",
        )
        .unwrap();
        assert!(fragment.mcp_servers.is_some());
        assert_eq!(
            fragment.features.unwrap().get("beta"),
            Some(&json!(true))
        );
        assert!(fragment.engine.is_none());
    }
}
