//! Resolve command - merge a workflow with its imports.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use serde::Deserialize;

use weft_compiler::{CompileOptions, Compiler, MemorySource};

use super::Context;

/// Arguments for the resolve command.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// YAML bundle holding the main workflow and the fragments it imports
    pub bundle: PathBuf,

    /// Force strict mode on
    #[arg(long, conflicts_with = "no_strict")]
    pub strict: bool,

    /// Force strict mode off
    #[arg(long)]
    pub no_strict: bool,

    /// Engine to use regardless of what the workflow declares
    #[arg(long)]
    pub engine: Option<String>,
}

impl ResolveArgs {
    fn strict_flag(&self) -> Option<bool> {
        match (self.strict, self.no_strict) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

/// A main workflow plus in-memory fragments.
///
/// ```yaml
/// main:
///   path: triage.md
///   content: |
///     ---
///     imports: [shared/tools.md]
///     ---
/// fragments:
///   shared/tools.md: |
///     ---
///     tools:
///       github:
///     ---
/// ```
#[derive(Debug, Deserialize)]
pub struct Bundle {
    pub main: BundleFile,
    #[serde(default)]
    pub fragments: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct BundleFile {
    pub path: String,
    pub content: String,
}

impl Bundle {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// Run the resolve command.
pub fn run(args: ResolveArgs, ctx: &Context) -> Result<()> {
    let contents = std::fs::read_to_string(&args.bundle)
        .with_context(|| format!("failed to read bundle {}", args.bundle.display()))?;
    let bundle = Bundle::from_yaml(&contents)
        .with_context(|| format!("invalid bundle {}", args.bundle.display()))?;

    let settings = ctx.load_settings().settings.compiler;
    let options = CompileOptions {
        strict: args.strict_flag(),
        default_strict: settings.strict,
        engine_override: args.engine.clone().or(settings.engine),
    };
    tracing::debug!(?options, fragments = bundle.fragments.len(), "resolving bundle");

    let source: MemorySource = bundle.fragments.into_iter().collect();
    let mut compiler = Compiler::new(source).with_options(options);
    let resolved = compiler
        .resolve_markdown(&bundle.main.path, &bundle.main.content)
        .with_context(|| format!("failed to resolve {}", bundle.main.path))?;

    println!("{}", serde_json::to_string_pretty(&resolved)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_parse() {
        let bundle = Bundle::from_yaml(
            r#"
main:
  path: triage.md
  content: |
    ---
    engine: claude
    ---
fragments:
  shared/a.md: "---\ntools:\n  bash:\n---\n"
"#,
        )
        .unwrap();
        assert_eq!(bundle.main.path, "triage.md");
        assert!(bundle.main.content.contains("engine: claude"));
        assert_eq!(bundle.fragments.len(), 1);
    }

    #[test]
    fn test_bundle_fragments_optional() {
        let bundle = Bundle::from_yaml("main:\n  path: a.md\n  content: ''\n").unwrap();
        assert!(bundle.fragments.is_empty());
    }

    #[test]
    fn test_bundle_requires_main() {
        assert!(Bundle::from_yaml("fragments: {}\n").is_err());
    }
}
