//! Import graph resolution.
//!
//! Fragments are loaded through a [`FragmentSource`] and memoized in an
//! [`ImportCache`] keyed by path, so a compiler reused across many workflows
//! parses each shared fragment once.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use serde_json::{Map, Value};
use weft_types::{Fragment, IncludeDirective, TypeError};

use crate::{CompileError, Result};

/// Loads fragments by path.
pub trait FragmentSource {
    /// Load the fragment at `path`, or `Ok(None)` if nothing exists there.
    fn load(&self, path: &str) -> std::result::Result<Option<Fragment>, TypeError>;
}

/// Fragments served from memory, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a markdown file.
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.files.insert(normalize_path(&path.into()), content.into());
    }

    pub fn with(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FromIterator<(String, String)> for MemorySource {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut source = Self::new();
        for (path, content) in iter {
            source.insert(path, content);
        }
        source
    }
}

impl FragmentSource for MemorySource {
    fn load(&self, path: &str) -> std::result::Result<Option<Fragment>, TypeError> {
        self.files
            .get(path)
            .map(|content| Fragment::parse(path, content))
            .transpose()
    }
}

/// Parsed fragments keyed by normalized path.
#[derive(Debug, Default)]
pub struct ImportCache {
    fragments: HashMap<String, Arc<Fragment>>,
}

impl ImportCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached fragment for `path`, loading it on a miss.
    ///
    /// Misses that find nothing are not cached.
    pub fn get_or_load(
        &mut self,
        source: &dyn FragmentSource,
        path: &str,
    ) -> Result<Option<Arc<Fragment>>> {
        if let Some(fragment) = self.fragments.get(path) {
            tracing::trace!(path = %path, "import cache hit");
            return Ok(Some(Arc::clone(fragment)));
        }

        let Some(fragment) = source.load(path).map_err(|e| CompileError::ImportParse {
            path: path.to_string(),
            source: e,
        })?
        else {
            return Ok(None);
        };

        tracing::debug!(path = %path, "loaded import");
        let fragment = Arc::new(fragment);
        self.fragments.insert(path.to_string(), Arc::clone(&fragment));
        Ok(Some(fragment))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.fragments.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn clear(&mut self) {
        self.fragments.clear();
    }
}

/// Everything the imports of one workflow contribute, per domain.
///
/// The line-oriented fields hold one JSON object per contributing import,
/// in visit order, which is the shape the mergers in `weft-config` consume.
#[derive(Debug, Clone, Default)]
pub struct ResolvedImports {
    /// Visited import paths in breadth-first order.
    pub imported_files: Vec<String>,
    pub merged_tools: String,
    pub merged_mcp_servers: String,
    pub merged_network: String,
    pub merged_permissions: String,
    /// One JSON-encoded engine declaration per import that has one.
    pub merged_engines: Vec<String>,
    /// One JSON object per import that declares `safe-outputs`.
    pub merged_safe_outputs: Vec<String>,
    pub merged_features: Vec<Map<String, Value>>,
}

impl ResolvedImports {
    fn absorb(&mut self, fragment: &Fragment) {
        self.imported_files.push(fragment.path.clone());
        push_line(&mut self.merged_tools, fragment.tools.as_ref());
        push_line(&mut self.merged_mcp_servers, fragment.mcp_servers.as_ref());
        push_line(&mut self.merged_network, fragment.network.as_ref());
        push_line(&mut self.merged_permissions, fragment.permissions.as_ref());
        if let Some(engine) = &fragment.engine {
            self.merged_engines.push(engine.to_string());
        }
        if let Some(safe_outputs) = &fragment.safe_outputs {
            self.merged_safe_outputs.push(safe_outputs.to_string());
        }
        if let Some(features) = &fragment.features
            && !features.is_empty()
        {
            self.merged_features.push(features.clone());
        }
    }
}

/// Engine declarations found by following body include directives.
#[derive(Debug, Clone, Default)]
pub struct IncludeExpansion {
    /// Included paths in depth-first order.
    pub included_files: Vec<String>,
    pub engines: Vec<String>,
}

/// Resolve `imports` of the workflow at `main_path` breadth-first.
///
/// Nested `imports:` are followed transitively and every path is visited at
/// most once, so cycles terminate. A missing import is an error naming the
/// file that referenced it.
pub fn resolve_imports(
    main_path: &str,
    imports: &[String],
    source: &dyn FragmentSource,
    cache: &mut ImportCache,
) -> Result<ResolvedImports> {
    let mut resolved = ResolvedImports::default();
    let mut visited: HashSet<String> = HashSet::from([normalize_path(main_path)]);
    let mut queue: VecDeque<(String, String)> = imports
        .iter()
        .map(|path| (normalize_path(path), main_path.to_string()))
        .collect();

    while let Some((path, importer)) = queue.pop_front() {
        if !visited.insert(path.clone()) {
            continue;
        }
        let fragment = cache
            .get_or_load(source, &path)?
            .ok_or_else(|| CompileError::ImportNotFound {
                path: path.clone(),
                importer: importer.clone(),
            })?;

        resolved.absorb(&fragment);
        queue.extend(
            fragment
                .imports
                .iter()
                .map(|nested| (normalize_path(nested), path.clone())),
        );
    }

    tracing::debug!(
        workflow = %main_path,
        imports = resolved.imported_files.len(),
        "resolved import graph"
    );
    Ok(resolved)
}

/// Follow include directives depth-first, collecting engine declarations.
///
/// Optional includes that cannot be found are skipped; required ones are an
/// error.
pub fn expand_includes(
    main_path: &str,
    includes: &[IncludeDirective],
    source: &dyn FragmentSource,
    cache: &mut ImportCache,
) -> Result<IncludeExpansion> {
    let mut expansion = IncludeExpansion::default();
    let mut visited: HashSet<String> = HashSet::from([normalize_path(main_path)]);
    expand_into(main_path, includes, source, cache, &mut visited, &mut expansion)?;
    Ok(expansion)
}

fn expand_into(
    importer: &str,
    includes: &[IncludeDirective],
    source: &dyn FragmentSource,
    cache: &mut ImportCache,
    visited: &mut HashSet<String>,
    expansion: &mut IncludeExpansion,
) -> Result<()> {
    for directive in includes {
        let path = normalize_path(&directive.path);
        if !visited.insert(path.clone()) {
            continue;
        }
        let Some(fragment) = cache.get_or_load(source, &path)? else {
            if directive.optional {
                tracing::debug!(path = %path, "optional include not found, skipping");
                continue;
            }
            return Err(CompileError::ImportNotFound {
                path,
                importer: importer.to_string(),
            });
        };

        expansion.included_files.push(path.clone());
        if let Some(engine) = &fragment.engine {
            expansion.engines.push(engine.to_string());
        }
        expand_into(&path, &fragment.includes, source, cache, visited, expansion)?;
    }
    Ok(())
}

/// Strip leading `./` segments and surrounding whitespace.
pub fn normalize_path(path: &str) -> String {
    let mut path = path.trim();
    while let Some(rest) = path.strip_prefix("./") {
        path = rest;
    }
    path.to_string()
}

fn push_line(buf: &mut String, value: Option<&Value>) {
    let Some(value) = value else {
        return;
    };
    buf.push_str(&value.to_string());
    buf.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingSource {
        inner: MemorySource,
        loads: Cell<usize>,
    }

    impl FragmentSource for CountingSource {
        fn load(&self, path: &str) -> std::result::Result<Option<Fragment>, TypeError> {
            self.loads.set(self.loads.get() + 1);
            self.inner.load(path)
        }
    }

    fn source() -> MemorySource {
        MemorySource::new()
            .with(
                "shared/a.md",
                "---\nimports: [shared/b.md]\ntools:\n  github:\n    allowed: [get_issue]\n---\n",
            )
            .with(
                "shared/b.md",
                "---\nimports: [shared/a.md]\nnetwork:\n  allowed: [example.com]\nengine: claude\n---\n",
            )
            .with("shared/c.md", "---\nfeatures:\n  fast-path: true\n---\n")
    }

    #[test]
    fn test_breadth_first_order() {
        let mut cache = ImportCache::new();
        let imports = vec!["shared/a.md".to_string(), "./shared/c.md".to_string()];
        let resolved = resolve_imports("main.md", &imports, &source(), &mut cache).unwrap();

        assert_eq!(
            resolved.imported_files,
            vec!["shared/a.md", "shared/c.md", "shared/b.md"]
        );
        assert_eq!(resolved.merged_tools.lines().count(), 1);
        assert_eq!(resolved.merged_network.lines().count(), 1);
        assert_eq!(resolved.merged_engines, vec!["\"claude\""]);
        assert_eq!(resolved.merged_features.len(), 1);
    }

    #[test]
    fn test_cycle_terminates() {
        let mut cache = ImportCache::new();
        let resolved =
            resolve_imports("main.md", &["shared/a.md".to_string()], &source(), &mut cache)
                .unwrap();
        assert_eq!(resolved.imported_files, vec!["shared/a.md", "shared/b.md"]);
    }

    #[test]
    fn test_missing_import_names_importer() {
        let mut cache = ImportCache::new();
        let source = MemorySource::new().with("shared/a.md", "---\nimports: [shared/gone.md]\n---\n");
        let err = resolve_imports("main.md", &["shared/a.md".to_string()], &source, &mut cache)
            .unwrap_err();
        assert!(matches!(
            err,
            CompileError::ImportNotFound { ref path, ref importer }
                if path == "shared/gone.md" && importer == "shared/a.md"
        ));
    }

    #[test]
    fn test_unparsable_import() {
        let mut cache = ImportCache::new();
        let source = MemorySource::new().with("bad.md", "---\ntools: [\n");
        let err =
            resolve_imports("main.md", &["bad.md".to_string()], &source, &mut cache).unwrap_err();
        assert!(matches!(err, CompileError::ImportParse { .. }));
    }

    #[test]
    fn test_cache_reused() {
        let counting = CountingSource {
            inner: source(),
            loads: Cell::new(0),
        };
        let mut cache = ImportCache::new();
        let imports = vec!["shared/c.md".to_string()];

        resolve_imports("one.md", &imports, &counting, &mut cache).unwrap();
        resolve_imports("two.md", &imports, &counting, &mut cache).unwrap();

        assert_eq!(counting.loads.get(), 1);
        assert!(cache.contains("shared/c.md"));
    }

    #[test]
    fn test_includes_collect_engines() {
        let source = MemorySource::new()
            .with("parts/engine.md", "---\nengine: codex\n---\n@include parts/nested.md\n")
            .with("parts/nested.md", "---\nengine:\n  id: claude\n---\n");
        let includes = vec![
            IncludeDirective {
                path: "parts/engine.md".to_string(),
                optional: false,
            },
            IncludeDirective {
                path: "parts/missing.md".to_string(),
                optional: true,
            },
        ];
        let mut cache = ImportCache::new();
        let expansion = expand_includes("main.md", &includes, &source, &mut cache).unwrap();

        assert_eq!(
            expansion.included_files,
            vec!["parts/engine.md", "parts/nested.md"]
        );
        assert_eq!(expansion.engines.len(), 2);
    }

    #[test]
    fn test_required_include_missing() {
        let includes = vec![IncludeDirective {
            path: "parts/missing.md".to_string(),
            optional: false,
        }];
        let mut cache = ImportCache::new();
        let err = expand_includes("main.md", &includes, &MemorySource::new(), &mut cache)
            .unwrap_err();
        assert!(matches!(err, CompileError::ImportNotFound { .. }));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(" ./././shared/a.md "), "shared/a.md");
        assert_eq!(normalize_path("shared/a.md"), "shared/a.md");
    }
}
