//! The resolution pipeline.
//!
//! A [`Compiler`] owns the fragment source and import cache and is meant to
//! be reused across many workflows in sequence. Per-workflow state (the
//! effective strict mode in particular) is passed through the pipeline as
//! values and never stored on the compiler, so one failed compilation
//! cannot leak into the next.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use weft_config::{
    SafeOutputsConfig, extract_imported_engine_config, merge_features, merge_mcp_servers,
    merge_network_permissions, merge_safe_outputs, merge_tools, validate_included_permissions,
    validate_single_engine_specification,
};
use weft_engine::{Engine, EngineRegistry};
use weft_types::{
    EngineConfig, EngineSpec, FirewallConfig, NetworkPermissions, PermissionSet, SandboxConfig,
    WorkflowDocument,
};

use crate::frontmatter::MainDeclarations;
use crate::imports::{FragmentSource, ImportCache, expand_includes, resolve_imports};
use crate::strict::{resolve_strict_mode, validate_strict_mode};
use crate::{CompileError, Result};

/// Per-run options supplied by the caller (CLI flags or settings).
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Strict mode override. Beats the frontmatter `strict:` key.
    pub strict: Option<bool>,
    /// Strict mode for workflows that do not set `strict:` themselves.
    pub default_strict: Option<bool>,
    /// Engine to use regardless of what the workflow declares.
    pub engine_override: Option<String>,
}

/// The unified configuration of one workflow after all imports are folded in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResolvedWorkflow {
    pub path: String,
    pub engine_id: String,
    pub engine_config: EngineConfig,
    pub strict: bool,
    pub tools: Map<String, Value>,
    pub mcp_servers: Map<String, Value>,
    pub network: NetworkPermissions,
    pub permissions: PermissionSet,
    pub sandbox: SandboxConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safe_outputs: Option<SafeOutputsConfig>,
    pub features: Map<String, Value>,
    pub imported_files: Vec<String>,
    pub included_files: Vec<String>,
}

/// Resolves workflows against a fragment source.
pub struct Compiler<S> {
    source: S,
    cache: ImportCache,
    registry: Option<Arc<EngineRegistry>>,
    options: CompileOptions,
}

impl<S: FragmentSource> Compiler<S> {
    /// A compiler using the process-wide engine registry.
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: ImportCache::new(),
            registry: None,
            options: CompileOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    /// Use a custom engine registry instead of the global one.
    pub fn with_registry(mut self, registry: Arc<EngineRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn cache(&self) -> &ImportCache {
        &self.cache
    }

    pub fn registry(&self) -> &EngineRegistry {
        self.registry.as_deref().unwrap_or_else(|| weft_engine::global())
    }

    /// Parse and resolve a markdown workflow.
    pub fn resolve_markdown(&mut self, path: &str, content: &str) -> Result<ResolvedWorkflow> {
        let doc = WorkflowDocument::parse(path, content).map_err(|e| {
            CompileError::InvalidFrontmatter {
                path: path.to_string(),
                source: e,
            }
        })?;
        self.resolve(&doc)
    }

    /// Resolve a parsed workflow. Fails fast: the first error aborts the
    /// remaining stages and no partial result is returned.
    pub fn resolve(&mut self, doc: &WorkflowDocument) -> Result<ResolvedWorkflow> {
        let main = MainDeclarations::extract(doc)?;

        let strict = resolve_strict_mode(
            self.options.strict,
            main.strict,
            self.options.default_strict,
        );
        if strict {
            validate_strict_mode(&main)?;
        }

        let main_engine = self.apply_engine_override(main.engine.clone());

        let imports = resolve_imports(&doc.path, &main.imports, &self.source, &mut self.cache)?;
        let includes = expand_includes(&doc.path, &main.includes, &self.source, &mut self.cache)?;

        let mut network = merge_network_permissions(Some(&main.network), &imports.merged_network)?;

        validate_included_permissions(main.permissions.as_ref(), &imports.merged_permissions)?;

        let mut engine_declarations = imports.merged_engines.clone();
        engine_declarations.extend(includes.engines.iter().cloned());
        let declared_engine =
            validate_single_engine_specification(main_engine.as_ref(), &engine_declarations)?;
        let engine_config = match main_engine {
            Some(spec) => Some(spec.into_config()),
            None => extract_imported_engine_config(&engine_declarations)?,
        };

        let registry = self.registry();
        let engine_id =
            declared_engine.unwrap_or_else(|| registry.default_engine_id().to_string());
        let engine = lookup_engine(registry, &engine_id)?;
        if engine.is_experimental() {
            tracing::warn!(engine = %engine.id(), "using experimental engine");
        }

        apply_engine_defaults(engine.as_ref(), &mut network, &main.sandbox);

        if strict {
            enforce_strict_firewall(engine.as_ref(), &network, &main.sandbox)?;
        }

        let network_configured =
            main.network_configured || !imports.merged_network.trim().is_empty();
        check_network_support(engine.as_ref(), &network, network_configured, strict)?;

        let tools = merge_tools(&main.tools, &imports.merged_tools)?;
        let mcp_servers = merge_mcp_servers(&main.mcp_servers, &imports.merged_mcp_servers)?;
        let safe_outputs =
            merge_safe_outputs(main.safe_outputs.as_ref(), &imports.merged_safe_outputs)?;
        let features = merge_features(&main.features, &imports.merged_features)?;

        tracing::info!(
            workflow = %doc.path,
            engine = %engine_id,
            strict,
            imports = imports.imported_files.len(),
            "resolved workflow"
        );

        Ok(ResolvedWorkflow {
            path: doc.path.clone(),
            engine_config: engine_config.unwrap_or_else(|| EngineConfig::new(engine_id.clone())),
            engine_id,
            strict,
            tools,
            mcp_servers,
            network,
            permissions: main.permissions.unwrap_or_default(),
            sandbox: main.sandbox,
            safe_outputs,
            features,
            imported_files: imports.imported_files,
            included_files: includes.included_files,
        })
    }

    /// Replace the declared engine with the configured override, if any.
    ///
    /// An object declaration keeps its other fields; only the ID changes.
    fn apply_engine_override(&self, declared: Option<EngineSpec>) -> Option<EngineSpec> {
        let Some(override_id) = self.options.engine_override.as_deref() else {
            return declared;
        };
        match declared {
            None => Some(EngineSpec::Id(override_id.to_string())),
            Some(spec) => {
                if spec.id() != override_id {
                    tracing::warn!(
                        declared = %spec.id(),
                        engine = %override_id,
                        "engine override replaces the declared engine"
                    );
                }
                let mut config = spec.into_config();
                config.id = override_id.to_string();
                Some(EngineSpec::Config(config))
            }
        }
    }
}

/// Exact ID first, then the longest registered prefix.
fn lookup_engine(registry: &EngineRegistry, id: &str) -> Result<Arc<dyn Engine>> {
    if registry.is_valid_engine(id) {
        return Ok(registry.get_engine(id)?);
    }
    let engine = registry.get_engine_by_prefix(id)?;
    tracing::debug!(requested = %id, engine = %engine.id(), "matched engine by prefix");
    Ok(engine)
}

/// Turn the firewall on for engines that default to it, when egress is
/// restricted and nothing says otherwise.
fn apply_engine_defaults(
    engine: &dyn Engine,
    network: &mut NetworkPermissions,
    sandbox: &SandboxConfig,
) {
    if engine.enables_firewall_by_default()
        && network.has_restrictions()
        && network.firewall.is_none()
        && !sandbox.excludes_firewall()
    {
        tracing::debug!(engine = %engine.id(), "enabling network firewall by default");
        network.firewall = Some(FirewallConfig::enabled());
    }
}

fn enforce_strict_firewall(
    engine: &dyn Engine,
    network: &NetworkPermissions,
    sandbox: &SandboxConfig,
) -> Result<()> {
    if engine.supports_firewall()
        && engine.requires_firewall_in_strict()
        && network.has_restrictions()
        && !sandbox.isolates_network()
        && !network.firewall_enabled()
    {
        return Err(CompileError::FirewallRequired {
            engine: engine.id().to_string(),
        });
    }
    Ok(())
}

fn check_network_support(
    engine: &dyn Engine,
    network: &NetworkPermissions,
    configured: bool,
    strict: bool,
) -> Result<()> {
    if !configured || !network.has_restrictions() || engine.supports_network_restrictions() {
        return Ok(());
    }
    if strict {
        return Err(CompileError::NetworkUnsupported {
            engine: engine.id().to_string(),
        });
    }
    tracing::warn!(
        engine = %engine.id(),
        "engine does not support network restrictions; network configuration will not be enforced"
    );
    Ok(())
}
