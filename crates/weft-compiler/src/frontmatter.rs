//! Decoding of the main workflow's own declarations.

use serde_json::{Map, Value};
use weft_config::SafeOutputsConfig;
use weft_types::{
    EngineSpec, IncludeDirective, NetworkPermissions, PermissionSet, SandboxConfig, TypeError,
    WorkflowDocument,
};

use crate::{CompileError, Result};

/// What the main workflow declares, decoded once.
///
/// Unlike imports, the main file is validated strictly: a malformed value is
/// an error, never skipped.
#[derive(Debug, Clone, Default)]
pub struct MainDeclarations {
    pub engine: Option<EngineSpec>,
    pub strict: Option<bool>,
    pub network: NetworkPermissions,
    /// Whether `network:` appears in the frontmatter at all.
    pub network_configured: bool,
    pub sandbox: SandboxConfig,
    pub permissions: Option<PermissionSet>,
    pub tools: Map<String, Value>,
    pub mcp_servers: Map<String, Value>,
    pub safe_outputs: Option<SafeOutputsConfig>,
    pub features: Map<String, Value>,
    pub imports: Vec<String>,
    pub includes: Vec<IncludeDirective>,
}

impl MainDeclarations {
    pub fn extract(doc: &WorkflowDocument) -> Result<Self> {
        let invalid = |source: TypeError| CompileError::InvalidFrontmatter {
            path: doc.path.clone(),
            source,
        };

        // A blank engine string is no declaration, as it is for imports.
        let engine = doc
            .get("engine")
            .filter(|value| !matches!(value, Value::String(id) if id.trim().is_empty()))
            .map(EngineSpec::from_value)
            .transpose()
            .map_err(invalid)?;

        let strict = match doc.get("strict") {
            None => None,
            Some(Value::Bool(strict)) => Some(*strict),
            Some(other) => {
                return Err(CompileError::InvalidField {
                    path: doc.path.clone(),
                    key: "strict".to_string(),
                    reason: format!("must be true or false, got {}", other),
                });
            }
        };

        let network_value = doc.get("network");
        let network = match network_value {
            Some(value) => NetworkPermissions::from_value(value).map_err(invalid)?,
            None => NetworkPermissions::defaults(),
        };

        let sandbox = doc
            .get("sandbox")
            .map(SandboxConfig::from_value)
            .transpose()
            .map_err(invalid)?
            .unwrap_or_default();

        let permissions = doc
            .get("permissions")
            .map(PermissionSet::from_value)
            .transpose()
            .map_err(invalid)?;

        let safe_outputs = doc
            .get("safe-outputs")
            .map(SafeOutputsConfig::from_value)
            .transpose()
            .map_err(|e| invalid(TypeError::Json(e)))?;

        Ok(Self {
            engine,
            strict,
            network,
            network_configured: network_value.is_some(),
            sandbox,
            permissions,
            tools: object(doc, "tools")?,
            mcp_servers: object(doc, "mcp-servers")?,
            safe_outputs,
            features: object(doc, "features")?,
            imports: doc.imports(),
            includes: doc.includes(),
        })
    }
}

fn object(doc: &WorkflowDocument, key: &str) -> Result<Map<String, Value>> {
    match doc.get(key) {
        None => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(other) => Err(CompileError::InvalidField {
            path: doc.path.clone(),
            key: key.to_string(),
            reason: format!("must be a mapping, got {}", other),
        }),
    }
}
