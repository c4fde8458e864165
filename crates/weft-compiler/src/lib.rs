//! Workflow configuration resolution for weft.
//!
//! The [`Compiler`] runs the full pipeline for one workflow at a time:
//!
//! 1. Decode the main workflow's frontmatter and settle strict mode
//! 2. Apply an engine override, if configured
//! 3. Walk the import graph and body includes through a [`FragmentSource`]
//! 4. Merge network permissions and validate permission sufficiency
//! 5. Settle on exactly one engine and look it up in the registry
//! 6. Apply engine network defaults, then strict firewall and network checks
//! 7. Merge tools, MCP servers, safe outputs and features
//!
//! ```ignore
//! let source = MemorySource::new().with("shared/tools.md", SHARED);
//! let mut compiler = Compiler::new(source);
//! let resolved = compiler.resolve_markdown("triage.md", MAIN)?;
//! ```

mod compiler;
mod error;
pub mod frontmatter;
pub mod imports;
pub mod strict;

pub use compiler::{CompileOptions, Compiler, ResolvedWorkflow};
pub use error::{CompileError, Result};
pub use frontmatter::MainDeclarations;
pub use imports::{
    FragmentSource, ImportCache, IncludeExpansion, MemorySource, ResolvedImports,
    expand_includes, normalize_path, resolve_imports,
};
pub use strict::{resolve_strict_mode, validate_strict_mode};
