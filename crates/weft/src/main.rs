//! Weft - agentic workflow configuration compiler
//!
//! Main entry point for the weft CLI.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{config, engines, resolve};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Weft - agentic workflow configuration compiler
#[derive(Parser)]
#[command(name = "weft")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding the user settings file (config.toml)
    #[arg(long, global = true, env = "WEFT_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a workflow bundle and print the merged configuration
    Resolve(resolve::ResolveArgs),

    /// List available engines
    Engines(engines::EnginesArgs),

    /// Show compiler settings and where they were loaded from
    Config(config::ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "weft=debug,weft_compiler=debug,weft_config=debug,weft_engine=debug,info"
    } else {
        "weft=info,weft_compiler=info,weft_config=info,weft_engine=info,warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(filter),
        )
        .init();

    let ctx = commands::Context {
        verbose: cli.verbose,
        config_dir: cli.config_dir,
    };

    match cli.command {
        Commands::Resolve(args) => resolve::run(args, &ctx),
        Commands::Engines(args) => engines::run(args, &ctx),
        Commands::Config(args) => config::run(args, &ctx),
    }
}
