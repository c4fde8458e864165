//! Config command - inspect compiler settings.

use anyhow::Result;
use clap::{Args, Subcommand};

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the merged settings
    Show,

    /// Show which settings files are checked and their precedence
    Which,

    /// Show the user settings file path
    Path,
}

/// Run the config command.
pub fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(ctx),
        ConfigCommand::Which => cmd_which(ctx),
        ConfigCommand::Path => cmd_path(ctx),
    }
}

fn cmd_show(ctx: &Context) -> Result<()> {
    let loaded = ctx.load_settings();
    let compiler = &loaded.settings.compiler;

    let sources = loaded.loaded_from();
    if sources.is_empty() {
        println!("# No settings files loaded (using defaults)\n");
    }

    let strict = match compiler.strict {
        Some(strict) => strict.to_string(),
        None => "(frontmatter, default true)".to_string(),
    };
    println!("[compiler]");
    println!("strict = {}", strict);
    println!(
        "engine = {}",
        compiler.engine.as_deref().unwrap_or("(workflow declaration)")
    );
    Ok(())
}

fn cmd_which(ctx: &Context) -> Result<()> {
    let loaded = ctx.load_settings();

    println!("Settings files (lowest precedence first):");
    for source in &loaded.sources {
        let status = if source.loaded { "loaded" } else { "not loaded" };
        println!("  {} [{}]", source.path.display(), status);
    }
    for warning in &loaded.warnings {
        println!("  warning: {}", warning);
    }
    Ok(())
}

fn cmd_path(ctx: &Context) -> Result<()> {
    let path = match &ctx.config_dir {
        Some(dir) => Some(dir.join("config.toml")),
        None => weft_config::user_settings_path(),
    };
    match path {
        Some(path) => println!("{}", path.display()),
        None => anyhow::bail!("could not determine the user config directory; set WEFT_CONFIG_DIR"),
    }
    Ok(())
}
