//! Engines command - list registered engines.

use anyhow::Result;
use clap::Args;

use super::Context;

/// Arguments for the engines command.
#[derive(Args, Debug)]
pub struct EnginesArgs {
    /// Output as JSON (for scripting)
    #[arg(long)]
    pub json: bool,
}

/// Run the engines command.
pub fn run(args: EnginesArgs, ctx: &Context) -> Result<()> {
    let infos = weft_engine::global().describe();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    for info in &infos {
        let mut markers = Vec::new();
        if info.default {
            markers.push("default");
        }
        if info.experimental {
            markers.push("experimental");
        }
        let markers = if markers.is_empty() {
            String::new()
        } else {
            format!(" ({})", markers.join(", "))
        };
        println!("{:<10} {}{}", info.id, info.display_name, markers);
        if ctx.verbose {
            println!("           {}", info.description);
        }
    }
    Ok(())
}
