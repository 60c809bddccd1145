//! CLI route: dispatch parsed commands into the assembly library.

use crate::assembler::Assembler;
use crate::cli::parse::{Cli, Commands};
use crate::context::Context;
use crate::error::ConfigError;
use crate::layers::fragment_relative_path;
use owo_colors::OwoColorize;

/// Execute the parsed command and return the text to print.
pub fn run(cli: &Cli) -> Result<String, ConfigError> {
    let context = match &cli.context {
        Some(name) => Context::parse(name)?,
        None => Context::resolve()?,
    };

    match &cli.command {
        Commands::Resolve { format } => format_resolved_context(&context, format),
        Commands::Assemble {
            base_path,
            format,
            no_defaults,
        } => {
            let mut assembler =
                Assembler::for_context(context).automatic_defaults(!no_defaults);
            if let Some(base_path) = base_path {
                assembler = assembler.base_path(base_path);
            }
            let assembly = assembler.assemble()?;
            match format.as_str() {
                "json" => assembly.store.to_json_string(),
                _ => assembly.store.to_toml_string(),
            }
        }
    }
}

fn format_resolved_context(context: &Context, format: &str) -> Result<String, ConfigError> {
    let chain: Vec<String> = context.ancestors().iter().map(Context::to_string).collect();
    let fragments: Vec<String> = context
        .ancestors()
        .iter()
        .map(|ancestor| fragment_relative_path(ancestor).display().to_string())
        .collect();

    if format == "json" {
        let value = serde_json::json!({
            "context": context.to_string(),
            "chain": chain,
            "fragments": fragments,
        });
        return serde_json::to_string_pretty(&value)
            .map_err(|e| ConfigError::Serialize(e.to_string()));
    }

    let mut out = String::new();
    out.push_str(&format!("Context: {}\n", context.bold()));
    out.push_str("Layers (root to leaf):\n");
    for (name, fragment) in chain.iter().zip(&fragments) {
        out.push_str(&format!("  {} -> {}\n", name, fragment));
    }
    Ok(out)
}
