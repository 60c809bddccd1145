//! CLI parse: clap types for strata. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strata CLI - Environment-layered configuration assembly
#[derive(Parser)]
#[command(name = "strata")]
#[command(about = "Inspect and assemble environment-layered configuration")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Context override (default: STRATA_CONTEXT, then Production)
    #[arg(long)]
    pub context: Option<String>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the active context and print its layer chain
    Resolve {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Run the assembly pipeline and print the resulting tree
    Assemble {
        /// Directory holding context fragment files
        #[arg(long)]
        base_path: Option<PathBuf>,

        /// Output format (toml or json)
        #[arg(long, default_value = "toml")]
        format: String,

        /// Skip the automatic context presets and site label
        #[arg(long)]
        no_defaults: bool,
    },
}
