use std::path::PathBuf;

use clap::Parser;

pub mod global;
pub mod root_commands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `entigen` binary.
#[derive(Debug, Parser)]
#[command(name = "entigen", version, about = "entigen - entity model extraction and code merge")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, text, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file used in place of `.entigen/config.toml`
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
            config: self.config.clone(),
        }
    }
}
