use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Parse entity sources and print the post-processed model per schema.
    Inspect(InspectArgs),
    /// Print the structural hash of a code fragment.
    Hash(HashArgs),
    /// Validate entity sources, reporting every failing file.
    Check(CheckArgs),
}

#[derive(Clone, Debug, Args)]
pub struct InspectArgs {
    /// Java source files (directories are scanned for `.java` files).
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

#[derive(Clone, Debug, Args)]
pub struct HashArgs {
    /// File holding the fragment.
    pub file: PathBuf,

    /// Also print the fragment with its `@Generated` marker.
    #[arg(long)]
    pub stamp: bool,
}

#[derive(Clone, Debug, Args)]
pub struct CheckArgs {
    /// Java source files (directories are scanned for `.java` files).
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}
