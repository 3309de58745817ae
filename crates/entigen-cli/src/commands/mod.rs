use entigen_config::EntigenConfig;

use crate::cli::{Commands, GlobalFlags};

pub mod check;
pub mod hash;
pub mod inspect;
pub mod sources;

/// Route a parsed command to its handler.
pub fn dispatch(command: &Commands, config: &EntigenConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Inspect(args) => inspect::handle(args, config, flags),
        Commands::Hash(args) => hash::handle(args, flags),
        Commands::Check(args) => check::handle(args, config, flags),
    }
}
