use entigen_config::EntigenConfig;
use entigen_parser::parse_files;
use tracing::debug;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::InspectArgs;
use crate::commands::sources::collect_java_files;
use crate::output::output;

/// Handle `entigen inspect`.
pub fn handle(args: &InspectArgs, config: &EntigenConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let files = collect_java_files(&args.paths)?;
    debug!(files = files.len(), "inspecting");
    let schemas = parse_files(&files, config)?;
    output(&schemas, flags.format)
}
