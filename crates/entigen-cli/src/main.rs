use anyhow::Context;
use clap::Parser;
use entigen_config::EntigenConfig;

mod cli;
mod commands;
mod output;

fn main() {
    if let Err(error) = run() {
        eprintln!("entigen error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let flags = cli.global_flags();
    let config = load_config(&flags)?;
    commands::dispatch(&cli.command, &config, &flags)
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("ENTIGEN_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

fn load_config(flags: &cli::GlobalFlags) -> anyhow::Result<EntigenConfig> {
    match &flags.config {
        Some(path) => EntigenConfig::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => EntigenConfig::load_with_dotenv().context("failed to load entigen configuration"),
    }
}
