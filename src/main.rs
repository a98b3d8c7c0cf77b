use clap::Parser;
use eyre::Result;
use log::info;

mod cli;
mod commands;
mod envfile;
mod error;
mod generate;
mod loader;
mod registry;
mod resolver;
mod schema;
mod tracker;
mod workspace;

use cli::{Cli, Commands};

fn setup_logging(verbose: bool, quiet: bool) {
    let mut builder = env_logger::Builder::new();

    // RUST_LOG takes precedence over the CLI flags
    if std::env::var("RUST_LOG").is_ok() {
        builder.parse_default_env();
    } else {
        builder.filter_level(if verbose {
            log::LevelFilter::Debug
        } else if quiet {
            log::LevelFilter::Error
        } else {
            log::LevelFilter::Warn
        });
    }

    builder.target(env_logger::Target::Stderr).init();
}

fn run(cli: Cli) -> Result<()> {
    let quiet = cli.quiet;
    match cli.command {
        Commands::Generate {
            agents,
            config,
            root,
            output,
            rules_mode,
            shell,
            dry_run,
        } => commands::generate::run(
            agents,
            config.as_deref(),
            &root,
            output.as_deref(),
            rules_mode,
            shell,
            dry_run,
            quiet,
        ),
        Commands::Agents => commands::agents::run(),
        Commands::Validate { config, root } => commands::validate::run(config.as_deref(), &root, quiet),
        Commands::Completions { shell } => commands::completions::run(shell),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);
    info!("starting charlie");
    run(cli)
}
