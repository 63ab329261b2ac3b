//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;
use std::process::ExitCode;

use crate::config::Config;
use crate::logging;

/// Run the CLI application.
pub async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    logging::init(cli.verbose, cli.no_color);
    if cli.no_color {
        colored::control::set_override(false);
    }

    // Load configuration
    let config_path = match cli.config {
        Some(path) => path,
        None => Config::path()?,
    };
    let config = Config::load_from(&config_path)?;

    // Create context for commands
    let ctx = commands::Context {
        output_format: cli.output.or(config.output_format).unwrap_or_default(),
        probe: config.probe_config(cli.timeout),
        config_path,
    };

    // Dispatch to appropriate command
    match cli.command {
        Commands::Check(args) => commands::check::execute(ctx, args).await,
        Commands::Wizard(args) => commands::wizard::execute(ctx, args).await,
        Commands::Identities => commands::identities::execute(ctx)
            .await
            .map(|()| ExitCode::SUCCESS),
        Commands::Config(args) => commands::config::execute(ctx, args).map(|()| ExitCode::SUCCESS),
    }
}
