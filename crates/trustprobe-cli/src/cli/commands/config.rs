//! `trustprobe config` - CLI configuration management.

use anyhow::Result;
use colored::Colorize;

use super::Context;
use crate::cli::args::{ConfigArgs, ConfigCommands};
use crate::config::Config;
use crate::output::OutputFormat;

pub fn execute(ctx: Context, args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show_config(&ctx),
        ConfigCommands::Set { key, value } => set_config(&ctx, &key, &value),
        ConfigCommands::Path => {
            println!("{}", ctx.config_path.display());
            Ok(())
        }
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    let config = Config::load_from(&ctx.config_path)?;

    match ctx.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        OutputFormat::Pretty => {
            let unset = || "(not set)".dimmed().to_string();

            println!("{}", "Current Configuration:".bold());
            println!();
            println!(
                "  {} {}",
                "connect_timeout:".bold(),
                config
                    .connect_timeout_secs
                    .map_or_else(unset, |secs| format!("{secs}s"))
            );
            println!(
                "  {} {}",
                "output_format:".bold(),
                config.output_format.unwrap_or_default()
            );
            println!(
                "  {} {}",
                "identity_dir:".bold(),
                config
                    .identity_dir
                    .as_ref()
                    .map_or_else(unset, |dir| dir.display().to_string())
            );
            let trust_paths = config
                .trust_paths
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>();
            println!(
                "  {} {}",
                "trust_paths:".bold(),
                if trust_paths.is_empty() {
                    unset()
                } else {
                    trust_paths.join(", ")
                }
            );
            println!(
                "  {} {}",
                "skip_system_trust:".bold(),
                config.skip_system_trust
            );
        }
    }

    Ok(())
}

fn set_config(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let mut config = Config::load_from(&ctx.config_path)?;
    config.set(key, value)?;
    config.save_to(&ctx.config_path)?;

    println!("{} {} set to {}.", "Success:".green().bold(), key, value.cyan());
    Ok(())
}
