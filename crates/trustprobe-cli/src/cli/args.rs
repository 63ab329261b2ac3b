//! Command-line argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Validate that a monitored HTTP(S) endpoint is reachable and trusted
///
/// When the remote's certificate can't be verified, trustprobe offers the
/// ways forward: ignore the CN, discover and accept its root CA, connect
/// insecurely, or force the change without validation.
#[derive(Parser, Debug)]
#[command(name = "trustprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Connect and handshake timeout in seconds
    #[arg(short, long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "TRUSTPROBE_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one validation pass against an endpoint
    Check(CheckArgs),

    /// Negotiate trust interactively until the endpoint is accepted
    Wizard(WizardArgs),

    /// List the TLS client identities available to --identity
    Identities,

    /// Manage CLI configuration
    Config(ConfigArgs),
}

// ============================================================================
// Check command
// ============================================================================

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Base URL, e.g. https://monitoring.example:5665/api
    pub baseurl: String,

    /// Enforce the change without connectivity validation
    #[arg(long)]
    pub force: bool,

    /// Don't validate the remote's TLS certificate chain at all
    #[arg(long)]
    pub insecure: bool,

    /// Ignore the remote's TLS certificate's CN
    #[arg(long)]
    pub ignore_cn: bool,

    /// Discover the remote's root CA and show it for confirmation
    #[arg(long, conflicts_with = "accept_root")]
    pub discover_root: bool,

    /// Trust the root CA passed with --root-ca
    #[arg(long, requires = "root_ca")]
    pub accept_root: bool,

    #[command(flatten)]
    pub shared: SharedArgs,
}

// ============================================================================
// Wizard command
// ============================================================================

#[derive(Args, Debug)]
pub struct WizardArgs {
    /// Base URL, e.g. https://monitoring.example:5665/api
    pub baseurl: String,

    #[command(flatten)]
    pub shared: SharedArgs,
}

/// Arguments shared by `check` and `wizard`
#[derive(Args, Debug)]
pub struct SharedArgs {
    /// Previously discovered root CA (PEM file)
    #[arg(long, value_name = "FILE")]
    pub root_ca: Option<PathBuf>,

    /// Write the root CA the pass ended with to this file
    #[arg(long, value_name = "FILE")]
    pub save_root: Option<PathBuf>,

    /// TLS client identity to present, looked up in the identity directory
    #[arg(long, value_name = "ID")]
    pub identity: Option<String>,
}

// ============================================================================
// Config command
// ============================================================================

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Key to set (e.g., connect_timeout, identity_dir)
        key: String,

        /// Value to set
        value: String,
    },

    /// Show config file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn check_flags_parse() {
        let cli = Cli::try_parse_from([
            "trustprobe",
            "check",
            "https://monitoring.example:5665",
            "--ignore-cn",
            "--accept-root",
            "--root-ca",
            "ca.pem",
            "--output",
            "json",
        ])
        .unwrap();

        let Commands::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert!(args.ignore_cn);
        assert!(args.accept_root);
        assert_eq!(args.shared.root_ca, Some(PathBuf::from("ca.pem")));
        assert_eq!(cli.output, Some(OutputFormat::Json));
    }

    #[test]
    fn accept_root_needs_a_root() {
        let result = Cli::try_parse_from([
            "trustprobe",
            "check",
            "https://monitoring.example",
            "--accept-root",
        ]);
        assert!(result.is_err());
    }
}
