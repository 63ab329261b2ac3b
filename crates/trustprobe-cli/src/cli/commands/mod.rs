//! Command implementations.

pub mod check;
pub mod config;
pub mod identities;
pub mod wizard;

use anyhow::{Context as _, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use trustprobe::{Evaluation, ProbeConfig, ProbeError, SubmittedFields, TrustNegotiator};

use crate::cli::args::SharedArgs;
use crate::output::OutputFormat;

/// Exit status for a rejected submission
pub const EXIT_REJECTED: u8 = 2;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Output format
    pub output_format: OutputFormat,

    /// Probe settings from config and flags
    pub probe: ProbeConfig,

    /// Config file in use
    pub config_path: PathBuf,
}

impl Context {
    /// Negotiator probing the network with the configured settings.
    pub fn negotiator(&self) -> TrustNegotiator {
        TrustNegotiator::with_config(self.probe.clone())
    }
}

/// Turn a failed evaluation into a CLI error.
///
/// Recoverable failures already arrive as rejections, so anything here is
/// fatal; configuration errors get a hint on the expected input.
fn evaluation_failed(err: ProbeError) -> anyhow::Error {
    if err.is_recoverable() {
        return err.into();
    }
    anyhow::anyhow!(
        "{err}\n\n\
         Expected a base URL like https://<HOST>[:<PORT>][/<BASE_LOCATION>]"
    )
}

/// Fields for `baseurl` plus the root CA and identity passed on the command line.
fn initial_fields(baseurl: &str, shared: &SharedArgs) -> Result<SubmittedFields> {
    let mut fields = SubmittedFields::for_url(baseurl);
    fields.tls_client_identity.clone_from(&shared.identity);

    if let Some(path) = &shared.root_ca {
        let pem = std::fs::read_to_string(path)
            .with_context(|| format!("reading root CA from {}", path.display()))?;
        fields.tls_server_rootca_cert = Some(pem);
    }

    Ok(fields)
}

/// Write the root CA an evaluation ended with, if any.
fn save_root(path: &Path, evaluation: &Evaluation) -> Result<()> {
    let Some(pem) = &evaluation.rootca_cert else {
        eprintln!(
            "{} no root CA to save to {}",
            "Note:".yellow().bold(),
            path.display()
        );
        return Ok(());
    };

    std::fs::write(path, pem).with_context(|| format!("writing root CA to {}", path.display()))?;
    eprintln!("{} root CA saved to {}", "Saved:".green().bold(), path.display());
    Ok(())
}

fn exit_code(evaluation: &Evaluation) -> ExitCode {
    if evaluation.is_accepted() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_REJECTED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_get_a_hint() {
        let err = evaluation_failed(ProbeError::Configuration("invalid base URL".into()));
        assert!(err.to_string().contains("Expected a base URL"));

        let err = evaluation_failed(ProbeError::Connect("refused".into()));
        assert_eq!(err.to_string(), "refused");
    }
}
