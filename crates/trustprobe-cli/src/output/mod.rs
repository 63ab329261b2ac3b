//! Output formatting for different formats.

use chrono::Local;
use clap::ValueEnum;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use trustprobe::{Evaluation, OptionalField, RootCaDetails, Verdict};

/// Available output formats.
#[derive(Debug, Clone, Copy, Default, ValueEnum, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Colored, human-readable text
    #[default]
    Pretty,
    /// JSON output
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => anyhow::bail!(
                "Unknown output format: {}\n\
                 Valid formats: pretty, json",
                s
            ),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Serializable view of one validation pass
#[derive(Debug, Serialize)]
pub struct EvaluationReport<'a> {
    pub baseurl: &'a str,
    pub verdict: Verdict,
    pub display: Vec<OptionalField>,
    pub errors: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_ca: Option<RootCaDetails>,
}

impl<'a> EvaluationReport<'a> {
    /// Build a report, rendering root CA validity in the local timezone
    pub fn new(baseurl: &'a str, evaluation: &'a Evaluation) -> Self {
        Self {
            baseurl,
            verdict: evaluation.verdict,
            display: evaluation.display.iter().collect(),
            errors: &evaluation.errors,
            root_ca: evaluation
                .root_ca
                .as_ref()
                .map(|cert| RootCaDetails::new(cert, &Local)),
        }
    }
}

/// Print an evaluation in the requested format
pub fn print_evaluation(
    format: OutputFormat,
    baseurl: &str,
    evaluation: &Evaluation,
) -> anyhow::Result<()> {
    let report = EvaluationReport::new(baseurl, evaluation);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Pretty => print_pretty(&report),
    }
    Ok(())
}

fn print_pretty(report: &EvaluationReport<'_>) {
    let verdict = match report.verdict {
        Verdict::Accept => report.verdict.to_string().green().bold(),
        Verdict::Reject => report.verdict.to_string().red().bold(),
    };
    println!("{} {}", report.baseurl.cyan().bold(), verdict);

    for error in report.errors {
        println!("  {} {}", "Error:".red(), error);
    }

    if let Some(root) = &report.root_ca {
        println!();
        print_root_ca(root);
    }

    let options: Vec<OptionalField> = report
        .display
        .iter()
        .copied()
        .filter(|field| field.is_selectable())
        .collect();
    if !options.is_empty() && !report.verdict.is_accept() {
        println!();
        println!("{}", "Available options:".bold());
        for field in options {
            println!("  {} {}", format!("{:<28}", field.name()).dimmed(), field.label());
        }
    }
}

/// Print the root CA details block
pub fn print_root_ca(root: &RootCaDetails) {
    println!("{}", "Root CA".bold());
    for line in &root.subject {
        println!("  {line}");
    }
    println!("  {} {}", "Valid from:".bold(), root.valid_from);
    println!("  {} {}", "Valid until:".bold(), root.valid_until);
    println!("  {} {}", "SHA256 fingerprint:".bold(), root.sha256_fingerprint);
    println!("  {} {}", "SHA1 fingerprint:".bold(), root.sha1_fingerprint);
}
