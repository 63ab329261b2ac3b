//! `trustprobe identities` - list TLS client identities.

use anyhow::{Context as _, Result};
use colored::Colorize;
use trustprobe::DirectoryIdentityStore;

use super::Context;
use crate::output::OutputFormat;

pub async fn execute(ctx: Context) -> Result<()> {
    let Some(dir) = &ctx.probe.identity_dir else {
        anyhow::bail!(
            "No identity directory configured.\n\n\
             Set one with:\n  \
             trustprobe config set identity_dir <DIR>"
        );
    };

    let store = DirectoryIdentityStore::new(dir);
    let ids = store
        .list()
        .await
        .with_context(|| format!("listing identities in {}", store.dir().display()))?;

    match ctx.output_format {
        OutputFormat::Json => {
            let listing = serde_json::json!({ "dir": store.dir(), "identities": ids });
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        OutputFormat::Pretty => {
            println!(
                "{} {}",
                "Client identities in".bold(),
                store.dir().display().to_string().cyan()
            );
            if ids.is_empty() {
                println!("  {}", "(none)".dimmed());
            }
            for id in ids {
                println!("  {id}");
            }
        }
    }

    Ok(())
}
