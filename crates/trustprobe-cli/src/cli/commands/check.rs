//! `trustprobe check` - one validation pass.

use anyhow::Result;
use std::process::ExitCode;
use tracing::debug;

use super::{evaluation_failed, exit_code, initial_fields, save_root, Context};
use crate::cli::args::CheckArgs;
use crate::output;

pub async fn execute(ctx: Context, args: CheckArgs) -> Result<ExitCode> {
    let mut fields = initial_fields(&args.baseurl, &args.shared)?;
    fields.force_creation = args.force;
    fields.tls_server_insecure = args.insecure;
    fields.tls_server_ignore_cn = args.ignore_cn;
    fields.tls_server_discover_rootca = args.discover_root;
    fields.tls_server_accept_rootca = args.accept_root;

    debug!(?fields, "submitting");
    let evaluation = ctx
        .negotiator()
        .evaluate(&fields)
        .await
        .map_err(evaluation_failed)?;

    output::print_evaluation(ctx.output_format, &args.baseurl, &evaluation)?;

    if let Some(path) = &args.shared.save_root {
        save_root(path, &evaluation)?;
    }

    Ok(exit_code(&evaluation))
}
