//! trustprobe - TLS trust negotiation for monitored endpoints
//!
//! Validates that an HTTP(S) endpoint is reachable and trusted, and walks the
//! operator through the options when it is not.

use anyhow::Result;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    trustprobe_cli::run().await
}
