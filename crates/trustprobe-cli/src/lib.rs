//! # trustprobe-cli
//!
//! Command-line front end for endpoint trust negotiation.
//!
//! ## Features
//!
//! - **One-shot checks**: `trustprobe check <URL>` with every option as a flag
//! - **Wizard**: interactive loop that offers exactly the options that apply
//! - **Root CA round trip**: `--save-root` / `--root-ca` carry a discovered CA
//!   between invocations
//! - **Output formats**: colored text or JSON

pub mod cli;
pub mod config;
pub mod logging;
pub mod output;

pub use cli::run;
