//! # Strata CLI
//!
//! This is the binary entry point for the `strata` command-line tool.
//!
//! It parses arguments with `clap`, runs the selected command on a
//! single-threaded `tokio` runtime, and reports errors through `anyhow`.
//! All composition logic lives in the `strata` library crate; the binary is
//! a thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute().await
}
