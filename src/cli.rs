//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;

use crate::commands;
use strata::output::OutputConfig;

/// Strata - Compose layered configuration profiles and hooks
#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Deep-merge configuration fragments
    Merge(commands::merge::MergeArgs),

    /// Inspect and resolve named profiles
    Profile(commands::profile::ProfileArgs),

    /// Compose hook manifests into settings
    Hooks(commands::hooks::HooksArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        init_logging(&self.log_level);
        let output = OutputConfig::from_env_and_flag(&self.color);

        match self.command {
            Commands::Merge(args) => commands::merge::execute(args).await,
            Commands::Profile(args) => commands::profile::execute(args, &output).await,
            Commands::Hooks(args) => commands::hooks::execute(args, &output),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

/// Log to stderr at `level`, unless `RUST_LOG` says otherwise
fn init_logging(level: &str) {
    let env = Env::default().default_filter_or(level);
    // Ignore a second initialization; only the first logger wins.
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}
