//! # CLI Command Implementations
//!
//! One file per `strata` subcommand. Each module has an `Args` struct derived
//! with `clap` and an `execute` function that calls into the `strata` library.
//! Commands that cross the async resolver boundary are `async`.

pub mod completions;
pub mod hooks;
pub mod merge;
pub mod profile;

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

use strata::config::{self, Format};

/// Output format for fragments and resolved views
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Toml,
    Yaml,
}

impl From<OutputFormat> for Format {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => Format::Json,
            OutputFormat::Toml => Format::Toml,
            OutputFormat::Yaml => Format::Yaml,
        }
    }
}

/// Serialize `value` in `format`, always ending with a newline
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    let fragment = serde_json::to_value(value)?;
    let mut rendered = config::to_string(&fragment, format.into())?;
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }
    Ok(rendered)
}
