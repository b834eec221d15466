//! # Merge Command Implementation
//!
//! `strata merge` deep-merges fragment files in the order given, later files
//! taking precedence, and prints the result.
//!
//! With `--resolve-extends`, each file's `extends` chain is resolved first.
//! Parent references are read relative to the directory of the file being
//! merged. Resolvers are shared per directory, so a parent extended by
//! several inputs is read once.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use log::{debug, info};
use serde_json::Value;

use strata::cache::CachedResolver;
use strata::config;
use strata::inheritance::resolve_inheritance;
use strata::merge::merge;
use strata::resolvers::FileResolver;
use strata::suggestions;

use super::{render, OutputFormat};

/// Deep-merge configuration fragments
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Fragment files (.json, .toml, .yaml), lowest precedence first
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Resolve each file's `extends` chain before merging
    #[arg(long)]
    pub resolve_extends: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Write the result to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Execute the `merge` command.
pub async fn execute(args: MergeArgs) -> Result<()> {
    let mut resolvers: HashMap<PathBuf, CachedResolver<FileResolver>> = HashMap::new();
    let mut fragments = Vec::with_capacity(args.files.len());

    for path in &args.files {
        let fragment = load_fragment(path)?;
        let fragment = if args.resolve_extends {
            let resolver = &*resolvers
                .entry(base_dir(path))
                .or_insert_with_key(|dir| CachedResolver::new(FileResolver::new(dir.clone())));
            resolve_inheritance(&fragment, resolver)
                .await
                .map_err(suggestions::explain)
                .with_context(|| format!("Failed to resolve {}", path.display()))?
        } else {
            fragment
        };
        fragments.push(fragment);
    }

    let merged = merge(&fragments);
    let rendered = render(&merged, args.format)?;

    match &args.output {
        Some(output) => {
            fs::write(output, rendered)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!("Wrote merged fragment to {}", output.display());
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

fn load_fragment(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(suggestions::input_not_found(path));
    }
    debug!("Loading fragment {}", path.display());
    config::from_file(path).with_context(|| format!("Failed to load {}", path.display()))
}

fn base_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}
