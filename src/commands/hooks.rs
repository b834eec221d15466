//! # Hooks Command Implementation
//!
//! `strata hooks` composes hook manifests into the settings format read by
//! the external hook runner. A manifest is one hook source:
//!
//! ```yaml
//! type: addon
//! name: safety
//! basePath: ./hooks        # optional, relative to the manifest
//! hooks:
//!   PreToolUse:
//!     - matcher: Bash
//!       handler: guard.js
//!       priority: -10
//! ```
//!
//! Manifests are composed in the order given on the command line.
//!
//! - **compose**: print the composed hooks as settings JSON
//! - **list**: show composed handlers per event, optionally only those that
//!   apply to one tool
//! - **sync**: write the composed hooks into a settings file, keeping every
//!   other key of that file

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use log::{debug, info};
use serde_json::Value;

use strata::config;
use strata::hooks::{compose_hooks, to_settings_format, ComposedHooks, HookEvent, HookSource};
use strata::output::{dimmed, emoji, highlight, OutputConfig};
use strata::suggestions;

/// Compose hook manifests into settings
#[derive(Args, Debug)]
pub struct HooksArgs {
    #[command(subcommand)]
    pub command: HooksCommand,
}

#[derive(Subcommand, Debug)]
pub enum HooksCommand {
    /// Print composed hooks in the settings format
    Compose(ComposeArgs),

    /// List composed handlers per event
    List(ListArgs),

    /// Write composed hooks into a settings file
    Sync(SyncArgs),
}

/// Manifest selection shared by every hooks subcommand
#[derive(Args, Debug)]
pub struct SourceArgs {
    /// Hook manifest files (.json, .toml, .yaml), in composition order
    #[arg(required = true, value_name = "MANIFEST")]
    pub manifests: Vec<PathBuf>,

    /// Keep only handlers from this source
    #[arg(long, value_name = "NAME", conflicts_with = "exclude_source")]
    pub only_source: Option<String>,

    /// Drop handlers from this source
    #[arg(long, value_name = "NAME")]
    pub exclude_source: Option<String>,
}

/// Arguments for `hooks compose`
#[derive(Args, Debug)]
pub struct ComposeArgs {
    #[command(flatten)]
    pub sources: SourceArgs,
}

/// Arguments for `hooks list`
#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub sources: SourceArgs,

    /// Show only handlers whose matcher applies to this tool
    #[arg(long, value_name = "TOOL")]
    pub tool: Option<String>,
}

/// Arguments for `hooks sync`
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub sources: SourceArgs,

    /// Settings file to update (created if missing)
    #[arg(long, value_name = "FILE")]
    pub settings: PathBuf,
}

/// Execute the `hooks` command
pub fn execute(args: HooksArgs, output: &OutputConfig) -> Result<()> {
    match args.command {
        HooksCommand::Compose(compose_args) => execute_compose(compose_args),
        HooksCommand::List(list_args) => execute_list(list_args, output),
        HooksCommand::Sync(sync_args) => execute_sync(sync_args, output),
    }
}

fn execute_compose(args: ComposeArgs) -> Result<()> {
    let composed = compose(&args.sources)?;
    let settings = to_settings_format(&composed);
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

fn execute_list(args: ListArgs, output: &OutputConfig) -> Result<()> {
    let composed = compose(&args.sources)?;

    if composed.is_empty() {
        println!("No hooks composed");
        return Ok(());
    }

    for event in HookEvent::ALL {
        let handlers = match &args.tool {
            Some(tool) => composed.matching(event, tool),
            None => composed.get(event).iter().collect(),
        };
        if handlers.is_empty() {
            continue;
        }

        println!("{}", highlight(output, event));
        for handler in handlers {
            println!(
                "  {:>4}  {}  {}",
                handler.priority,
                handler.name,
                dimmed(output, handler.resolved_handler_path.display())
            );
        }
    }
    Ok(())
}

fn execute_sync(args: SyncArgs, output: &OutputConfig) -> Result<()> {
    let composed = compose(&args.sources)?;
    let settings_path = &args.settings;

    let mut document = if settings_path.exists() {
        let content = fs::read_to_string(settings_path)
            .with_context(|| format!("Failed to read {}", settings_path.display()))?;
        if content.trim().is_empty() {
            Value::Object(serde_json::Map::new())
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid settings file {}", settings_path.display()))?
        }
    } else {
        Value::Object(serde_json::Map::new())
    };

    to_settings_format(&composed)
        .write_into(&mut document)
        .with_context(|| format!("Cannot update {}", settings_path.display()))?;

    if let Some(parent) = settings_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut content = serde_json::to_string_pretty(&document)?;
    content.push('\n');
    fs::write(settings_path, content)
        .with_context(|| format!("Failed to write {}", settings_path.display()))?;

    info!("Synced hooks into {}", settings_path.display());
    println!(
        "{} Wrote {} hook(s) from {} source(s) to {}",
        emoji(output, "✅", "[OK]"),
        composed.hook_count(),
        composed.sources().len(),
        settings_path.display()
    );
    Ok(())
}

/// Load the manifests and compose them, then apply the source filters
fn compose(args: &SourceArgs) -> Result<ComposedHooks> {
    let sources = args
        .manifests
        .iter()
        .map(|path| load_manifest(path))
        .collect::<Result<Vec<_>>>()?;

    let mut composed = compose_hooks(&sources);
    if let Some(source) = &args.only_source {
        composed = composed.filter_by_source(source);
    }
    if let Some(source) = &args.exclude_source {
        composed = composed.remove_by_source(source);
    }
    debug!(
        "Composed {} hook(s) from {}",
        composed.hook_count(),
        composed.sources().join(", ")
    );
    Ok(composed)
}

/// Read one hook source, anchoring its base path at the manifest's directory
fn load_manifest(path: &Path) -> Result<HookSource> {
    if !path.exists() {
        return Err(suggestions::input_not_found(path));
    }
    let fragment =
        config::from_file(path).with_context(|| format!("Failed to load {}", path.display()))?;
    let mut source: HookSource = serde_json::from_value(fragment)
        .with_context(|| format!("Invalid hook manifest {}", path.display()))?;

    let manifest_path = std::path::absolute(path)?;
    let manifest_dir = manifest_path.parent().unwrap_or_else(|| Path::new("/"));
    if source.base_path.as_os_str().is_empty() {
        source.base_path = manifest_dir.to_path_buf();
    } else if source.base_path.is_relative() {
        source.base_path = manifest_dir.join(&source.base_path);
    }
    Ok(source)
}
