//! # Profile Command Implementation
//!
//! `strata profile` reads named profiles from a profiles directory (one
//! `<name>.toml|json|yaml|yml` file per profile) and resolves their
//! inheritance chains.
//!
//! - **list**: names of all stored profiles
//! - **show**: the resolved view of one profile, optionally with an override
//!   fragment layered on top
//! - **chain**: the inheritance chain of one profile, root first

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use strata::config;
use strata::defaults::{default_profiles_dir, PROFILES_DIR_ENV};
use strata::error::Error;
use strata::output::{dimmed, highlight, OutputConfig};
use strata::profile::ProfileResolver;
use strata::storage::DirectoryStorage;
use strata::suggestions;

use super::{render, OutputFormat};

/// Inspect and resolve named profiles
#[derive(Args, Debug)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommand,

    /// Directory holding profile files.
    ///
    /// Defaults to `strata/profiles` under the user configuration directory.
    #[arg(long, global = true, value_name = "DIR", env = PROFILES_DIR_ENV)]
    pub profiles_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    /// List stored profiles
    List,

    /// Show the resolved view of a profile
    Show(ShowArgs),

    /// Show the inheritance chain of a profile, root first
    Chain(ChainArgs),
}

/// Arguments for `profile show`
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Profile name
    pub name: String,

    /// Fragment file layered on top of the resolved profile
    #[arg(long, value_name = "FILE")]
    pub overrides: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,
}

/// Arguments for `profile chain`
#[derive(Args, Debug)]
pub struct ChainArgs {
    /// Profile name
    pub name: String,
}

/// Execute the `profile` command
pub async fn execute(args: ProfileArgs, output: &OutputConfig) -> Result<()> {
    let profiles_dir = args.profiles_dir.unwrap_or_else(default_profiles_dir);
    let resolver = ProfileResolver::new(DirectoryStorage::new(&profiles_dir));

    match args.command {
        ProfileCommand::List => execute_list(&resolver, output).await,
        ProfileCommand::Show(show_args) => execute_show(&resolver, show_args).await,
        ProfileCommand::Chain(chain_args) => execute_chain(&resolver, chain_args, output).await,
    }
}

async fn execute_list(
    resolver: &ProfileResolver<DirectoryStorage>,
    output: &OutputConfig,
) -> Result<()> {
    let names = resolver.list().await?;
    if names.is_empty() {
        println!(
            "No profiles in {}",
            dimmed(output, resolver.storage().root().display())
        );
        return Ok(());
    }
    for name in names {
        println!("{}", highlight(output, name));
    }
    Ok(())
}

async fn execute_show(resolver: &ProfileResolver<DirectoryStorage>, args: ShowArgs) -> Result<()> {
    let rendered = match &args.overrides {
        Some(path) => {
            let overrides = load_overrides(path)?;
            match resolver.with_overrides(&args.name, &overrides).await {
                Ok(resolved) => render(&resolved, args.format)?,
                Err(err) => return Err(explain(resolver, &args.name, err).await),
            }
        }
        None => match resolver.resolve(&args.name).await {
            Ok(resolution) => render(&resolution, args.format)?,
            Err(err) => return Err(explain(resolver, &args.name, err).await),
        },
    };
    print!("{}", rendered);
    Ok(())
}

async fn execute_chain(
    resolver: &ProfileResolver<DirectoryStorage>,
    args: ChainArgs,
    output: &OutputConfig,
) -> Result<()> {
    let resolution = match resolver.resolve(&args.name).await {
        Ok(resolution) => resolution,
        Err(err) => return Err(explain(resolver, &args.name, err).await),
    };

    let links = resolution.inheritance_chain.len() - 1;
    let chain: Vec<String> = resolution
        .inheritance_chain
        .iter()
        .map(|name| highlight(output, name))
        .collect();
    println!(
        "{} {}",
        chain.join(" -> "),
        dimmed(output, format!("({} {})", links, if links == 1 { "link" } else { "links" }))
    );
    Ok(())
}

fn load_overrides(path: &Path) -> Result<serde_json::Value> {
    if !path.exists() {
        return Err(suggestions::input_not_found(path));
    }
    config::from_file(path).with_context(|| format!("Failed to load {}", path.display()))
}

/// Attach hints to a resolution failure
async fn explain(
    resolver: &ProfileResolver<DirectoryStorage>,
    name: &str,
    error: Error,
) -> anyhow::Error {
    match error {
        Error::ProfileNotFound { name: missing } => {
            // A listing failure only loses the suggestion.
            let available = resolver.list().await.unwrap_or_default();
            let root = resolver.storage().root();
            let err = suggestions::profile_not_found(&missing, &available, root);
            if missing == name {
                err
            } else {
                err.context(format!("While resolving profile '{}'", name))
            }
        }
        other => suggestions::explain(other),
    }
}
