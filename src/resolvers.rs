//! # Resolver Implementations
//!
//! Concrete [`Resolver`] implementations and decorators for turning an
//! `extends` reference into a fragment.
//!
//! - **`HybridResolver`**: dispatches remote references (`http://`,
//!   `https://`) to one resolver and everything else to another. It composes
//!   over any pair of resolvers and performs no I/O itself.
//! - **`FileResolver`**: loads JSON, TOML or YAML fragments from disk,
//!   resolving relative references against a base directory. A loaded
//!   fragment's own relative `extends` is rebased onto the directory of the
//!   file that names it.
//!
//! Memoization is provided separately by [`crate::cache::CachedResolver`].

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::debug;
use serde_json::Value;
use url::Url;

use crate::config::{self, Format};
use crate::error::Result;
use crate::inheritance::{extends_of, Resolver, EXTENDS_KEY};

/// Whether `reference` should be fetched remotely.
///
/// Only `http` and `https` URLs count as remote; bare paths, relative paths,
/// `file:` URLs and Windows drive paths are local.
pub fn is_remote_reference(reference: &str) -> bool {
    Url::parse(reference)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Routes references between a local and a remote resolver by shape.
#[derive(Debug)]
pub struct HybridResolver<F, U> {
    file_resolver: F,
    url_resolver: U,
}

impl<F, U> HybridResolver<F, U> {
    pub fn new(file_resolver: F, url_resolver: U) -> Self {
        Self {
            file_resolver,
            url_resolver,
        }
    }
}

#[async_trait]
impl<F, U> Resolver for HybridResolver<F, U>
where
    F: Resolver,
    U: Resolver,
{
    async fn resolve(&self, reference: &str) -> Result<Value> {
        if is_remote_reference(reference) {
            debug!("Routing '{}' to the URL resolver", reference);
            self.url_resolver.resolve(reference).await
        } else {
            self.file_resolver.resolve(reference).await
        }
    }
}

/// Loads fragments from the local filesystem.
///
/// Absolute references are read as-is; relative references are joined onto
/// the base directory. When a loaded fragment extends a relative local path,
/// that path is rewritten to be relative to the loaded file's directory, so
/// `../base/parent.toml` extending `grand.toml` resolves to
/// `../base/grand.toml`.
#[derive(Debug, Clone)]
pub struct FileResolver {
    base_dir: PathBuf,
}

impl FileResolver {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Resolver rooted at the directory containing `file`.
    pub fn for_file(file: &Path) -> Self {
        let base_dir = file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::new(base_dir)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// The path a reference is read from
    pub fn path_for(&self, reference: &str) -> PathBuf {
        let path = Path::new(reference);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

#[async_trait]
impl Resolver for FileResolver {
    async fn resolve(&self, reference: &str) -> Result<Value> {
        let path = self.path_for(reference);
        let format = Format::from_path(&path)?;
        debug!("Reading fragment from {}", path.display());
        let content = tokio::fs::read_to_string(&path).await?;
        let mut fragment = config::parse(&content, format)?;
        rebase_extends(reference, &mut fragment);
        Ok(fragment)
    }
}

/// Rewrite a relative local `extends` in `fragment` so it is relative to the
/// directory of `reference` instead of the resolver's base directory.
///
/// A malformed `extends` is left for the inheritance walk to report.
fn rebase_extends(reference: &str, fragment: &mut Value) {
    let Ok(Some(parent_ref)) = extends_of(fragment) else {
        return;
    };
    if is_remote_reference(&parent_ref) || Path::new(&parent_ref).is_absolute() {
        return;
    }
    let dir = match Path::new(reference).parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => return,
    };

    let rebased = dir.join(&parent_ref).to_string_lossy().into_owned();
    debug!("Rebased '{}' from {} to '{}'", parent_ref, reference, rebased);
    if let Some(object) = fragment.as_object_mut() {
        object.insert(EXTENDS_KEY.to_string(), Value::String(rebased));
    }
}
