//! # Profile Storage
//!
//! The profile resolver never touches disk itself; it reads profiles through
//! the [`ProfileStorage`] trait. This allows the lookup to be swapped out,
//! which is particularly useful for testing.
//!
//! - **`MemoryStorage`**: profiles held in a map, for tests and embedding.
//! - **`DirectoryStorage`**: one file per profile in a directory, named
//!   `<name>.toml`, `<name>.json`, `<name>.yaml` or `<name>.yml`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use walkdir::WalkDir;

use crate::config::{self, Format, SUPPORTED_EXTENSIONS};
use crate::error::{Error, Result};
use crate::profile::Profile;

/// Source of named profiles.
#[async_trait]
pub trait ProfileStorage: Send + Sync {
    /// Read a profile by name, or `None` when it does not exist.
    async fn read_profile(&self, name: &str) -> Result<Option<Profile>>;

    /// Names of all stored profiles.
    async fn list_profiles(&self) -> Result<Vec<String>>;
}

#[async_trait]
impl<S: ProfileStorage + ?Sized> ProfileStorage for Arc<S> {
    async fn read_profile(&self, name: &str) -> Result<Option<Profile>> {
        (**self).read_profile(name).await
    }

    async fn list_profiles(&self) -> Result<Vec<String>> {
        (**self).list_profiles().await
    }
}

/// In-memory profile storage
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    profiles: BTreeMap<String, Profile>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a profile under its own name, replacing any previous entry
    pub fn insert(&mut self, profile: Profile) {
        self.profiles.insert(profile.name.clone(), profile);
    }

    /// Builder-style variant of [`MemoryStorage::insert`]
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.insert(profile);
        self
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[async_trait]
impl ProfileStorage for MemoryStorage {
    async fn read_profile(&self, name: &str) -> Result<Option<Profile>> {
        Ok(self.profiles.get(name).cloned())
    }

    async fn list_profiles(&self) -> Result<Vec<String>> {
        Ok(self.profiles.keys().cloned().collect())
    }
}

/// Directory-backed profile storage
#[derive(Debug, Clone)]
pub struct DirectoryStorage {
    root: PathBuf,
}

impl DirectoryStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find the file holding `name`, trying each supported extension in turn
    pub fn profile_path(&self, name: &str) -> Result<Option<PathBuf>> {
        validate_profile_name(name)?;
        Ok(SUPPORTED_EXTENSIONS
            .iter()
            .map(|ext| self.root.join(format!("{}.{}", name, ext)))
            .find(|path| path.is_file()))
    }
}

#[async_trait]
impl ProfileStorage for DirectoryStorage {
    async fn read_profile(&self, name: &str) -> Result<Option<Profile>> {
        let Some(path) = self.profile_path(name)? else {
            debug!("No profile file for '{}' in {}", name, self.root.display());
            return Ok(None);
        };

        let format = Format::from_path(&path)?;
        let content = tokio::fs::read_to_string(&path).await?;
        let fragment = config::parse(&content, format)?;

        let mut profile: Profile =
            serde_json::from_value(fragment).map_err(|err| Error::ConfigParse {
                message: format!("Invalid profile {}: {}", path.display(), err),
                hint: None,
            })?;
        if profile.name.is_empty() {
            profile.name = name.to_string();
        }
        Ok(Some(profile))
    }

    async fn list_profiles(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|err| Error::Io(err.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if Format::from_path(path).is_err() {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }

        names.sort();
        names.dedup();
        Ok(names)
    }
}

/// Reject names that would escape the storage directory
fn validate_profile_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\']);
    if invalid {
        return Err(Error::ConfigParse {
            message: format!("Invalid profile name '{}'", name),
            hint: Some("Profile names cannot be empty or contain path separators".to_string()),
        });
    }
    Ok(())
}
