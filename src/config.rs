//! # Fragment Loading
//!
//! Configuration fragments reach the core as `serde_json::Value` trees. This
//! module converts between that representation and the on-disk formats
//! fragments are written in, so the merge and inheritance layers stay
//! format-agnostic.
//!
//! ## Supported Formats
//!
//! - **JSON** (`.json`)
//! - **TOML** (`.toml`)
//! - **YAML** (`.yaml`, `.yml`)
//!
//! The format is picked from the file extension. Files with any other
//! extension are rejected with a hint listing the supported ones.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde_json::Value;

use crate::error::{Error, Result};

/// On-disk format of a fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Toml,
    Yaml,
}

/// Extensions recognised by [`Format::from_path`], in lookup order.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["toml", "json", "yaml", "yml"];

impl Format {
    /// Detect the format from a path's extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        extension.parse().map_err(|_| Error::ConfigParse {
            message: format!("Unsupported fragment file: {}", path.display()),
            hint: Some(format!(
                "Use one of the extensions: {}",
                SUPPORTED_EXTENSIONS.join(", ")
            )),
        })
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "toml" => Ok(Format::Toml),
            "yaml" | "yml" => Ok(Format::Yaml),
            other => Err(Error::ConfigParse {
                message: format!("Unknown format '{}'", other),
                hint: Some("Expected json, toml or yaml".to_string()),
            }),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Json => "json",
            Format::Toml => "toml",
            Format::Yaml => "yaml",
        };
        f.write_str(name)
    }
}

/// Parse `content` in the given format into a fragment
pub fn parse(content: &str, format: Format) -> Result<Value> {
    let value = match format {
        Format::Json => serde_json::from_str(content)?,
        Format::Toml => toml::from_str(content)?,
        Format::Yaml => {
            if content.trim().is_empty() {
                Value::Object(serde_json::Map::new())
            } else {
                serde_yaml::from_str(content)?
            }
        }
    };
    Ok(value)
}

/// Load a fragment from a file, picking the format from its extension
pub fn from_file(path: &Path) -> Result<Value> {
    let format = Format::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    parse(&content, format)
}

/// Serialize a fragment in the given format
///
/// TOML cannot represent `null` or a non-table document; such fragments are
/// reported as serialization errors.
pub fn to_string(value: &Value, format: Format) -> Result<String> {
    match format {
        Format::Json => Ok(serde_json::to_string_pretty(value)?),
        Format::Toml => toml::to_string_pretty(value).map_err(|err| Error::Serialization {
            message: format!("Failed to serialize TOML: {}", err),
        }),
        Format::Yaml => Ok(serde_yaml::to_string(value)?),
    }
}
