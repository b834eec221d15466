//! # Error Handling
//!
//! This module defines the centralized error type for `strata`. It uses the
//! `thiserror` library to build one `Error` enum covering every failure the
//! resolution layer can surface, with messages that name the offending
//! reference or profile.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. The inheritance variants
//!   (`CircularInheritance`, `MaxDepthExceeded`, `Resolver`,
//!   `ProfileNotFound`) are produced by the core; the remaining variants come
//!   from the file-format and storage adapters.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! The merge and hook composition functions are total and never return an
//! `Error`; only resolution (which crosses the injected resolver boundary)
//! and the adapters are fallible.

use thiserror::Error;

/// Main error type for strata operations
#[derive(Error, Debug)]
pub enum Error {
    /// A reference reappeared on the current `extends` path.
    ///
    /// `path` lists the references already followed, in order, so the
    /// message shows the loop in full.
    #[error(
        "Circular inheritance detected: '{reference}' already appears in {}",
        format_path(path)
    )]
    CircularInheritance {
        reference: String,
        path: Vec<String>,
    },

    /// The `extends` chain is longer than the allowed depth.
    #[error("Maximum inheritance depth of {max_depth} exceeded while resolving '{reference}'")]
    MaxDepthExceeded { reference: String, max_depth: usize },

    /// The injected resolver failed for a reference.
    #[error("Failed to resolve '{reference}': {source}")]
    Resolver {
        reference: String,
        #[source]
        source: Box<Error>,
    },

    /// Profile storage has no profile with this name.
    #[error("Profile not found: {name}")]
    ProfileNotFound { name: String },

    /// A configuration fragment could not be parsed or has the wrong shape.
    #[error("Configuration parsing error: {message}{}", format_hint(hint))]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A TOML parsing error, wrapped from `toml::de::Error`.
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// An error indicating that a mutex or other lock has been poisoned.
    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },

    /// An error occurred during serialization.
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

fn format_hint(hint: &Option<String>) -> String {
    hint.as_ref()
        .map(|h| format!("\n  hint: {}", h))
        .unwrap_or_default()
}

fn format_path(path: &[String]) -> String {
    if path.is_empty() {
        "an empty path".to_string()
    } else {
        path.join(" -> ")
    }
}

impl Error {
    /// Wrap a resolver failure for `reference`.
    pub fn resolver(reference: impl Into<String>, source: Error) -> Self {
        Error::Resolver {
            reference: reference.into(),
            source: Box::new(source),
        }
    }

    /// Whether this error is one of the inheritance-structure failures
    /// (cycle or depth) rather than a fetch or parse failure.
    pub fn is_inheritance_error(&self) -> bool {
        matches!(
            self,
            Error::CircularInheritance { .. } | Error::MaxDepthExceeded { .. }
        )
    }
}
