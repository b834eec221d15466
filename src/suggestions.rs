//! # Error Suggestions
//!
//! Helpers that turn library errors into CLI errors carrying hints. An error
//! should tell the user what went wrong AND how to fix it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use strata::suggestions;
//!
//! // Instead of:
//! anyhow::bail!("Input file not found: {}", path.display());
//!
//! // Use:
//! return Err(suggestions::input_not_found(path));
//! ```

use std::path::Path;

use crate::defaults::PROFILES_DIR_ENV;
use crate::error::Error;

/// Generate an error for a fragment or manifest file that does not exist.
pub fn input_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Input file not found: {path}\n\n\
         hint: Paths are relative to the current directory\n\
         hint: Supported formats are .json, .toml, .yaml and .yml",
        path = path.display()
    )
}

/// Generate an error for an unknown profile name.
///
/// Suggests the closest stored profile when one is within a small edit
/// distance of `name`.
pub fn profile_not_found(name: &str, available: &[String], profiles_dir: &Path) -> anyhow::Error {
    let candidates: Vec<&str> = available.iter().map(String::as_str).collect();
    let did_you_mean = find_similar(name, &candidates)
        .map(|s| format!("\nhint: Did you mean '{s}'?"))
        .unwrap_or_default();

    anyhow::anyhow!(
        "Profile not found: {name}{did_you_mean}\n\n\
         hint: Run 'strata profile list' to see available profiles\n\
         hint: Profiles are read from {dir}\n\
         hint: Use --profiles-dir or set {PROFILES_DIR_ENV} to read another directory",
        dir = profiles_dir.display()
    )
}

/// Generate an error for an `extends` chain that loops back on itself.
pub fn circular_inheritance(reference: &str, path: &[String]) -> anyhow::Error {
    let mut chain = path.to_vec();
    chain.push(reference.to_string());

    anyhow::anyhow!(
        "Circular inheritance: {chain}\n\n\
         hint: Remove the 'extends' key from one of these to break the cycle\n\
         hint: Move settings shared by both into a common parent",
        chain = chain.join(" -> ")
    )
}

/// Generate an error for an `extends` chain that is too long.
pub fn max_depth_exceeded(reference: &str, max_depth: usize) -> anyhow::Error {
    anyhow::anyhow!(
        "Inheritance chain too deep at '{reference}' (maximum {max_depth} levels)\n\n\
         hint: Flatten intermediate layers that only forward to their parent"
    )
}

/// Convert a library error into a CLI error, adding hints where one helps.
///
/// Errors wrapped by a resolver are unwrapped first so that a cycle found
/// while loading a parent still gets its hint.
pub fn explain(error: Error) -> anyhow::Error {
    match error {
        Error::CircularInheritance { reference, path } => circular_inheritance(&reference, &path),
        Error::MaxDepthExceeded {
            reference,
            max_depth,
        } => max_depth_exceeded(&reference, max_depth),
        Error::Resolver { reference, source } if source.is_inheritance_error() => {
            explain(*source).context(format!("While resolving '{reference}'"))
        }
        other => anyhow::Error::new(other),
    }
}

/// Find the candidate closest to `input`, if any is within edit distance 2.
fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .map(|&candidate| (candidate, edit_distance(input, candidate)))
        .filter(|&(_, distance)| distance <= 2 && distance < input.chars().count())
        .min_by_key(|&(_, distance)| distance)
        .map(|(candidate, _)| candidate)
}

/// Levenshtein distance, computed one row at a time.
fn edit_distance(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();

    for (i, a_char) in a.chars().enumerate() {
        let mut current = Vec::with_capacity(previous.len());
        current.push(i + 1);
        for (j, b_char) in b_chars.iter().enumerate() {
            let substitution = previous[j] + usize::from(a_char != *b_char);
            let deletion = previous[j + 1] + 1;
            let insertion = current[j] + 1;
            current.push(substitution.min(deletion).min(insertion));
        }
        previous = current;
    }

    previous[b_chars.len()]
}
