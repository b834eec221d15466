//! Matcher classification and evaluation
//!
//! A hook matcher is a plain string. Its form decides how it is compared
//! against a tool name:
//!
//! - `/.../` (length above 2) is a regular expression;
//! - anything containing `*`, `?`, `[` or `]` is a glob;
//! - everything else is an exact name.

use glob::Pattern;
use log::warn;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Wildcard matcher that applies to every tool
pub const WILDCARD: &str = "*";

const GLOB_METACHARACTERS: [char; 4] = ['*', '?', '[', ']'];
const MAX_NAME_SEGMENT: usize = 32;

/// How a matcher string is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Glob,
    Regex,
}

impl MatchType {
    /// Classify a matcher; regex is checked before glob
    pub fn classify(pattern: &str) -> Self {
        if pattern.len() > 2 && pattern.starts_with('/') && pattern.ends_with('/') {
            MatchType::Regex
        } else if pattern.contains(GLOB_METACHARACTERS) {
            MatchType::Glob
        } else {
            MatchType::Exact
        }
    }
}

/// Reduce a matcher to a short identifier fragment
///
/// Glob metacharacters are dropped, any other character outside
/// `[A-Za-z0-9_-]` becomes `-`, and the result is cut to 32 characters.
/// An empty result becomes `hook`.
pub fn sanitize(matcher: &str) -> String {
    let sanitized: String = matcher
        .chars()
        .filter(|c| !GLOB_METACHARACTERS.contains(c))
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .take(MAX_NAME_SEGMENT)
        .collect();

    if sanitized.is_empty() {
        "hook".to_string()
    } else {
        sanitized
    }
}

/// Evaluate `pattern` of kind `match_type` against a tool name
///
/// Invalid glob or regex patterns match nothing.
pub fn matches(pattern: &str, match_type: MatchType, tool_name: &str) -> bool {
    match match_type {
        MatchType::Exact => pattern.is_empty() || pattern == WILDCARD || pattern == tool_name,
        MatchType::Glob => match Pattern::new(pattern) {
            Ok(glob) => glob.matches(tool_name),
            Err(err) => {
                warn!("Invalid glob matcher '{}': {}", pattern, err);
                false
            }
        },
        MatchType::Regex => {
            let Some(body) = pattern.strip_prefix('/').and_then(|p| p.strip_suffix('/')) else {
                warn!("Regex matcher '{}' is not enclosed in slashes", pattern);
                return false;
            };
            match Regex::new(body) {
                Ok(regex) => regex.is_match(tool_name),
                Err(err) => {
                    warn!("Invalid regex matcher '{}': {}", pattern, err);
                    false
                }
            }
        }
    }
}
