//! Default values for strata configuration.
//!
//! This module provides centralized default values used by the resolvers and
//! the command-line tool, ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// Maximum number of `extends` links followed from any fragment or profile.
pub const MAX_INHERITANCE_DEPTH: usize = 10;

/// Model used when a profile does not name a default model.
pub const DEFAULT_MODEL: &str = "sonnet";

/// Routing table used when a profile has no `model.routing` table.
///
/// Entries are `(tier, model)` pairs for the `simple`, `standard` and
/// `complex` tiers.
pub const DEFAULT_MODEL_ROUTING: [(&str, &str); 3] = [
    ("simple", "haiku"),
    ("standard", "sonnet"),
    ("complex", "opus"),
];

/// Priority assigned to an agent entry that does not specify one.
pub const DEFAULT_AGENT_PRIORITY: u32 = 50;

/// Priority assigned to a hook matcher that does not specify one.
pub const DEFAULT_HOOK_PRIORITY: i32 = 0;

/// Environment variable overriding the profiles directory.
pub const PROFILES_DIR_ENV: &str = "STRATA_PROFILES_DIR";

/// Returns the default profiles directory.
///
/// Uses the platform-appropriate configuration directory:
/// - Linux: `~/.config/strata/profiles` (XDG Base Directory)
/// - macOS: `~/Library/Application Support/strata/profiles`
/// - Windows: `{FOLDERID_RoamingAppData}\strata\profiles`
///
/// Falls back to `.strata/profiles` in the current directory if the
/// platform configuration directory cannot be determined.
///
/// This can be overridden by the `--profiles-dir` CLI flag or the
/// `STRATA_PROFILES_DIR` environment variable.
pub fn default_profiles_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("strata"))
        .unwrap_or_else(|| PathBuf::from(".strata"))
        .join("profiles")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profiles_dir_returns_path() {
        let dir = default_profiles_dir();
        assert!(dir.ends_with("strata/profiles") || dir.ends_with(".strata/profiles"));
    }

    #[test]
    fn test_default_routing_covers_all_tiers() {
        let tiers: Vec<&str> = DEFAULT_MODEL_ROUTING.iter().map(|(tier, _)| *tier).collect();
        assert_eq!(tiers, vec!["simple", "standard", "complex"]);
    }
}
