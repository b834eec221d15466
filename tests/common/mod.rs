//! Shared test utilities for integration and E2E tests.
//!
//! Add `mod common;` to a test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_profile("base", fixtures::BASE_PROFILE);
//!     fixture.command().args(["profile", "list"]).assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::fixtures;
    pub use super::TestFixture;
}

/// Profile and manifest snippets for testing.
#[allow(dead_code)]
pub mod fixtures {
    /// Root profile with skills, an agent and a model table.
    pub const BASE_PROFILE: &str = r#"
name = "base"
description = "Shared defaults"

[skills]
enabled = ["git", "search"]

[mcp]
enabled = ["filesystem"]

[agents.reviewer]
model = "opus"
priority = 80

[model]
default = "opus"

[model.routing]
simple = "haiku"
"#;

    /// Profile extending `base`.
    pub const WORK_PROFILE: &str = r#"
name = "work"
extends = "base"

[skills]
enabled = ["jira"]
disabled = ["search"]

[agents.reviewer]
priority = 10

[agents.planner]
model = "sonnet"
"#;

    /// Profiles extending each other.
    pub const LOOP_A: &str = "name = \"loop-a\"\nextends = \"loop-b\"\n";
    pub const LOOP_B: &str = "name = \"loop-b\"\nextends = \"loop-a\"\n";

    /// Hook manifest contributing two PreToolUse handlers.
    pub const SAFETY_MANIFEST: &str = r#"{
  "type": "addon",
  "name": "safety",
  "hooks": {
    "PreToolUse": [
      { "matcher": "Bash", "handler": "hooks/guard.js", "priority": -10 },
      { "matcher": "*", "handler": "hooks/audit.js" }
    ]
  }
}"#;

    /// Hook manifest from the user's own configuration.
    pub const USER_MANIFEST: &str = r#"
type: user
name: user
basePath: scripts
hooks:
  PostToolUse:
    - matcher: "Edit|Write"
      handler: format.js
      priority: 5
  Stop:
    - matcher: "*"
      handler: notify.js
      enabled: false
"#;

    /// Invalid TOML for error testing.
    pub const INVALID_TOML: &str = "name = [unterminated";
}

/// A temporary directory populated with fragments, profiles and manifests.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Add `profiles/<name>.toml` with the given content.
    pub fn with_profile(self, name: &str, content: &str) -> Self {
        let path = format!("profiles/{}.toml", name);
        self.with_file(&path, content)
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Directory that `with_profile` writes into.
    pub fn profiles_dir(&self) -> PathBuf {
        self.temp_dir.path().join("profiles")
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command running in this fixture's directory.
    ///
    /// Environment that would change the output (colors, log filters, a
    /// profiles directory from the caller's shell) is cleared.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("strata");
        cmd.current_dir(self.path())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .env_remove("STRATA_PROFILES_DIR");
        cmd
    }

    /// Create a `profile` command pointed at this fixture's profiles.
    #[allow(dead_code)]
    pub fn profile_command(&self) -> assert_cmd::Command {
        let mut cmd = self.command();
        cmd.arg("profile").arg("--profiles-dir").arg(self.profiles_dir());
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_profile() {
        let fixture = TestFixture::new().with_profile("base", fixtures::BASE_PROFILE);
        assert!(fixture.profiles_dir().join("base.toml").exists());
    }

    #[test]
    fn test_profile_fixtures_are_valid_toml() {
        for profile in [
            fixtures::BASE_PROFILE,
            fixtures::WORK_PROFILE,
            fixtures::LOOP_A,
            fixtures::LOOP_B,
        ] {
            toml::from_str::<toml::Value>(profile).expect("Profile should be valid TOML");
        }
        assert!(toml::from_str::<toml::Value>(fixtures::INVALID_TOML).is_err());
    }

    #[test]
    fn test_manifest_fixtures_parse() {
        serde_json::from_str::<serde_json::Value>(fixtures::SAFETY_MANIFEST)
            .expect("Manifest should be valid JSON");
        serde_yaml::from_str::<serde_yaml::Value>(fixtures::USER_MANIFEST)
            .expect("Manifest should be valid YAML");
    }
}
