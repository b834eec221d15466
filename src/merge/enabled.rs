//! Enabled/disabled set merging
//!
//! Several configuration sections (skills, MCP servers, plugins) are
//! expressed as a pair of string lists: the names switched on and the names
//! switched off. Unlike the generic deep merge, which replaces arrays, these
//! pairs are merged as sets so that a later layer can toggle individual
//! entries without restating the whole list.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

/// A pair of enabled and disabled name lists.
///
/// Missing fields deserialize as empty lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnabledDisabled {
    #[serde(default)]
    pub enabled: Vec<String>,
    #[serde(default)]
    pub disabled: Vec<String>,
}

impl EnabledDisabled {
    pub fn new<E, D>(enabled: E, disabled: D) -> Self
    where
        E: IntoIterator,
        E::Item: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        Self {
            enabled: enabled.into_iter().map(Into::into).collect(),
            disabled: disabled.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty() && self.disabled.is_empty()
    }

    /// Union both lists with `other`, keeping first-seen order.
    ///
    /// Entries of `self` come first; entries of `other` not already present
    /// are appended. No entry moves between the two lists.
    pub fn union(&self, other: &EnabledDisabled) -> EnabledDisabled {
        EnabledDisabled {
            enabled: union_ordered(&self.enabled, &other.enabled),
            disabled: union_ordered(&self.disabled, &other.disabled),
        }
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.enabled.iter().any(|entry| entry == name)
            && !self.disabled.iter().any(|entry| entry == name)
    }
}

/// Merge `override_` on top of `base`.
///
/// Names enabled by the override move to the enabled set and names disabled
/// by the override move to the disabled set. When the override lists a name
/// under both, it ends up disabled. Both output lists are deduplicated and
/// sorted.
pub fn merge_enabled_disabled(
    base: &EnabledDisabled,
    override_: &EnabledDisabled,
) -> EnabledDisabled {
    let mut enabled: BTreeSet<&str> = base.enabled.iter().map(String::as_str).collect();
    let mut disabled: BTreeSet<&str> = base.disabled.iter().map(String::as_str).collect();

    for name in &override_.enabled {
        enabled.insert(name);
        disabled.remove(name.as_str());
    }

    // Applied second so that disabled wins a conflicting override.
    for name in &override_.disabled {
        disabled.insert(name);
        enabled.remove(name.as_str());
    }

    EnabledDisabled {
        enabled: enabled.into_iter().map(str::to_string).collect(),
        disabled: disabled.into_iter().map(str::to_string).collect(),
    }
}

fn union_ordered(first: &[String], second: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    first
        .iter()
        .chain(second)
        .filter(|name| seen.insert(name.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(enabled: &[&str], disabled: &[&str]) -> EnabledDisabled {
        EnabledDisabled::new(enabled.iter().copied(), disabled.iter().copied())
    }

    #[test]
    fn test_override_enable_moves_out_of_disabled() {
        let merged = merge_enabled_disabled(&pair(&[], &["a", "b"]), &pair(&["a"], &[]));
        assert_eq!(merged.enabled, vec!["a"]);
        assert_eq!(merged.disabled, vec!["b"]);
    }

    #[test]
    fn test_override_disable_moves_out_of_enabled() {
        let merged = merge_enabled_disabled(&pair(&["a", "b"], &[]), &pair(&[], &["b"]));
        assert_eq!(merged.enabled, vec!["a"]);
        assert_eq!(merged.disabled, vec!["b"]);
    }

    #[test]
    fn test_conflicting_override_disables() {
        let merged = merge_enabled_disabled(&pair(&["a"], &[]), &pair(&["a"], &["a"]));
        assert!(merged.enabled.is_empty());
        assert_eq!(merged.disabled, vec!["a"]);
    }

    #[test]
    fn test_output_is_sorted_and_deduplicated() {
        let merged = merge_enabled_disabled(
            &pair(&["zeta", "alpha", "alpha"], &["m"]),
            &pair(&["beta", "zeta"], &["m"]),
        );
        assert_eq!(merged.enabled, vec!["alpha", "beta", "zeta"]);
        assert_eq!(merged.disabled, vec!["m"]);
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let base: EnabledDisabled = serde_json::from_str(r#"{"disabled": ["x"]}"#).unwrap();
        let override_: EnabledDisabled = serde_json::from_str("{}").unwrap();
        let merged = merge_enabled_disabled(&base, &override_);
        assert!(merged.enabled.is_empty());
        assert_eq!(merged.disabled, vec!["x"]);
    }

    #[test]
    fn test_union_keeps_order_and_both_lists() {
        let parent = pair(&["b", "a"], &["x"]);
        let child = pair(&["a", "c"], &["b"]);
        let merged = parent.union(&child);
        assert_eq!(merged.enabled, vec!["b", "a", "c"]);
        assert_eq!(merged.disabled, vec!["x", "b"]);
    }

    #[test]
    fn test_is_enabled_respects_disabled() {
        let set = pair(&["a", "b"], &["b"]);
        assert!(set.is_enabled("a"));
        assert!(!set.is_enabled("b"));
        assert!(!set.is_enabled("c"));
    }
}
