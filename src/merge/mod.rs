//! Deep merge of configuration fragments
//!
//! This module combines an ordered list of fragments into one. Fragments are
//! `serde_json::Value` trees; whatever format a fragment was loaded from
//! (JSON, TOML, YAML) it is merged the same way.
//!
//! ## Rules
//!
//! - Fragments are folded left to right; later fragments take precedence.
//! - When both sides of a key are objects, they are merged recursively.
//! - Anything else (scalars, arrays, `null`, or a type change) replaces the
//!   earlier value wholesale. Arrays are never concatenated.
//! - A key absent from a later fragment leaves the earlier value untouched,
//!   while an explicit `null` clears it.
//!
//! Set-valued enabled/disabled pairs follow different rules and live in
//! [`enabled`].
//!
//! ## Example
//!
//! ```
//! use serde_json::json;
//! use strata::merge::merge;
//!
//! let merged = merge(&[
//!     json!({"settings": {"debug": true, "level": 1}, "tags": ["a", "b"]}),
//!     json!({"settings": {"level": 5}, "tags": ["c"]}),
//! ]);
//! assert_eq!(
//!     merged,
//!     json!({"settings": {"debug": true, "level": 5}, "tags": ["c"]})
//! );
//! ```

pub mod enabled;

use serde_json::{Map, Value};

pub use enabled::{merge_enabled_disabled, EnabledDisabled};

/// Merge `fragments` into a single fragment.
///
/// Zero fragments produce an empty object and a single fragment produces an
/// owned copy of it.
pub fn merge(fragments: &[Value]) -> Value {
    let Some((first, rest)) = fragments.split_first() else {
        return Value::Object(Map::new());
    };

    let mut merged = first.clone();
    for fragment in rest {
        merge_into(&mut merged, fragment);
    }
    merged
}

/// Merge `incoming` on top of `target` in place.
///
/// This is the pairwise step of [`merge`].
pub fn merge_into(target: &mut Value, incoming: &Value) {
    match (target, incoming) {
        (Value::Object(target_map), Value::Object(incoming_map)) => {
            for (key, value) in incoming_map {
                match target_map.get_mut(key) {
                    Some(existing) => merge_into(existing, value),
                    None => {
                        target_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, incoming) => *target = incoming.clone(),
    }
}
