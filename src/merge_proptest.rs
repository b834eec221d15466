//! Property-based tests for merging and matcher sanitizing.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::hooks::matcher::sanitize;
    use crate::merge::{merge, merge_enabled_disabled, EnabledDisabled};
    use proptest::prelude::*;
    use serde_json::{Map, Value};

    /// Arbitrary JSON fragment, a few levels deep
    fn arb_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            "[a-z]{0,8}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-e]", inner, 0..4)
                    .prop_map(|map| Value::Object(map.into_iter().collect::<Map<_, _>>())),
            ]
        })
    }

    fn arb_object() -> impl Strategy<Value = Value> {
        prop::collection::btree_map("[a-e]", arb_value(), 0..5)
            .prop_map(|map| Value::Object(map.into_iter().collect()))
    }

    fn arb_names() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[a-f]", 0..6)
    }

    // ============================================================================
    // merge property tests
    // ============================================================================

    proptest! {
        /// Property: merging a single fragment returns an equal value
        #[test]
        fn merge_single_is_identity(value in arb_value()) {
            prop_assert_eq!(merge(std::slice::from_ref(&value)), value);
        }

        /// Property: the empty object is a left identity for objects
        #[test]
        fn merge_empty_object_left_identity(value in arb_object()) {
            let merged = merge(&[Value::Object(Map::new()), value.clone()]);
            prop_assert_eq!(merged, value);
        }

        /// Property: merging a fragment onto itself changes nothing
        #[test]
        fn merge_is_idempotent(value in arb_object()) {
            prop_assert_eq!(merge(&[value.clone(), value.clone()]), value);
        }

        /// Property: every top-level key of the last fragment wins unless both sides are objects
        #[test]
        fn merge_last_non_object_wins(base in arb_object(), top in arb_object()) {
            let merged = merge(&[base, top.clone()]);
            for (key, value) in top.as_object().unwrap() {
                if !value.is_object() {
                    prop_assert_eq!(&merged[key.as_str()], value);
                }
            }
        }

        /// Property: keys absent from the later fragment are kept from the earlier one
        #[test]
        fn merge_keeps_absent_keys(base in arb_object(), top in arb_object()) {
            let merged = merge(&[base.clone(), top.clone()]);
            let top = top.as_object().unwrap();
            for (key, value) in base.as_object().unwrap() {
                if !top.contains_key(key) {
                    prop_assert_eq!(&merged[key.as_str()], value);
                }
            }
        }
    }

    // ============================================================================
    // enabled/disabled property tests
    // ============================================================================

    proptest! {
        /// Property: the override decides every name it mentions, and disabling wins
        #[test]
        fn enabled_disabled_override_decides(
            base_on in arb_names(), base_off in arb_names(),
            over_on in arb_names(), over_off in arb_names(),
        ) {
            let merged = merge_enabled_disabled(
                &EnabledDisabled::new(base_on, base_off),
                &EnabledDisabled::new(over_on.clone(), over_off.clone()),
            );
            for name in &over_off {
                prop_assert!(merged.disabled.contains(name));
                prop_assert!(!merged.enabled.contains(name));
            }
            for name in over_on.iter().filter(|name| !over_off.contains(name)) {
                prop_assert!(merged.enabled.contains(name));
                prop_assert!(!merged.disabled.contains(name));
            }
        }

        /// Property: output lists are sorted and free of duplicates
        #[test]
        fn enabled_disabled_sorted_unique(on in arb_names(), off in arb_names()) {
            let merged = merge_enabled_disabled(
                &EnabledDisabled::default(),
                &EnabledDisabled::new(on, off),
            );
            prop_assert!(merged.enabled.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(merged.disabled.windows(2).all(|w| w[0] < w[1]));
        }
    }

    // ============================================================================
    // sanitize property tests
    // ============================================================================

    proptest! {
        /// Property: sanitize only emits identifier-safe characters
        #[test]
        fn sanitize_output_is_safe(input in ".*") {
            let result = sanitize(&input);
            prop_assert!(!result.is_empty());
            prop_assert!(result.chars().count() <= 32);
            prop_assert!(result
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'));
        }

        /// Property: plain identifiers up to 32 characters pass through
        #[test]
        fn sanitize_preserves_identifiers(input in "[A-Za-z0-9_-]{1,32}") {
            prop_assert_eq!(sanitize(&input), input);
        }
    }
}
