//! # Inheritance Resolution
//!
//! A fragment may name a parent through a top-level `extends` reference (a
//! file path or URL). This module walks that chain through an injected
//! [`Resolver`] and merges every ancestor beneath the fragment, so that the
//! fragment's own values win over its parent's, the parent's over the
//! grandparent's, and so on.
//!
//! ## Process
//!
//! 1.  **Walk**: Starting from the fragment, each `extends` reference is
//!     handed to the resolver and the returned parent is inspected for its
//!     own `extends`. Parents are fetched one at a time, in chain order.
//!
//! 2.  **Cycle Detection**: The references already followed form the current
//!     path. A reference that reappears on that path aborts the walk with
//!     [`Error::CircularInheritance`] before the resolver is called again.
//!     The path is local to one call, so concurrent resolutions never share
//!     cycle state.
//!
//! 3.  **Depth Guard**: Following more than [`MAX_INHERITANCE_DEPTH`] links
//!     aborts with [`Error::MaxDepthExceeded`].
//!
//! 4.  **Merge**: The ancestors are merged root-first with the fragment on
//!     top using [`crate::merge::merge`], and `extends` is removed from the
//!     result.
//!
//! Resolver decorators live in [`crate::cache`] (memoization) and
//! [`crate::resolvers`] (local/remote dispatch and file loading).

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use serde_json::Value;

use crate::defaults::MAX_INHERITANCE_DEPTH;
use crate::error::{Error, Result};
use crate::merge::merge;

/// Key holding the parent reference of a fragment.
pub const EXTENDS_KEY: &str = "extends";

/// Fetches the fragment a reference points to.
///
/// Implementations may read files, query a network service or look into a
/// map. Failures are wrapped in [`Error::Resolver`] by the walk.
#[async_trait]
pub trait Resolver: Send + Sync {
    async fn resolve(&self, reference: &str) -> Result<Value>;
}

#[async_trait]
impl<R: Resolver + ?Sized> Resolver for Arc<R> {
    async fn resolve(&self, reference: &str) -> Result<Value> {
        (**self).resolve(reference).await
    }
}

#[async_trait]
impl<R: Resolver + ?Sized> Resolver for Box<R> {
    async fn resolve(&self, reference: &str) -> Result<Value> {
        (**self).resolve(reference).await
    }
}

/// Adapts an async closure into a [`Resolver`].
///
/// ```
/// use serde_json::json;
/// use strata::error::Error;
/// use strata::inheritance::FnResolver;
///
/// let resolver = FnResolver::new(|reference: String| async move {
///     Ok::<_, Error>(json!({ "name": reference }))
/// });
/// # let _ = resolver;
/// ```
pub struct FnResolver<F> {
    func: F,
}

impl<F> FnResolver<F> {
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<F, Fut> Resolver for FnResolver<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value>> + Send + 'static,
{
    async fn resolve(&self, reference: &str) -> Result<Value> {
        (self.func)(reference.to_string()).await
    }
}

/// Resolve the full `extends` chain of `fragment` and merge it.
///
/// A fragment without `extends` is returned as a copy, normalized to have no
/// `extends` key, and the resolver is never called.
pub async fn resolve_inheritance<R>(fragment: &Value, resolver: &R) -> Result<Value>
where
    R: Resolver + ?Sized,
{
    let ancestors = walk_chain(fragment, resolver).await?;

    let mut layers: Vec<Value> = ancestors.into_iter().rev().map(|(_, parent)| parent).collect();
    layers.push(fragment.clone());

    let mut resolved = merge(&layers);
    strip_extends(&mut resolved);
    Ok(resolved)
}

/// Return the ancestor references of `fragment`, root-first.
///
/// The fragment itself is not included. An empty list means the fragment has
/// no `extends`.
pub async fn get_inheritance_chain<R>(fragment: &Value, resolver: &R) -> Result<Vec<String>>
where
    R: Resolver + ?Sized,
{
    let ancestors = walk_chain(fragment, resolver).await?;
    Ok(ancestors
        .into_iter()
        .rev()
        .map(|(reference, _)| reference)
        .collect())
}

/// Read the `extends` reference of a fragment.
///
/// A missing or `null` value means no parent; any other non-string value is
/// rejected.
pub fn extends_of(fragment: &Value) -> Result<Option<String>> {
    match fragment.get(EXTENDS_KEY) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(reference)) => Ok(Some(reference.clone())),
        Some(other) => Err(Error::ConfigParse {
            message: format!("'{}' must be a string, found {}", EXTENDS_KEY, other),
            hint: Some("Reference a single parent by path or URL".to_string()),
        }),
    }
}

/// Check whether following `reference` is allowed from the current `path`
/// after `links` links have already been followed.
///
/// Shared by fragment and profile resolution so both apply the same cycle
/// and depth rules. The cycle check runs first.
pub(crate) fn guard_link(reference: &str, path: &[String], links: usize) -> Result<()> {
    if path.iter().any(|seen| seen == reference) {
        return Err(Error::CircularInheritance {
            reference: reference.to_string(),
            path: path.to_vec(),
        });
    }
    if links >= MAX_INHERITANCE_DEPTH {
        return Err(Error::MaxDepthExceeded {
            reference: reference.to_string(),
            max_depth: MAX_INHERITANCE_DEPTH,
        });
    }
    Ok(())
}

/// Follow `extends` links from `fragment`, returning `(reference, parent)`
/// pairs nearest-first.
async fn walk_chain<R>(fragment: &Value, resolver: &R) -> Result<Vec<(String, Value)>>
where
    R: Resolver + ?Sized,
{
    let mut path: Vec<String> = Vec::new();
    let mut ancestors = Vec::new();
    let mut next = extends_of(fragment)?;

    while let Some(reference) = next {
        guard_link(&reference, &path, path.len())?;

        debug!("Resolving inherited fragment '{}' (depth {})", reference, path.len() + 1);
        let parent = resolver
            .resolve(&reference)
            .await
            .map_err(|err| Error::resolver(reference.as_str(), err))?;

        next = extends_of(&parent)?;
        path.push(reference.clone());
        ancestors.push((reference, parent));
    }

    Ok(ancestors)
}

fn strip_extends(fragment: &mut Value) {
    if let Value::Object(map) = fragment {
        map.remove(EXTENDS_KEY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Map-backed resolver that counts lookups.
    struct MapResolver {
        fragments: HashMap<String, Value>,
        calls: AtomicUsize,
    }

    impl MapResolver {
        fn new(entries: &[(&str, Value)]) -> Self {
            Self {
                fragments: entries
                    .iter()
                    .map(|(reference, value)| (reference.to_string(), value.clone()))
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Resolver for MapResolver {
        async fn resolve(&self, reference: &str) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.fragments
                .get(reference)
                .cloned()
                .ok_or_else(|| Error::ConfigParse {
                    message: format!("unknown reference {}", reference),
                    hint: None,
                })
        }
    }

    fn three_level_resolver() -> MapResolver {
        MapResolver::new(&[
            (
                "parent.toml",
                json!({"extends": "grandparent.toml", "parentField": "p", "shared": "parent"}),
            ),
            (
                "grandparent.toml",
                json!({
                    "grandparentField": "g",
                    "shared": "grandparent",
                    "nested": {"a": 1, "b": 1}
                }),
            ),
        ])
    }

    #[tokio::test]
    async fn test_no_extends_returns_copy_without_calling_resolver() {
        let resolver = MapResolver::new(&[]);
        let resolved = resolve_inheritance(&json!({"x": 1}), &resolver).await.unwrap();
        assert_eq!(resolved, json!({"x": 1}));
        assert_eq!(resolver.calls(), 0);
    }

    #[tokio::test]
    async fn test_null_extends_is_stripped() {
        let resolver = MapResolver::new(&[]);
        let resolved = resolve_inheritance(&json!({"x": 1, "extends": null}), &resolver)
            .await
            .unwrap();
        assert_eq!(resolved, json!({"x": 1}));
    }

    #[tokio::test]
    async fn test_three_level_chain_child_wins() {
        let resolver = three_level_resolver();
        let child = json!({
            "extends": "parent.toml",
            "childField": "c",
            "shared": "child",
            "nested": {"b": 2}
        });

        let resolved = resolve_inheritance(&child, &resolver).await.unwrap();
        assert_eq!(
            resolved,
            json!({
                "childField": "c",
                "parentField": "p",
                "grandparentField": "g",
                "shared": "child",
                "nested": {"a": 1, "b": 2}
            })
        );
        assert_eq!(resolver.calls(), 2);
    }

    #[tokio::test]
    async fn test_inheritance_chain_is_root_first() {
        let resolver = three_level_resolver();
        let child = json!({"extends": "parent.toml"});
        let chain = get_inheritance_chain(&child, &resolver).await.unwrap();
        assert_eq!(chain, vec!["grandparent.toml", "parent.toml"]);
    }

    #[tokio::test]
    async fn test_inheritance_chain_empty_without_extends() {
        let resolver = MapResolver::new(&[]);
        let chain = get_inheritance_chain(&json!({"a": 1}), &resolver).await.unwrap();
        assert!(chain.is_empty());
    }

    #[tokio::test]
    async fn test_cycle_is_detected() {
        let resolver = MapResolver::new(&[
            ("a.toml", json!({"extends": "b.toml"})),
            ("b.toml", json!({"extends": "a.toml"})),
        ]);
        let err = resolve_inheritance(&json!({"extends": "a.toml"}), &resolver)
            .await
            .unwrap_err();

        match err {
            Error::CircularInheritance { reference, path } => {
                assert_eq!(reference, "a.toml");
                assert_eq!(path, vec!["a.toml", "b.toml"]);
            }
            other => panic!("expected cycle error, got {other:?}"),
        }
        // The repeated reference is never fetched a second time
        assert_eq!(resolver.calls(), 2);
    }

    #[tokio::test]
    async fn test_self_reference_is_a_cycle() {
        let resolver = MapResolver::new(&[("self.toml", json!({"extends": "self.toml"}))]);
        let err = resolve_inheritance(&json!({"extends": "self.toml"}), &resolver)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CircularInheritance { .. }));
    }

    #[tokio::test]
    async fn test_depth_limit_is_distinct_from_cycle() {
        let entries: Vec<(String, Value)> = (0..16)
            .map(|level| {
                (
                    format!("level-{level}"),
                    json!({"extends": format!("level-{}", level + 1), "level": level}),
                )
            })
            .collect();
        let borrowed: Vec<(&str, Value)> = entries
            .iter()
            .map(|(reference, value)| (reference.as_str(), value.clone()))
            .collect();
        let resolver = MapResolver::new(&borrowed);

        let err = resolve_inheritance(&json!({"extends": "level-0"}), &resolver)
            .await
            .unwrap_err();
        match err {
            Error::MaxDepthExceeded { max_depth, .. } => {
                assert_eq!(max_depth, MAX_INHERITANCE_DEPTH)
            }
            other => panic!("expected depth error, got {other:?}"),
        }
        assert_eq!(resolver.calls(), MAX_INHERITANCE_DEPTH);
    }

    #[tokio::test]
    async fn test_chain_at_depth_limit_resolves() {
        let mut entries: Vec<(String, Value)> = (0..MAX_INHERITANCE_DEPTH - 1)
            .map(|level| {
                (
                    format!("level-{level}"),
                    json!({"extends": format!("level-{}", level + 1)}),
                )
            })
            .collect();
        entries.push((format!("level-{}", MAX_INHERITANCE_DEPTH - 1), json!({"root": true})));
        let borrowed: Vec<(&str, Value)> = entries
            .iter()
            .map(|(reference, value)| (reference.as_str(), value.clone()))
            .collect();
        let resolver = MapResolver::new(&borrowed);

        let resolved = resolve_inheritance(&json!({"extends": "level-0"}), &resolver)
            .await
            .unwrap();
        assert_eq!(resolved, json!({"root": true}));
    }

    #[tokio::test]
    async fn test_resolver_failure_is_wrapped() {
        let resolver = MapResolver::new(&[]);
        let err = resolve_inheritance(&json!({"extends": "missing.toml"}), &resolver)
            .await
            .unwrap_err();
        match err {
            Error::Resolver { reference, source } => {
                assert_eq!(reference, "missing.toml");
                assert!(source.to_string().contains("unknown reference"));
            }
            other => panic!("expected resolver error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_string_extends_is_rejected() {
        let resolver = MapResolver::new(&[]);
        let err = resolve_inheritance(&json!({"extends": ["a", "b"]}), &resolver)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[tokio::test]
    async fn test_independent_calls_do_not_share_cycle_state() {
        let resolver = Arc::new(three_level_resolver());
        let child = json!({"extends": "parent.toml"});
        let first = resolve_inheritance(&child, &resolver);
        let second = resolve_inheritance(&child, &resolver);
        let (first, second) = tokio::join!(first, second);
        assert_eq!(first.unwrap(), second.unwrap());
    }

    #[tokio::test]
    async fn test_fn_resolver_adapts_closure() {
        let resolver = FnResolver::new(|reference: String| async move {
            Ok(json!({"from": reference}))
        });
        let resolved = resolve_inheritance(&json!({"extends": "base", "own": 1}), &resolver)
            .await
            .unwrap();
        assert_eq!(resolved, json!({"from": "base", "own": 1}));
    }
}
