//! In-process caching of resolved references

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use log::debug;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::inheritance::Resolver;

/// Memoizing decorator over any [`Resolver`].
///
/// Successful resolutions are stored by reference and served from memory on
/// later calls. Failures are not stored, so a reference that failed once is
/// fetched again on the next call. Two concurrent calls for a reference that
/// is not cached yet both reach the inner resolver.
#[derive(Debug)]
pub struct CachedResolver<R> {
    inner: R,
    cache: Mutex<HashMap<String, Value>>,
}

impl<R> CachedResolver<R> {
    /// Wrap `inner` with an empty cache
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Get a cached fragment without resolving
    pub fn get(&self, reference: &str) -> Result<Option<Value>> {
        Ok(self.lock()?.get(reference).cloned())
    }

    /// Check if a reference is cached
    pub fn contains(&self, reference: &str) -> Result<bool> {
        Ok(self.lock()?.contains_key(reference))
    }

    /// Clear all cached entries
    pub fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }

    /// Get the number of cached entries
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    /// The wrapped resolver
    pub fn inner(&self) -> &R {
        &self.inner
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Value>>> {
        self.cache.lock().map_err(|_| Error::LockPoisoned {
            context: "resolver cache".to_string(),
        })
    }
}

#[async_trait]
impl<R: Resolver> Resolver for CachedResolver<R> {
    async fn resolve(&self, reference: &str) -> Result<Value> {
        if let Some(cached) = self.get(reference)? {
            debug!("Resolver cache hit for '{}'", reference);
            return Ok(cached);
        }

        let value = self.inner.resolve(reference).await?;
        self.lock()?.insert(reference.to_string(), value.clone());
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Resolver that fails on its first call and succeeds afterwards.
    #[derive(Default)]
    struct FlakyResolver {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Resolver for FlakyResolver {
        async fn resolve(&self, reference: &str) -> Result<Value> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call == 0 {
                Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "first call fails",
                )))
            } else {
                Ok(json!({ "reference": reference, "call": call }))
            }
        }
    }

    #[tokio::test]
    async fn test_same_reference_resolved_once() {
        let cached = CachedResolver::new(FlakyResolver {
            calls: AtomicUsize::new(1),
        });

        let first = cached.resolve("a.toml").await.unwrap();
        let second = cached.resolve("a.toml").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(cached.inner().calls.load(Ordering::SeqCst), 2);
        assert_eq!(cached.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let cached = CachedResolver::new(FlakyResolver::default());

        assert!(cached.resolve("a.toml").await.is_err());
        assert!(!cached.contains("a.toml").unwrap());

        let retried = cached.resolve("a.toml").await.unwrap();
        assert_eq!(retried["call"], json!(1));
        assert_eq!(cached.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_distinct_references_cached_independently() {
        let cached = CachedResolver::new(FlakyResolver {
            calls: AtomicUsize::new(1),
        });

        let a = cached.resolve("a.toml").await.unwrap();
        let b = cached.resolve("b.toml").await.unwrap();
        assert_ne!(a, b);
        assert_eq!(cached.len().unwrap(), 2);

        cached.resolve("b.toml").await.unwrap();
        assert_eq!(cached.inner().calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_clear_forces_refetch() {
        let cached = CachedResolver::new(FlakyResolver {
            calls: AtomicUsize::new(1),
        });
        cached.resolve("a.toml").await.unwrap();
        cached.clear().unwrap();
        assert!(cached.is_empty().unwrap());

        cached.resolve("a.toml").await.unwrap();
        assert_eq!(cached.inner().calls.load(Ordering::SeqCst), 3);
    }
}
