//! Cache with a loader bound at construction.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use crate::cache::Cache;
use crate::config::CacheConfig;
use crate::expiration::Expiration;

type Loader<K, V, E> = dyn Fn(&K) -> Result<V, E> + Send + Sync;

/// A [`Cache`] that always knows how to compute a missing value.
///
/// The loader is supplied once, so callers only pass keys. A different loader
/// can still be used for a single call with [`get_with`](Self::get_with).
///
/// # Example
/// ```
/// use loading_cache::{Expiration, LoadingCache};
///
/// let lengths = LoadingCache::new(Expiration::never(), |name: &String| {
///     Ok::<_, std::convert::Infallible>(name.len())
/// });
///
/// assert_eq!(lengths.get("hi".to_string()), Ok(2));
/// assert_eq!(lengths.peek("hi"), Some(2));
/// ```
pub struct LoadingCache<K, V, E> {
    cache: Cache<K, V>,
    loader: Arc<Loader<K, V, E>>,
}

impl<K, V, E> LoadingCache<K, V, E>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Create a cache with the given expiration policy and loader.
    pub fn new<F>(expiration: Expiration, loader: F) -> Self
    where
        F: Fn(&K) -> Result<V, E> + Send + Sync + 'static,
    {
        Self::with_config(CacheConfig::new().expiration(expiration), loader)
    }

    /// Create a cache from a full configuration and a loader.
    pub fn with_config<F>(config: CacheConfig, loader: F) -> Self
    where
        F: Fn(&K) -> Result<V, E> + Send + Sync + 'static,
    {
        Self {
            cache: Cache::with_config(config),
            loader: Arc::new(loader),
        }
    }

    /// Get the live value for `key`, calling the bound loader on a miss.
    ///
    /// The loader's error is returned unchanged and nothing is cached for it.
    pub fn get(&self, key: K) -> Result<V, E> {
        self.cache.get_with(key, |key| (self.loader)(key))
    }

    /// Get the live value for `key`, using `loader` instead of the bound
    /// loader if this call misses.
    pub fn get_with<F, E2>(&self, key: K, loader: F) -> Result<V, E2>
    where
        F: FnOnce(&K) -> Result<V, E2>,
    {
        self.cache.get_with(key, loader)
    }

    /// Get a copy of the stored value without expiring, refreshing or loading.
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.cache.peek(key)
    }

    /// Insert or overwrite a value, stamped with the current time.
    pub fn put(&self, key: K, value: V) {
        self.cache.put(key, value);
    }

    /// Delete a key. Returns `true` if it was stored.
    pub fn remove<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.cache.remove(key)
    }

    /// Delete several keys, returning how many were stored.
    pub fn remove_all<I>(&self, keys: I) -> usize
    where
        I: IntoIterator,
        I::Item: Borrow<K>,
    {
        self.cache.remove_all(keys)
    }

    /// Check whether an entry is stored, without consulting the policy.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.cache.contains_key(key)
    }

    /// Get the number of stored entries.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Remove all entries.
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// The underlying cache handle, sharing the same entries.
    pub fn cache(&self) -> &Cache<K, V> {
        &self.cache
    }
}

impl<K, V, E> Clone for LoadingCache<K, V, E> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            loader: Arc::clone(&self.loader),
        }
    }
}

impl<K, V, E> fmt::Debug for LoadingCache<K, V, E>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadingCache")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
