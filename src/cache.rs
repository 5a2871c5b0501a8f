//! The main cache interface.
//!
//! This module provides the `Cache` handle that users share between threads.
//! It wraps the single-owner engine in one mutex and holds that mutex for the
//! whole of every operation, loader call included.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::CacheConfig;
use crate::expiration::Expiration;
use crate::storage::UnsyncCache;

/// A thread-safe, in-memory cache with lazy expiration and load-on-miss.
///
/// # Locking
/// All operations are serialized behind a single lock, and `get_with` keeps
/// the lock while the loader runs. A slow loader therefore blocks every other
/// caller, even for unrelated keys. In exchange a key is never loaded twice
/// concurrently and no caller can observe a half-written entry.
///
/// A loader that panics poisons the lock. Entries are only inserted after the
/// loader returns, so the map is still consistent and later calls carry on
/// with it.
///
/// # Example
/// ```
/// use loading_cache::{Cache, Expiration};
/// use std::time::Duration;
///
/// let cache = Cache::new(Expiration::after_write(Duration::from_secs(300)));
///
/// let user = cache.get_with(123u64, |id| Ok::<_, String>(format!("user-{}", id)));
/// assert_eq!(user.as_deref(), Ok("user-123"));
///
/// // Served from the cache, the loader is not called.
/// let user = cache.get_with(123u64, |_| Err("unreachable".to_string()));
/// assert_eq!(user.as_deref(), Ok("user-123"));
/// ```
pub struct Cache<K, V> {
    /// Shared engine.
    inner: Arc<Mutex<UnsyncCache<K, V>>>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash,
{
    /// Create a new cache with the given expiration policy.
    ///
    /// # Example
    /// ```
    /// use loading_cache::{Cache, Expiration};
    ///
    /// let cache: Cache<String, u32> = Cache::new(Expiration::never());
    /// assert!(cache.is_empty());
    /// ```
    pub fn new(expiration: Expiration) -> Self {
        Self::with_config(CacheConfig::new().expiration(expiration))
    }

    /// Create a new cache with the given configuration.
    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(UnsyncCache::with_config(config))),
        }
    }

    /// The expiration policy this cache was built with.
    pub fn expiration(&self) -> Expiration {
        self.lock().expiration()
    }

    /// Insert or overwrite a value, stamped with the current time.
    ///
    /// # Example
    /// ```
    /// use loading_cache::Cache;
    ///
    /// let cache = Cache::default();
    /// cache.put("k", 1);
    /// cache.put("k", 2);
    /// assert_eq!(cache.peek("k"), Some(2));
    /// ```
    pub fn put(&self, key: K, value: V) {
        self.lock().put(key, value);
    }

    /// Delete a key from the cache.
    ///
    /// Returns `true` if the key was stored. Deleting an absent key is a no-op.
    pub fn remove<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lock().remove(key)
    }

    /// Delete several keys at once, under one lock acquisition.
    ///
    /// Returns how many of them were stored.
    ///
    /// # Example
    /// ```
    /// use loading_cache::Cache;
    ///
    /// let cache = Cache::default();
    /// cache.put("a", 1);
    /// cache.put("b", 2);
    /// assert_eq!(cache.remove_all(["a", "c"]), 1);
    /// assert_eq!(cache.peek("a"), None);
    /// assert_eq!(cache.peek("b"), Some(2));
    /// ```
    pub fn remove_all<I>(&self, keys: I) -> usize
    where
        I: IntoIterator,
        I::Item: Borrow<K>,
    {
        self.lock().remove_all(keys)
    }

    /// Check whether an entry is stored, without consulting the policy.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lock().contains_key(key)
    }

    /// Get the number of stored entries.
    ///
    /// Note: this includes expired entries that no `get` has looked at yet.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Remove all entries from the cache.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, UnsyncCache<K, V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Get a copy of the stored value without expiring, refreshing or loading.
    ///
    /// # Example
    /// ```
    /// use loading_cache::Cache;
    ///
    /// let cache = Cache::default();
    /// cache.put("key", "value");
    /// assert_eq!(cache.peek("key"), Some("value"));
    /// assert_eq!(cache.peek("no key"), None);
    /// ```
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lock().peek(key).cloned()
    }

    /// Get the live value for `key`, calling `loader` on a miss.
    ///
    /// See [`UnsyncCache::get_with`] for the protocol. The lock is held for
    /// the loader call. The loader must not call back into this cache; doing
    /// so deadlocks.
    pub fn get_with<F, E>(&self, key: K, loader: F) -> Result<V, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        self.lock().get_with(key, loader).cloned()
    }
}

impl<K, V> Default for Cache<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new(Expiration::Never)
    }
}

impl<K, V> Clone for Cache<K, V> {
    /// Clones share the same underlying entries.
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> fmt::Debug for Cache<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache").field("inner", &self.inner).finish()
    }
}
