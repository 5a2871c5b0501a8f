//! Single-owner cache engine.
//!
//! `UnsyncCache` holds the key→entry map and the expiration policy and
//! implements the get-or-load protocol. The shared handles (`Cache`,
//! `LoadingCache`, `AsyncCache`) wrap it in a lock and delegate here.

use std::borrow::Borrow;
use std::collections::hash_map::{self, HashMap};
use std::hash::Hash;
use std::time::Instant;

use tracing::trace;

use crate::config::CacheConfig;
use crate::entry::Entry;
use crate::expiration::Expiration;

/// Cache engine without internal synchronization.
///
/// Every mutating operation takes `&mut self`, so the compiler enforces a
/// single owner. This type is **not** meant to be shared between threads on
/// its own; wrap it in a lock or use [`Cache`](crate::Cache), which does
/// exactly that.
///
/// # Example
/// ```
/// use loading_cache::{Expiration, UnsyncCache};
///
/// let mut cache = UnsyncCache::new(Expiration::never());
/// let len = cache.get_with("hello".to_string(), |k| Ok::<_, ()>(k.len())).unwrap();
/// assert_eq!(*len, 5);
/// assert_eq!(cache.peek("hello"), Some(&5));
/// ```
#[derive(Debug, Clone)]
pub struct UnsyncCache<K, V> {
    /// Stored entries. Iteration order is not part of the contract.
    entries: HashMap<K, Entry<V>>,

    /// Policy consulted on every `get`.
    expiration: Expiration,
}

impl<K, V> UnsyncCache<K, V>
where
    K: Eq + Hash,
{
    /// Create an empty cache with the given expiration policy.
    pub fn new(expiration: Expiration) -> Self {
        Self::with_config(CacheConfig::new().expiration(expiration))
    }

    /// Create an empty cache from a full configuration.
    pub fn with_config(config: CacheConfig) -> Self {
        let entries = match config.initial_capacity {
            Some(capacity) => HashMap::with_capacity(capacity),
            None => HashMap::new(),
        };

        Self {
            entries,
            expiration: config.expiration,
        }
    }

    /// The expiration policy this cache was built with.
    pub fn expiration(&self) -> Expiration {
        self.expiration
    }

    /// Return the stored value without consulting the expiration policy.
    ///
    /// Never loads, never evicts, never refreshes a sliding timestamp.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).map(Entry::value)
    }

    /// Check whether an entry is stored for `key`, expired or not.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Insert or overwrite the value for `key`, stamped with the current time.
    pub fn put(&mut self, key: K, value: V) {
        self.put_at(key, value, Instant::now());
    }

    /// Insert or overwrite the value for `key`, stamped with `now`.
    pub fn put_at(&mut self, key: K, value: V, now: Instant) {
        self.insert_at(key, value, now);
    }

    /// Remove the entry for `key`.
    ///
    /// Returns `true` if an entry was stored. Removing an absent key is a no-op.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.remove(key).is_some()
    }

    /// Remove every listed key, returning how many entries were stored.
    pub fn remove_all<I>(&mut self, keys: I) -> usize
    where
        I: IntoIterator,
        I::Item: Borrow<K>,
    {
        let mut removed = 0;
        for key in keys {
            let key: &K = key.borrow();
            if self.remove(key) {
                removed += 1;
            }
        }
        removed
    }

    /// Get the live value for `key`, calling `loader` on a miss.
    ///
    /// A stored entry is first checked against the expiration policy; an
    /// expired one is dropped and treated as a miss. On a miss `loader` runs
    /// with the key. Its value is stored and returned. Its error is returned
    /// as is and nothing is stored, so the next call tries the loader again.
    pub fn get_with<F, E>(&mut self, key: K, loader: F) -> Result<&V, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        self.get_or_load(key, Instant::now(), loader, Instant::now)
    }

    /// Like [`get_with`](Self::get_with), with `now` as the current time for
    /// both the expiration check and the timestamp of a freshly loaded entry.
    pub fn get_with_at<F, E>(&mut self, key: K, now: Instant, loader: F) -> Result<&V, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        self.get_or_load(key, now, loader, || now)
    }

    /// Number of stored entries, including expired ones not yet read.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Evaluate the expiration policy for `key` at `now`.
    ///
    /// Returns `true` if a live entry remains. An expired entry is removed.
    pub(crate) fn validate_at<Q>(&mut self, key: &Q, now: Instant) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let expiration = self.expiration;
        let expired = match self.entries.get_mut(key) {
            Some(entry) => expiration.is_expired_at(entry, now),
            None => return false,
        };

        if expired {
            self.entries.remove(key);
            trace!(%expiration, "evicted expired entry");
            return false;
        }
        true
    }

    /// Store a freshly obtained value and return a reference to it.
    pub(crate) fn insert_at(&mut self, key: K, value: V, now: Instant) -> &V {
        match self.entries.entry(key) {
            hash_map::Entry::Occupied(mut occupied) => {
                occupied.insert(Entry::new_at(value, now));
                occupied.into_mut().value()
            }
            hash_map::Entry::Vacant(vacant) => vacant.insert(Entry::new_at(value, now)).value(),
        }
    }

    fn get_or_load<F, E, C>(&mut self, key: K, now: Instant, loader: F, stamp: C) -> Result<&V, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
        C: FnOnce() -> Instant,
    {
        self.validate_at(&key, now);

        match self.entries.entry(key) {
            hash_map::Entry::Occupied(occupied) => {
                trace!("cache hit");
                Ok(occupied.into_mut().value())
            }
            hash_map::Entry::Vacant(vacant) => {
                trace!("cache miss, loading");
                let value = loader(vacant.key())?;
                let entry = vacant.insert(Entry::new_at(value, stamp()));
                trace!("stored loaded value");
                Ok(entry.value())
            }
        }
    }
}

impl<K, V> Default for UnsyncCache<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new(Expiration::Never)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::time::Duration;

    const TTL: Duration = Duration::from_secs(1);
    const EPSILON: Duration = Duration::from_millis(100);

    fn counting_len<'a>(calls: &'a Cell<usize>) -> impl Fn(&String) -> Result<usize, String> + 'a {
        move |key: &String| {
            calls.set(calls.get() + 1);
            Ok(key.len())
        }
    }

    #[test]
    fn test_put_and_peek() {
        let mut cache = UnsyncCache::new(Expiration::never());

        cache.put("key".to_string(), "value");

        assert_eq!(cache.peek("key"), Some(&"value"));
        assert_eq!(cache.peek("no key"), None);
    }

    #[test]
    fn test_put_overwrites() {
        let mut cache = UnsyncCache::new(Expiration::never());

        cache.put("k", 1);
        cache.put("k", 2);

        assert_eq!(cache.peek("k"), Some(&2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_remove_many() {
        let mut cache = UnsyncCache::new(Expiration::never());
        cache.put("k1", "v1");
        cache.put("k2", "v2");
        cache.put("k3", "v3");

        let removed = cache.remove_all(["k1", "k3", "missing"]);

        assert_eq!(removed, 2);
        assert_eq!(cache.peek("k1"), None);
        assert_eq!(cache.peek("k2"), Some(&"v2"));
        assert_eq!(cache.peek("k3"), None);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut cache = UnsyncCache::new(Expiration::never());
        cache.put("a", 1);

        assert!(cache.remove("a"));
        assert!(!cache.remove("a"));
        assert!(!cache.remove("never-there"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_get_with_loads_once() {
        let calls = Cell::new(0);
        let mut cache = UnsyncCache::new(Expiration::never());

        assert_eq!(cache.get_with("hi".to_string(), counting_len(&calls)), Ok(&2));
        assert_eq!(cache.get_with("hi".to_string(), counting_len(&calls)), Ok(&2));

        assert_eq!(calls.get(), 1);
        assert_eq!(cache.peek("hi"), Some(&2));
    }

    #[test]
    fn test_loader_receives_key() {
        let mut cache = UnsyncCache::new(Expiration::never());

        let value = cache
            .get_with(7u32, |k| Ok::<_, ()>(format!("value_{}", k)))
            .cloned();

        assert_eq!(value, Ok("value_7".to_string()));
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let mut cache: UnsyncCache<&str, u32> = UnsyncCache::new(Expiration::never());

        let result = cache.get_with("k", |_| Err("backend down"));
        assert_eq!(result, Err("backend down"));
        assert_eq!(cache.peek("k"), None);
        assert!(cache.is_empty());

        // The next get retries the loader.
        assert_eq!(cache.get_with("k", |_| Ok::<_, &str>(9)), Ok(&9));
    }

    #[test]
    fn test_hit_does_not_call_loader() {
        let mut cache = UnsyncCache::new(Expiration::never());
        cache.put("k", 1);

        let value = cache.get_with("k", |_| -> Result<i32, ()> { panic!("loader called on hit") });
        assert_eq!(value, Ok(&1));
    }

    #[test]
    fn test_after_write_reloads_after_ttl() {
        let calls = Cell::new(0);
        let start = Instant::now();
        let mut cache = UnsyncCache::new(Expiration::after_write(TTL));

        assert_eq!(cache.get_with_at("hi".to_string(), start, counting_len(&calls)), Ok(&2));
        assert_eq!(
            cache.get_with_at("hi".to_string(), start + TTL - EPSILON, counting_len(&calls)),
            Ok(&2)
        );
        assert_eq!(calls.get(), 1);

        assert_eq!(
            cache.get_with_at("hi".to_string(), start + TTL + EPSILON, counting_len(&calls)),
            Ok(&2)
        );
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_after_access_extends_on_read() {
        let calls = Cell::new(0);
        let start = Instant::now();
        let mut cache = UnsyncCache::new(Expiration::after_access(TTL));

        cache.get_with_at("key".to_string(), start, counting_len(&calls)).unwrap();

        // Five reads spaced under the TTL cover well over the TTL in total.
        let step = TTL - EPSILON;
        for i in 1..=5 {
            cache
                .get_with_at("key".to_string(), start + step * i, counting_len(&calls))
                .unwrap();
        }
        assert_eq!(calls.get(), 1);

        // A gap longer than the TTL expires it.
        cache
            .get_with_at("key".to_string(), start + step * 5 + TTL + EPSILON, counting_len(&calls))
            .unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_expired_entry_is_evicted_on_get() {
        let start = Instant::now();
        let mut cache = UnsyncCache::new(Expiration::after_write(TTL));
        cache.put_at("k", 1, start);

        let result = cache.get_with_at("k", start + TTL + EPSILON, |_| Err("gone"));

        assert_eq!(result, Err("gone"));
        assert_eq!(cache.peek("k"), None);
    }

    #[test]
    fn test_peek_ignores_expiration() {
        let mut cache = UnsyncCache::new(Expiration::after_write(Duration::ZERO));
        cache.put("k", 1);
        std::thread::sleep(Duration::from_millis(2));

        assert_eq!(cache.peek("k"), Some(&1));
        assert!(cache.contains_key("k"));
        assert_eq!(cache.len(), 1);

        // `get` does consult the policy and reloads.
        assert_eq!(cache.get_with("k", |_| Ok::<_, ()>(2)), Ok(&2));
    }

    #[test]
    fn test_peek_does_not_refresh_sliding_entry() {
        let start = Instant::now();
        let mut cache = UnsyncCache::new(Expiration::after_access(TTL));
        cache.put_at("k", 1, start);

        let _ = cache.peek("k");

        assert!(!cache.validate_at("k", start + TTL + EPSILON));
    }

    #[test]
    fn test_clear() {
        let mut cache = UnsyncCache::default();
        cache.put("a", 1);
        cache.put("b", 2);

        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.expiration(), Expiration::Never);
    }
}
