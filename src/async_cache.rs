//! Cache handle for asynchronous loaders.
//!
//! Same protocol as [`Cache`](crate::Cache), but the lock is a
//! `tokio::sync::Mutex` so it can be held across the loader's `.await`.

use std::borrow::Borrow;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Mutex, MutexGuard};
use tracing::trace;

use crate::config::CacheConfig;
use crate::expiration::Expiration;
use crate::storage::UnsyncCache;

/// A cache shared between tasks, loading misses with an async function.
///
/// The lock is held while the loader future runs, so concurrent misses on
/// any key wait for it. Dropping a `get_with` future before it finishes
/// releases the lock and stores nothing.
///
/// # Example
/// ```
/// use loading_cache::{AsyncCache, Expiration};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let cache = AsyncCache::new(Expiration::never());
///
/// let value = cache
///     .get_with(7u32, |id| async move { Ok::<_, String>(id * 2) })
///     .await;
/// assert_eq!(value, Ok(14));
/// assert_eq!(cache.peek(&7).await, Some(14));
/// # }
/// ```
#[derive(Debug)]
pub struct AsyncCache<K, V> {
    inner: Arc<Mutex<UnsyncCache<K, V>>>,
}

impl<K, V> AsyncCache<K, V>
where
    K: Eq + Hash,
{
    /// Create a new cache with the given expiration policy.
    pub fn new(expiration: Expiration) -> Self {
        Self::with_config(CacheConfig::new().expiration(expiration))
    }

    /// Create a new cache with the given configuration.
    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(UnsyncCache::with_config(config))),
        }
    }

    /// Get a copy of the stored value without expiring, refreshing or loading.
    pub async fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.lock().await.peek(key).cloned()
    }

    /// Insert or overwrite a value, stamped with the current time.
    pub async fn put(&self, key: K, value: V) {
        self.lock().await.put(key, value);
    }

    /// Delete a key. Returns `true` if it was stored.
    pub async fn remove<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lock().await.remove(key)
    }

    /// Delete several keys, returning how many were stored.
    pub async fn remove_all<I>(&self, keys: I) -> usize
    where
        I: IntoIterator,
        I::Item: Borrow<K>,
    {
        self.lock().await.remove_all(keys)
    }

    /// Check whether an entry is stored, without consulting the policy.
    pub async fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lock().await.contains_key(key)
    }

    /// Get the number of stored entries.
    pub async fn len(&self) -> usize {
        self.lock().await.len()
    }

    /// Check if the cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.lock().await.is_empty()
    }

    /// Remove all entries.
    pub async fn clear(&self) {
        self.lock().await.clear();
    }

    async fn lock(&self) -> MutexGuard<'_, UnsyncCache<K, V>> {
        self.inner.lock().await
    }
}

impl<K, V> AsyncCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Get the live value for `key`, awaiting `loader` on a miss.
    ///
    /// The loader receives its own copy of the key. A loader error is
    /// returned unchanged and nothing is stored.
    pub async fn get_with<F, Fut, E>(&self, key: K, loader: F) -> Result<V, E>
    where
        F: FnOnce(K) -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let mut store = self.lock().await;

        if store.validate_at(&key, Instant::now()) {
            if let Some(value) = store.peek(&key) {
                trace!("cache hit");
                return Ok(value.clone());
            }
        }

        trace!("cache miss, loading");
        let value = loader(key.clone()).await?;
        let value = store.insert_at(key, value, Instant::now()).clone();
        trace!("stored loaded value");
        Ok(value)
    }
}

impl<K, V> Clone for AsyncCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> Default for AsyncCache<K, V>
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
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_async_loads_once() {
        let cache = AsyncCache::new(Expiration::never());
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let calls = Arc::clone(&calls);
            let value = cache
                .get_with("hi".to_string(), |key| async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>(key.len())
                })
                .await;
            assert_eq!(value, Ok(2));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_async_error_not_cached() {
        let cache: AsyncCache<&str, u32> = AsyncCache::default();

        let result = cache
            .get_with("k", |_| async { Err::<u32, _>("timeout") })
            .await;

        assert_eq!(result, Err("timeout"));
        assert_eq!(cache.peek("k").await, None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_async_after_write_expiry() {
        let cache = AsyncCache::new(Expiration::after_write(Duration::from_millis(50)));
        let calls = Arc::new(AtomicUsize::new(0));

        let load = |calls: Arc<AtomicUsize>| {
            move |key: &'static str| async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ()>(key.len())
            }
        };

        assert_eq!(cache.get_with("abc", load(calls.clone())).await, Ok(3));
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(cache.get_with("abc", load(calls.clone())).await, Ok(3));

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_async_put_remove() {
        let cache = AsyncCache::default();

        cache.put("a", 1).await;
        cache.put("b", 2).await;
        assert_eq!(cache.remove_all(["a", "missing"]).await, 1);

        assert_eq!(cache.peek("a").await, None);
        assert_eq!(cache.peek("b").await, Some(2));
        assert_eq!(cache.len().await, 1);
        assert!(cache.contains_key("b").await);

        assert!(cache.remove("b").await);
        cache.clear().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_async_cancelled_load_stores_nothing() {
        let cache: AsyncCache<&str, u32> = AsyncCache::default();

        let pending = cache.get_with("k", |_| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, ()>(1)
        });
        let result = tokio::time::timeout(Duration::from_millis(20), pending).await;

        assert!(result.is_err());
        assert_eq!(cache.peek("k").await, None);
        assert_eq!(cache.len().await, 0);

        // The lock was released with the dropped future.
        assert_eq!(cache.get_with("k", |_| async { Ok::<_, ()>(2) }).await, Ok(2));
    }

    #[tokio::test]
    async fn test_async_after_access_survives_spaced_reads() {
        let cache = AsyncCache::new(Expiration::after_access(Duration::from_millis(200)));
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..5 {
            let calls = Arc::clone(&calls);
            let value = cache
                .get_with("k", |key| async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ()>(key.len())
                })
                .await;
            assert_eq!(value, Ok(1));
            tokio::time::sleep(Duration::from_millis(60)).await;
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_async_concurrent_misses_load_once() {
        let cache = AsyncCache::new(Expiration::never());
        let calls = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let calls = Arc::clone(&calls);
                tokio::spawn(async move {
                    cache
                        .get_with(1u8, |_| async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            Ok::<_, ()>("loaded")
                        })
                        .await
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap(), Ok("loaded"));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
