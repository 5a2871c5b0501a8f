//! Configuration for the loading cache.
//!
//! This module provides a builder for the expiration policy and the initial
//! size of the backing map.

use crate::expiration::Expiration;

/// Configuration for creating a new cache instance.
///
/// Use the builder pattern to construct configuration:
///
/// ```
/// use loading_cache::{CacheConfig, Expiration};
/// use std::time::Duration;
///
/// let config = CacheConfig::new()
///     .expiration(Expiration::after_write(Duration::from_secs(300)))
///     .initial_capacity(1_000)
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct CacheConfig {
    /// Policy deciding when a stored entry is stale.
    pub(crate) expiration: Expiration,

    /// Number of entries to pre-allocate room for.
    /// `None` leaves the map empty until the first insert.
    pub(crate) initial_capacity: Option<usize>,
}

impl CacheConfig {
    /// Create a new configuration builder with default values.
    ///
    /// Entries never expire and no space is pre-allocated.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the expiration policy.
    pub fn expiration(mut self, expiration: Expiration) -> Self {
        self.expiration = expiration;
        self
    }

    /// Pre-allocate room for `capacity` entries.
    ///
    /// This is a sizing hint only; the cache never evicts on size.
    /// Use 0 to skip pre-allocation.
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = if capacity == 0 { None } else { Some(capacity) };
        self
    }

    /// Build the final configuration.
    pub fn build(self) -> Self {
        self
    }

    /// Get the expiration policy.
    pub fn get_expiration(&self) -> Expiration {
        self.expiration
    }

    /// Get the initial capacity, if set.
    pub fn get_initial_capacity(&self) -> Option<usize> {
        self.initial_capacity
    }
}

impl From<Expiration> for CacheConfig {
    fn from(expiration: Expiration) -> Self {
        Self::new().expiration(expiration)
    }
}
