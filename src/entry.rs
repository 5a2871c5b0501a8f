//! Cache entry holding a value and its recency timestamp.

use std::time::{Duration, Instant};

/// A single cache entry containing the value and its timestamp.
///
/// The timestamp is the instant of the last write. Under sliding expiration
/// it is also moved forward on every successful read.
#[derive(Debug, Clone)]
pub struct Entry<V> {
    /// The stored value.
    pub(crate) value: V,

    /// When this entry was written (or last refreshed by a read).
    pub(crate) timestamp: Instant,
}

impl<V> Entry<V> {
    /// Create a new entry stamped with the current time.
    pub fn new(value: V) -> Self {
        Self::new_at(value, Instant::now())
    }

    /// Create a new entry stamped with a given instant.
    /// This is useful for testing with a controlled clock.
    pub fn new_at(value: V, now: Instant) -> Self {
        Self {
            value,
            timestamp: now,
        }
    }

    /// Time elapsed since the timestamp, as seen at `now`.
    ///
    /// Saturates to zero if `now` is earlier than the timestamp.
    pub fn age_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.timestamp)
    }

    /// Move the timestamp to a specific instant.
    pub fn touch_at(&mut self, now: Instant) {
        self.timestamp = now;
    }

    /// Get a reference to the value.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Get the current timestamp.
    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    /// Consume the entry, returning the value.
    pub fn into_value(self) -> V {
        self.value
    }
}
