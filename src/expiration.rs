//! Expiration policies evaluated lazily when an entry is read.
//!
//! There is no background sweeper. `get` asks the policy about an entry just
//! before it would return it, and an expired entry is dropped on the spot.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::entry::Entry;
use crate::error::{CacheError, CacheResult};

/// Policy deciding, at read time, whether a stored entry is stale.
///
/// # Example
/// ```
/// use loading_cache::Expiration;
/// use std::time::Duration;
///
/// let policy: Expiration = "after-access:30s".parse().unwrap();
/// assert_eq!(policy, Expiration::after_access(Duration::from_secs(30)));
/// assert_eq!(policy.to_string(), "after-access:30s");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expiration {
    /// Entries never expire.
    #[default]
    Never,

    /// Entries expire once the TTL has passed since they were written.
    AfterWrite(Duration),

    /// Entries expire once the TTL has passed since they were last read
    /// or written. Every non-expired read restarts the clock.
    AfterAccess(Duration),
}

impl Expiration {
    /// Entries never expire.
    pub fn never() -> Self {
        Expiration::Never
    }

    /// Entries expire `ttl` after being written.
    pub fn after_write(ttl: Duration) -> Self {
        Expiration::AfterWrite(ttl)
    }

    /// Entries expire `ttl` after their last access.
    pub fn after_access(ttl: Duration) -> Self {
        Expiration::AfterAccess(ttl)
    }

    /// The time-to-live, if this policy has one.
    pub fn ttl(&self) -> Option<Duration> {
        match self {
            Expiration::Never => None,
            Expiration::AfterWrite(ttl) | Expiration::AfterAccess(ttl) => Some(*ttl),
        }
    }

    /// Check the entry against the current time.
    pub fn is_expired<V>(&self, entry: &mut Entry<V>) -> bool {
        self.is_expired_at(entry, Instant::now())
    }

    /// Check the entry against a given time.
    ///
    /// An entry is expired when strictly more than the TTL has elapsed.
    /// For [`Expiration::AfterAccess`] a live entry has its timestamp moved
    /// to `now`, so the check itself counts as an access.
    pub fn is_expired_at<V>(&self, entry: &mut Entry<V>, now: Instant) -> bool {
        match *self {
            Expiration::Never => false,
            Expiration::AfterWrite(ttl) => entry.age_at(now) > ttl,
            Expiration::AfterAccess(ttl) => {
                if entry.age_at(now) > ttl {
                    return true;
                }
                entry.touch_at(now);
                false
            }
        }
    }
}

impl fmt::Display for Expiration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expiration::Never => write!(f, "never"),
            Expiration::AfterWrite(ttl) => {
                write!(f, "after-write:{}", humantime::format_duration(*ttl))
            }
            Expiration::AfterAccess(ttl) => {
                write!(f, "after-access:{}", humantime::format_duration(*ttl))
            }
        }
    }
}

impl FromStr for Expiration {
    type Err = CacheError;

    /// Parse `never`, `after-write:<duration>` or `after-access:<duration>`.
    ///
    /// Durations use humantime syntax, e.g. `500ms`, `1s`, `2m 30s`.
    fn from_str(s: &str) -> CacheResult<Self> {
        let s = s.trim();
        let (kind, ttl) = match s.split_once(':') {
            Some((kind, ttl)) => (kind.trim().to_lowercase(), Some(ttl.trim())),
            None => (s.to_lowercase(), None),
        };

        match (kind.as_str(), ttl) {
            ("never", None) => Ok(Expiration::Never),
            ("after-write", Some(ttl)) => parse_ttl(ttl).map(Expiration::AfterWrite),
            ("after-access", Some(ttl)) => parse_ttl(ttl).map(Expiration::AfterAccess),
            _ => Err(CacheError::InvalidExpiration(s.to_string())),
        }
    }
}

fn parse_ttl(input: &str) -> CacheResult<Duration> {
    humantime::parse_duration(input).map_err(|err| CacheError::InvalidDuration {
        input: input.to_string(),
        reason: err.to_string(),
    })
}
