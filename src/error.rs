//! Error types for the loading cache library.
//!
//! Loader failures are never wrapped: `get_with` hands back the loader's own
//! error type untouched. `CacheError` only covers the configuration surface,
//! such as parsing an expiration policy from text.

use thiserror::Error;

/// Errors raised while building a cache configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The expiration policy text did not name a known policy.
    #[error("invalid expiration policy: '{0}'")]
    InvalidExpiration(String),

    /// The duration part of an expiration policy could not be parsed.
    #[error("invalid duration '{input}': {reason}")]
    InvalidDuration { input: String, reason: String },
}

/// A specialized Result type for cache configuration.
pub type CacheResult<T> = Result<T, CacheError>;
