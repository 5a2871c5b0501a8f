//! # Loading Cache
//!
//! A generic, in-process key-value cache that fills itself: on a miss it calls
//! a loader you provide, stores the value, and serves it until the expiration
//! policy says it is stale.
//!
//! ## Features
//!
//! - **Load on miss**: pass a loader per call (`get_with`) or bind one at
//!   construction ([`LoadingCache`])
//! - **Lazy expiration**: never, fixed TTL after write, or sliding TTL after
//!   access, all checked when an entry is read; no background threads
//! - **Failures are not cached**: a loader error is returned as is and the
//!   next `get` tries again
//! - **Thread-safe**: share [`Cache`] across threads with `Clone`; use
//!   [`AsyncCache`] for async loaders and [`UnsyncCache`] when you own the
//!   cache outright
//!
//! ## Quick Start
//!
//! ```rust
//! use loading_cache::{Cache, Expiration};
//! use std::time::Duration;
//!
//! let cache = Cache::new(Expiration::after_access(Duration::from_secs(60)));
//!
//! // First call loads, later calls are served from memory.
//! let len = cache.get_with("hello".to_string(), |k| Ok::<_, String>(k.len()));
//! assert_eq!(len, Ok(5));
//!
//! // Inspect without loading or touching the expiration clock.
//! assert_eq!(cache.peek("hello"), Some(5));
//!
//! cache.put("bye".to_string(), 3);
//! cache.remove_all(["hello".to_string(), "bye".to_string()]);
//! assert!(cache.is_empty());
//! ```
//!
//! ## Expiration policies
//!
//! | Policy | Expired when | Read side effect |
//! |--------|--------------|------------------|
//! | [`Expiration::Never`] | never | none |
//! | [`Expiration::AfterWrite`] | more than the TTL since the write | none |
//! | [`Expiration::AfterAccess`] | more than the TTL since the last read or write | restarts the TTL |
//!
//! Expired entries stay in memory until a `get` for their key finds them.
//!
//! ## Thread Safety
//!
//! [`Cache`] serializes every operation behind one mutex, loader calls
//! included. That keeps the model simple (each miss loads exactly once) at
//! the cost of making unrelated keys wait for a slow loader.
//!
//! ```rust
//! use loading_cache::Cache;
//! use std::thread;
//!
//! let cache = Cache::default();
//!
//! let handles: Vec<_> = (0..4).map(|i| {
//!     let cache = cache.clone();
//!     thread::spawn(move || {
//!         cache.put(format!("key_{}", i), i);
//!     })
//! }).collect();
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! assert_eq!(cache.len(), 4);
//! ```

pub mod async_cache;
pub mod cache;
pub mod cli;
pub mod config;
pub mod entry;
pub mod error;
pub mod expiration;
pub mod loading;
pub mod storage;

pub use async_cache::AsyncCache;
pub use cache::Cache;
pub use config::CacheConfig;
pub use entry::Entry;
pub use error::{CacheError, CacheResult};
pub use expiration::Expiration;
pub use loading::LoadingCache;
pub use storage::UnsyncCache;
