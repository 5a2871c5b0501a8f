//! Command-line interface definitions.
//!
//! This module defines the arguments of the `demo` binary using clap.

use std::time::Duration;

use clap::Parser;

use crate::expiration::Expiration;

/// Names looked up when none are given on the command line.
pub const DEFAULT_NAMES: [&str; 8] = [
    "James", "John", "Robert", "John", "Michael", "Michael", "Michael", "James",
];

/// Loading cache demo.
///
/// Looks up a list of people through a cache, once per expiration policy,
/// and logs every loader call so hits and misses can be compared.
#[derive(Parser, Debug)]
#[command(name = "loading-cache-demo")]
#[command(author, version, about, long_about = None)]
pub struct DemoArgs {
    /// Expiration policy to try; repeat to try several.
    ///
    /// One of `never`, `after-write:<duration>`, `after-access:<duration>`.
    /// Defaults to all three with a one second TTL.
    #[arg(short, long = "expiration", value_name = "POLICY")]
    pub expirations: Vec<Expiration>,

    /// Pause between two lookups.
    #[arg(short, long, default_value = "500ms")]
    pub delay: humantime::Duration,

    /// Names the loader refuses to build.
    #[arg(long, value_name = "NAME")]
    pub reject: Vec<String>,

    /// Names to look up, in order.
    pub names: Vec<String>,
}

impl DemoArgs {
    /// Policies to run, falling back to the default trio.
    pub fn expirations(&self) -> Vec<Expiration> {
        if self.expirations.is_empty() {
            let ttl = Duration::from_secs(1);
            vec![
                Expiration::never(),
                Expiration::after_write(ttl),
                Expiration::after_access(ttl),
            ]
        } else {
            self.expirations.clone()
        }
    }

    /// Names to look up, falling back to [`DEFAULT_NAMES`].
    pub fn names(&self) -> Vec<String> {
        if self.names.is_empty() {
            DEFAULT_NAMES.iter().map(|name| name.to_string()).collect()
        } else {
            self.names.clone()
        }
    }

    /// Pause between two lookups.
    pub fn delay(&self) -> Duration {
        self.delay.into()
    }
}
