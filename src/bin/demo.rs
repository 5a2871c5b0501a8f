//! Loading cache demo.
//!
//! Looks up a list of names through a `LoadingCache` once per expiration
//! policy, logging each loader call, so the effect of each policy on hits and
//! misses shows in the log.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use loading_cache::cli::DemoArgs;
use loading_cache::{Expiration, LoadingCache};

#[derive(Debug, Clone, PartialEq)]
struct Person {
    name: String,
}

#[derive(Debug, Error)]
enum DemoError {
    #[error("refusing to load '{0}'")]
    Rejected(String),
}

/// Run every name through a fresh cache built with `expiration`.
fn try_expiration(
    expiration: Expiration,
    names: &[String],
    rejected: Arc<HashSet<String>>,
    delay: Duration,
) -> Result<(), DemoError> {
    let people = LoadingCache::new(expiration, move |name: &String| {
        if rejected.contains(name) {
            return Err(DemoError::Rejected(name.clone()));
        }
        info!(%name, "cache miss");
        Ok(Person { name: name.clone() })
    });

    for name in names {
        let person = people.get(name.clone())?;
        info!(?person, "lookup");
        thread::sleep(delay);
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loading_cache=info,demo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = DemoArgs::parse();
    let names = args.names();
    let rejected: Arc<HashSet<String>> = Arc::new(args.reject.iter().cloned().collect());

    for (i, expiration) in args.expirations().into_iter().enumerate() {
        if i > 0 {
            info!("----------");
        }
        info!(%expiration, "trying expiration policy");

        if let Err(err) = try_expiration(expiration, &names, Arc::clone(&rejected), args.delay()) {
            warn!(%err, %expiration, "lookup failed");
            return Err(err.into());
        }
    }

    Ok(())
}
