// src/fetch/dns.rs
// =============================================================================
// A small DNS cache for the HTTP transport.
//
// reqwest resolves every new connection through the system resolver. When
// hundreds of endpoints share a handful of hosts that's a lot of lookups,
// so we plug in a resolver that remembers answers for a short TTL.
//
// The cache lives behind a std Mutex: lookups and inserts are tiny and never
// held across an .await, so a blocking lock is fine here.
// =============================================================================

use hyper::client::connect::dns::Name;
use reqwest::dns::{Addrs, Resolve, Resolving};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct CachedLookup {
    addrs: Vec<SocketAddr>,
    /// None when the TTL is too large to represent: the entry never expires
    expires_at: Option<Instant>,
}

impl CachedLookup {
    fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// Resolver that caches successful lookups for `ttl`.
#[derive(Debug, Clone)]
pub struct CachingResolver {
    ttl: Duration,
    entries: Arc<Mutex<HashMap<String, CachedLookup>>>,
}

impl CachingResolver {
    pub fn new(ttl: Duration) -> Self {
        CachingResolver {
            ttl,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the cached addresses for `host` if they haven't expired.
    fn cached(&self, host: &str) -> Option<Vec<SocketAddr>> {
        let mut entries = self.entries.lock().ok()?;
        match entries.get(host) {
            Some(entry) if entry.is_fresh(Instant::now()) => Some(entry.addrs.clone()),
            Some(_) => {
                entries.remove(host);
                None
            }
            None => None,
        }
    }

    fn store(&self, host: &str, addrs: Vec<SocketAddr>) {
        if self.ttl.is_zero() || addrs.is_empty() {
            return;
        }
        if let Ok(mut entries) = self.entries.lock() {
            let now = Instant::now();
            // Drop every expired host, not just this one, so the map stays bounded
            entries.retain(|_, entry| entry.is_fresh(now));
            entries.insert(
                host.to_string(),
                CachedLookup {
                    addrs,
                    expires_at: now.checked_add(self.ttl),
                },
            );
        }
    }

    /// Resolves `host`, going to the system resolver only on a cache miss.
    pub async fn lookup(&self, host: &str) -> std::io::Result<Vec<SocketAddr>> {
        if let Some(addrs) = self.cached(host) {
            tracing::trace!(host, "dns cache hit");
            return Ok(addrs);
        }

        // Port 0: the connector fills in the real port from the URL
        let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, 0)).await?.collect();
        self.store(host, addrs.clone());
        Ok(addrs)
    }
}

impl Resolve for CachingResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let resolver = self.clone();
        Box::pin(async move {
            let addrs = resolver.lookup(name.as_str()).await?;
            let addrs: Addrs = Box::new(addrs.into_iter());
            Ok::<_, Box<dyn std::error::Error + Send + Sync>>(addrs)
        })
    }
}
