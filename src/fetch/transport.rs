// src/fetch/transport.rs
// =============================================================================
// The transport makes exactly one HTTP GET. No retries happen here.
//
// Settings of the shared client:
// - one end-to-end timeout per attempt (connect + read of the whole body)
// - a connection pool with no upper bound, shared by every endpoint
// - DNS answers cached for a short TTL (see dns.rs)
//
// Any non-2xx status is treated exactly like a network error: the attempt
// failed, and the TransportError says why.
//
// Rust concepts:
// - Traits: Transport is the seam that lets tests swap in a fake network
// - async-trait: async methods on a trait we call through generics
// =============================================================================

use crate::config::FetchConfig;
use crate::error::{ConfigError, TransportError};
use crate::fetch::dns::CachingResolver;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Something that can perform a single GET for an endpoint.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, endpoint: &str, headers: &HeaderMap) -> Result<Vec<u8>, TransportError>;
}

/// The real transport, backed by one pooled reqwest client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(request_timeout: Duration, dns_cache_ttl: Duration) -> Result<Self, ConfigError> {
        // We'll reuse this client for every request of the run (connection pooling)
        let client = Client::builder()
            .timeout(request_timeout)
            .pool_max_idle_per_host(usize::MAX)
            .dns_resolver(Arc::new(CachingResolver::new(dns_cache_ttl)))
            .build()?;

        Ok(HttpTransport { client })
    }

    pub fn from_config(config: &FetchConfig) -> Result<Self, ConfigError> {
        HttpTransport::new(config.request_timeout()?, config.dns_cache_ttl()?)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, endpoint: &str, headers: &HeaderMap) -> Result<Vec<u8>, TransportError> {
        let response = self
            .client
            .get(endpoint)
            .headers(headers.clone())
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(endpoint, e))?;

        // 4xx/5xx become errors, same as a refused connection
        let response = response
            .error_for_status()
            .map_err(|e| TransportError::from_reqwest(endpoint, e))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::from_reqwest(endpoint, e))?;

        Ok(body.to_vec())
    }
}
