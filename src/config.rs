// src/config.rs
// =============================================================================
// Configuration for one fetch run.
//
// Everything the engine needs is passed in explicitly through FetchConfig:
// the concurrency ceiling, the header set, retry limits and timeouts.
// There is no global default header map and no global logger.
//
// Durations are plain seconds (f64) so a JSON config file can say
// "request_timeout": 15 or "settle_delay": 0.5.
// =============================================================================

use crate::error::ConfigError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONCURRENCY_LIMIT: usize = 5;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 8;
pub const DEFAULT_BACKOFF_FACTOR_SECS: f64 = 1.0;
pub const DEFAULT_SETTLE_DELAY_SECS: f64 = 0.5;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: f64 = 15.0;
pub const DEFAULT_DNS_CACHE_TTL_SECS: f64 = 15.0;

/// The header set sent with every request unless the caller replaces it.
pub fn default_headers() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("Connection".to_string(), "keep-alive".to_string()),
        ("Accept".to_string(), "*/*".to_string()),
    ])
}

/// Settings for a fetch run.
///
/// `headers` replaces the defaults as a whole; it is never merged with them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    /// How many endpoints may be active (fetching or backing off) at once
    pub concurrency_limit: usize,
    pub headers: BTreeMap<String, String>,
    /// Attempts per endpoint, including the first one
    pub max_attempts: u32,
    /// Base of the exponential backoff, in seconds
    pub backoff_factor: f64,
    /// Pause after taking a permit, before the first request
    pub settle_delay: f64,
    /// End-to-end timeout of a single attempt (connect + read)
    pub request_timeout: f64,
    pub dns_cache_ttl: f64,
    /// Optional ceiling on the whole run. When it passes, no new attempts start.
    pub deadline: Option<f64>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            headers: default_headers(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_factor: DEFAULT_BACKOFF_FACTOR_SECS,
            settle_delay: DEFAULT_SETTLE_DELAY_SECS,
            request_timeout: DEFAULT_REQUEST_TIMEOUT_SECS,
            dns_cache_ttl: DEFAULT_DNS_CACHE_TTL_SECS,
            deadline: None,
        }
    }
}

impl FetchConfig {
    /// Loads a config from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }

    /// Checks everything that would otherwise fail halfway through a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency_limit == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        for (field, value) in [
            ("backoff_factor", self.backoff_factor),
            ("settle_delay", self.settle_delay),
            ("request_timeout", self.request_timeout),
            ("dns_cache_ttl", self.dns_cache_ttl),
        ] {
            seconds(field, value)?;
        }
        if let Some(deadline) = self.deadline {
            seconds("deadline", deadline)?;
        }
        self.header_map()?;
        Ok(())
    }

    /// Converts the string header mapping into a reqwest HeaderMap.
    pub fn header_map(&self) -> Result<HeaderMap, ConfigError> {
        let mut map = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                ConfigError::InvalidHeaderName {
                    name: name.clone(),
                    reason: e.to_string(),
                }
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| {
                ConfigError::InvalidHeaderValue {
                    name: name.clone(),
                    reason: e.to_string(),
                }
            })?;
            map.insert(header_name, header_value);
        }
        Ok(map)
    }

    pub(crate) fn backoff_factor(&self) -> Result<Duration, ConfigError> {
        seconds("backoff_factor", self.backoff_factor)
    }

    pub(crate) fn settle_delay(&self) -> Result<Duration, ConfigError> {
        seconds("settle_delay", self.settle_delay)
    }

    pub(crate) fn request_timeout(&self) -> Result<Duration, ConfigError> {
        seconds("request_timeout", self.request_timeout)
    }

    pub(crate) fn dns_cache_ttl(&self) -> Result<Duration, ConfigError> {
        seconds("dns_cache_ttl", self.dns_cache_ttl)
    }

    pub(crate) fn deadline(&self) -> Result<Option<Duration>, ConfigError> {
        self.deadline.map(|d| seconds("deadline", d)).transpose()
    }
}

fn seconds(field: &'static str, value: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(value).map_err(|_| ConfigError::InvalidDuration { field, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_behaviour() {
        let config = FetchConfig::default();
        assert_eq!(config.concurrency_limit, 5);
        assert_eq!(config.max_attempts, 8);
        assert_eq!(config.headers.get("Connection").map(String::as_str), Some("keep-alive"));
        assert_eq!(config.headers.get("Accept").map(String::as_str), Some("*/*"));
        assert_eq!(config.request_timeout().unwrap(), Duration::from_secs(15));
        assert_eq!(config.settle_delay().unwrap(), Duration::from_millis(500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let config = FetchConfig {
            concurrency_limit: 0,
            ..FetchConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroConcurrency)));
    }

    #[test]
    fn test_bad_header_name_is_rejected() {
        let config = FetchConfig {
            headers: BTreeMap::from([("bad header".to_string(), "x".to_string())]),
            ..FetchConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidHeaderName { .. })
        ));
    }

    #[test]
    fn test_negative_duration_is_rejected() {
        let config = FetchConfig {
            backoff_factor: -1.0,
            ..FetchConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDuration { field: "backoff_factor", .. })
        ));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: FetchConfig =
            serde_json::from_str(r#"{"concurrency_limit": 2, "deadline": 30}"#).unwrap();
        assert_eq!(config.concurrency_limit, 2);
        assert_eq!(config.max_attempts, 8);
        assert_eq!(config.deadline().unwrap(), Some(Duration::from_secs(30)));
    }
}
