// src/error.rs
// =============================================================================
// Error types for the fetch engine.
//
// Two very different kinds of failure exist:
// - ConfigError: something is wrong before any request is made (a zero
//   concurrency limit, a header that isn't valid HTTP). These abort the run.
// - TransportError: one HTTP attempt failed. These never abort anything;
//   the retry controller records them and moves on.
// =============================================================================

use reqwest::StatusCode;
use thiserror::Error;

/// Fatal configuration problems, reported before any endpoint work starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("concurrency limit must be at least 1")]
    ZeroConcurrency,

    #[error("max attempts must be at least 1")]
    ZeroAttempts,

    #[error("invalid header name '{name}': {reason}")]
    InvalidHeaderName { name: String, reason: String },

    #[error("invalid value for header '{name}': {reason}")]
    InvalidHeaderValue { name: String, reason: String },

    #[error("{field} must be a finite, non-negative number of seconds (got {value})")]
    InvalidDuration { field: &'static str, value: f64 },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// The result of one failed HTTP attempt.
///
/// Every variant is retryable. The `Display` output is what ends up in the
/// endpoint's accumulated error list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Server answered, but not with a 2xx
    #[error("HTTP {status} from {url}")]
    Status { status: StatusCode, url: String },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("could not resolve host for {url}: {message}")]
    Dns { url: String, message: String },

    #[error("connection to {url} failed: {message}")]
    Connect { url: String, message: String },

    #[error("TLS error for {url}: {message}")]
    Tls { url: String, message: String },

    #[error("request to {url} failed: {message}")]
    Other { url: String, message: String },
}

impl TransportError {
    /// Sorts a reqwest error into one of our variants.
    ///
    /// reqwest only exposes a few `is_*` predicates, so DNS and TLS problems
    /// are recognised by keywords ("dns", "certificate", "tls", "ssl") in the
    /// flattened error chain.
    pub fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        let url = url.to_string();

        if let Some(status) = error.status() {
            return TransportError::Status { status, url };
        }

        // The full source chain carries the useful detail ("dns error: ...")
        let message = error_chain(&error);
        let lowered = message.to_lowercase();

        if error.is_timeout() {
            TransportError::Timeout { url }
        } else if error.is_connect() && lowered.contains("dns") {
            TransportError::Dns { url, message }
        } else if lowered.contains("certificate") || lowered.contains("tls") || lowered.contains("ssl") {
            TransportError::Tls { url, message }
        } else if error.is_connect() {
            TransportError::Connect { url, message }
        } else {
            TransportError::Other { url, message }
        }
    }
}

// Joins an error and all of its sources into one line
fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
