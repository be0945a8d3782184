// src/fetch/observer.rs
// =============================================================================
// The observability side channel.
//
// The retry controller reports what happens to an endpoint through the
// FetchObserver trait instead of writing to a global logger. The default,
// TracingObserver, turns those reports into tracing events:
// - WARN  once per failed attempt
// - ERROR once per endpoint that used up every attempt
// Tests plug in their own observer to count events and record delays.
// =============================================================================

use std::time::Duration;

/// Receives per-endpoint events from the retry controller.
///
/// Calls happen from inside the run, so implementations should be quick.
pub trait FetchObserver: Send + Sync {
    /// Attempt `attempt` (1-based) for `endpoint` failed.
    fn attempt_failed(&self, endpoint: &str, attempt: u32, error: &str);

    /// The controller is about to sleep `delay` before the next attempt.
    fn backing_off(&self, _endpoint: &str, _attempt: u32, _delay: Duration) {}

    fn endpoint_succeeded(&self, _endpoint: &str, _attempts: u32) {}

    /// The endpoint reached its terminal failure; `errors` is the full list.
    fn endpoint_failed(&self, endpoint: &str, errors: &[String]);
}

/// Emits events through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl FetchObserver for TracingObserver {
    fn attempt_failed(&self, endpoint: &str, attempt: u32, error: &str) {
        tracing::warn!(endpoint, attempt, error, "attempt {} failed", attempt);
    }

    fn backing_off(&self, endpoint: &str, attempt: u32, delay: Duration) {
        tracing::debug!(
            endpoint,
            attempt,
            delay_ms = delay.as_millis() as u64,
            "backing off before retry"
        );
    }

    fn endpoint_succeeded(&self, endpoint: &str, attempts: u32) {
        if attempts > 1 {
            tracing::info!(endpoint, attempts, "GET request succeeded after retry");
        } else {
            tracing::debug!(endpoint, "GET request succeeded");
        }
    }

    fn endpoint_failed(&self, endpoint: &str, errors: &[String]) {
        tracing::error!(endpoint, ?errors, "GET request failed for {}", endpoint);
    }
}
