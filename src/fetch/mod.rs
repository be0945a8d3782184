// src/fetch/mod.rs
// =============================================================================
// This module contains the bounded-concurrency fetch engine.
//
// Submodules, leaves first:
// - backoff:   how long to wait between attempts
// - transport: one HTTP GET (plus dns, its caching resolver)
// - retry:     the per-endpoint retry state machine
// - gate:      the permit pool that caps concurrent endpoints
// - dedup:     collapses duplicate endpoints
// - engine:    ties it all together and aggregates the results
// - outcome / observer: what comes out, and who hears about failures
// =============================================================================

pub mod backoff;
mod dedup;
mod dns;
mod engine;
mod gate;
mod observer;
mod outcome;
mod retry;
mod transport;

#[cfg(test)]
mod test_support;

pub use dedup::dedup_endpoints;
pub use dns::CachingResolver;
pub use engine::{fetch_all, FetchEngine};
pub use gate::{ConcurrencyGate, GatePermit};
pub use observer::{FetchObserver, TracingObserver};
pub use outcome::{FetchOutcome, ResultMapping, LEGACY_FAILURE_PAYLOAD};
pub use retry::{RetryController, RetryPolicy, DEADLINE_EXCEEDED};
pub use transport::{HttpTransport, Transport};
