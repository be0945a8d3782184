// src/lib.rs
// =============================================================================
// fetch-guardian as a library.
//
// The core is `fetch`: a bounded-concurrency HTTP fetch engine that gets
// every unique endpoint exactly once, retries transient failures with
// exponential backoff, and always returns one outcome per endpoint.
//
// `extract` is the blocklist harvester the command-line tool is built on.
// =============================================================================

pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;

pub use config::FetchConfig;
pub use error::{ConfigError, TransportError};
pub use fetch::{fetch_all, FetchEngine, FetchObserver, FetchOutcome, ResultMapping};
