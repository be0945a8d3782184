// src/fetch/engine.rs
// =============================================================================
// The fetch orchestrator.
//
// How a run works:
// 1. Deduplicate the endpoints
// 2. Build one future per unique endpoint: take a gate permit, wait the
//    settle delay, then run the retry controller while holding the permit
// 3. Drive all of those futures at once and collect each outcome as soon
//    as it finishes (completion order, not input order)
// 4. Return when every endpoint has a terminal outcome
//
// The orchestrator never retries and never touches the network itself.
// Everything fatal (bad config, client build failure) is caught when the
// engine is constructed, before any endpoint work starts.
// =============================================================================

use crate::config::FetchConfig;
use crate::error::ConfigError;
use crate::fetch::dedup::dedup_endpoints;
use crate::fetch::gate::ConcurrencyGate;
use crate::fetch::observer::{FetchObserver, TracingObserver};
use crate::fetch::outcome::{FetchOutcome, ResultMapping};
use crate::fetch::retry::{RetryController, RetryPolicy, DEADLINE_EXCEEDED};
use crate::fetch::transport::{HttpTransport, Transport};
use futures::stream::{FuturesUnordered, StreamExt};
use reqwest::header::HeaderMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Fetches many endpoints concurrently, each exactly once, with retries.
///
/// The gate belongs to the engine, so runs started concurrently on the same
/// engine share one concurrency ceiling.
pub struct FetchEngine<T = HttpTransport> {
    transport: T,
    headers: HeaderMap,
    gate: ConcurrencyGate,
    policy: RetryPolicy,
    settle_delay: Duration,
    deadline: Option<Duration>,
    observer: Arc<dyn FetchObserver>,
}

impl FetchEngine<HttpTransport> {
    /// Engine backed by the real HTTP transport.
    pub fn new(config: &FetchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let transport = HttpTransport::from_config(config)?;
        FetchEngine::with_transport(config, transport)
    }
}

impl<T: Transport> FetchEngine<T> {
    pub fn with_transport(config: &FetchConfig, transport: T) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(FetchEngine {
            transport,
            headers: config.header_map()?,
            gate: ConcurrencyGate::new(config.concurrency_limit)?,
            policy: RetryPolicy::from_config(config)?,
            settle_delay: config.settle_delay()?,
            deadline: config.deadline()?,
            observer: Arc::new(TracingObserver),
        })
    }

    /// Replaces the default tracing observer.
    pub fn with_observer(mut self, observer: Arc<dyn FetchObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn concurrency_limit(&self) -> usize {
        self.gate.capacity()
    }

    /// Fetches every unique endpoint and returns one outcome per endpoint.
    pub async fn run<I, S>(&self, endpoints: I) -> ResultMapping
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let endpoints = dedup_endpoints(endpoints);
        // A deadline too far out to represent is the same as no deadline
        let deadline = self
            .deadline
            .and_then(|limit| Instant::now().checked_add(limit));

        tracing::info!(
            endpoints = endpoints.len(),
            concurrency_limit = self.gate.capacity(),
            "starting fetch run"
        );

        let mut pending: FuturesUnordered<_> = endpoints
            .into_iter()
            .map(|endpoint| self.fetch_endpoint(endpoint, deadline))
            .collect();

        let mut mapping = ResultMapping::with_capacity(pending.len());
        while let Some((endpoint, outcome)) = pending.next().await {
            mapping.insert(endpoint, outcome);
        }

        let failed = mapping.values().filter(|o| !o.is_success()).count();
        tracing::info!(
            fetched = mapping.len() - failed,
            failed,
            "fetch run complete"
        );

        mapping
    }

    // One endpoint, start to finish. The permit is held until this returns.
    async fn fetch_endpoint(
        &self,
        endpoint: String,
        deadline: Option<Instant>,
    ) -> (String, FetchOutcome) {
        let acquired = match deadline {
            Some(deadline) => match tokio::time::timeout_at(deadline, self.gate.acquire()).await {
                Ok(acquired) => acquired.map_err(|e| e.to_string()),
                Err(_) => Err(DEADLINE_EXCEEDED.to_string()),
            },
            None => self.gate.acquire().await.map_err(|e| e.to_string()),
        };

        let _permit = match acquired {
            Ok(permit) => permit,
            Err(reason) => {
                let errors = vec![reason];
                self.observer.endpoint_failed(&endpoint, &errors);
                return (endpoint, FetchOutcome::Failed { errors });
            }
        };

        // Smooth out the burst of requests right after permits free up
        tokio::time::sleep(self.settle_delay).await;

        let outcome = RetryController::new(
            &endpoint,
            &self.transport,
            &self.headers,
            self.policy,
            self.observer.as_ref(),
        )
        .with_deadline(deadline)
        .run()
        .await;

        (endpoint, outcome)
    }
}

/// One-shot helper: builds an HTTP engine from `config` and runs it.
pub async fn fetch_all<I, S>(endpoints: I, config: &FetchConfig) -> Result<ResultMapping, ConfigError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let engine = FetchEngine::new(config)?;
    Ok(engine.run(endpoints).await)
}
