// src/fetch/test_support.rs
// =============================================================================
// Test doubles shared by the retry and engine tests.
//
// - ScriptedTransport: a fake network. Each endpoint can be given a queue of
//   scripted responses; once the queue runs dry the fallback answer is used.
//   Every call is recorded with start/end timestamps (tokio time, so paused
//   clocks work).
// - RecordingObserver: remembers every event the controller reports.
// =============================================================================

use crate::error::TransportError;
use crate::fetch::observer::FetchObserver;
use crate::fetch::transport::Transport;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

pub(crate) fn payload_for(endpoint: &str) -> Vec<u8> {
    format!("body of {}", endpoint).into_bytes()
}

pub(crate) fn refused(endpoint: &str) -> TransportError {
    TransportError::Connect {
        url: endpoint.to_string(),
        message: "connection refused".to_string(),
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Fallback {
    Succeed,
    Fail,
}

#[derive(Debug, Clone)]
pub(crate) struct Call {
    pub endpoint: String,
    pub started: Instant,
    pub finished: Instant,
}

pub(crate) struct ScriptedTransport {
    scripts: Mutex<HashMap<String, VecDeque<Result<Vec<u8>, TransportError>>>>,
    fallback: Fallback,
    latency: Duration,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    pub fn new(fallback: Fallback) -> Self {
        ScriptedTransport {
            scripts: Mutex::new(HashMap::new()),
            fallback,
            latency: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn always_succeed() -> Self {
        Self::new(Fallback::Succeed)
    }

    pub fn always_fail() -> Self {
        Self::new(Fallback::Fail)
    }

    /// Each call takes this long (virtual time under a paused clock)
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Fails the first `failures` calls for `endpoint`, then falls back.
    pub fn failing_first(self, endpoint: &str, failures: usize) -> Self {
        let script = (0..failures).map(|_| Err(refused(endpoint))).collect();
        self.scripts.lock().unwrap().insert(endpoint.to_string(), script);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, endpoint: &str) -> usize {
        self.calls().iter().filter(|c| c.endpoint == endpoint).count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn fetch(&self, endpoint: &str, _headers: &HeaderMap) -> Result<Vec<u8>, TransportError> {
        let started = Instant::now();
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let scripted = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(endpoint)
            .and_then(VecDeque::pop_front);
        let result = scripted.unwrap_or_else(|| match self.fallback {
            Fallback::Succeed => Ok(payload_for(endpoint)),
            Fallback::Fail => Err(refused(endpoint)),
        });

        self.calls.lock().unwrap().push(Call {
            endpoint: endpoint.to_string(),
            started,
            finished: Instant::now(),
        });
        result
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Event {
    AttemptFailed { endpoint: String },
    BackingOff { endpoint: String, delay: Duration },
    Succeeded { endpoint: String },
    Failed { endpoint: String, errors: Vec<String> },
}

#[derive(Default)]
pub(crate) struct RecordingObserver {
    events: Mutex<Vec<Event>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn warnings_for(&self, endpoint: &str) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::AttemptFailed { endpoint: ep } if ep == endpoint))
            .count()
    }

    pub fn failures_for(&self, endpoint: &str) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Failed { endpoint: ep, .. } if ep == endpoint))
            .count()
    }

    pub fn delays_for(&self, endpoint: &str) -> Vec<Duration> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::BackingOff { endpoint: ep, delay } if ep == endpoint => Some(delay),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl FetchObserver for RecordingObserver {
    fn attempt_failed(&self, endpoint: &str, _attempt: u32, _error: &str) {
        self.record(Event::AttemptFailed {
            endpoint: endpoint.to_string(),
        });
    }

    fn backing_off(&self, endpoint: &str, _attempt: u32, delay: Duration) {
        self.record(Event::BackingOff {
            endpoint: endpoint.to_string(),
            delay,
        });
    }

    fn endpoint_succeeded(&self, endpoint: &str, _attempts: u32) {
        self.record(Event::Succeeded {
            endpoint: endpoint.to_string(),
        });
    }

    fn endpoint_failed(&self, endpoint: &str, errors: &[String]) {
        self.record(Event::Failed {
            endpoint: endpoint.to_string(),
            errors: errors.to_vec(),
        });
    }
}
