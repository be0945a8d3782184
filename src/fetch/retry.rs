// src/fetch/retry.rs
// =============================================================================
// The retry controller: drives one endpoint from its first attempt to a
// terminal outcome.
//
//   Attempting(n) --ok--------------------------> Succeeded   (terminal)
//   Attempting(n) --err, n <  max_attempts------> BackingOff(n)
//   Attempting(n) --err, n == max_attempts------> Failed      (terminal)
//   BackingOff(n) --sleep delay(factor, n)------> Attempting(n + 1)
//
// Attempts are strictly sequential. Every failure is written to the error
// list before the next transition. The controller never returns an error:
// whatever happens, the caller gets a FetchOutcome.
//
// With a run deadline set, no attempt starts after the deadline and no
// backoff is started that would end after it. Attempts already on the
// wire are never cancelled.
// =============================================================================

use crate::config::{FetchConfig, DEFAULT_BACKOFF_FACTOR_SECS, DEFAULT_MAX_ATTEMPTS};
use crate::error::ConfigError;
use crate::fetch::backoff;
use crate::fetch::observer::FetchObserver;
use crate::fetch::outcome::FetchOutcome;
use crate::fetch::transport::Transport;
use reqwest::header::HeaderMap;
use std::time::Duration;
use tokio::time::Instant;

/// Error recorded when the run deadline stops an endpoint.
pub const DEADLINE_EXCEEDED: &str = "run deadline exceeded";

/// How many times to try, and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_factor: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_factor: Duration::from_secs_f64(DEFAULT_BACKOFF_FACTOR_SECS),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &FetchConfig) -> Result<Self, ConfigError> {
        if config.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        Ok(RetryPolicy {
            max_attempts: config.max_attempts,
            backoff_factor: config.backoff_factor()?,
        })
    }
}

#[derive(Debug)]
enum RetryState {
    Attempting(u32),
    BackingOff(u32),
    Succeeded { payload: Vec<u8>, attempts: u32 },
    Failed,
}

/// Retry loop for a single endpoint.
pub struct RetryController<'a, T: ?Sized> {
    endpoint: &'a str,
    transport: &'a T,
    headers: &'a HeaderMap,
    policy: RetryPolicy,
    observer: &'a dyn FetchObserver,
    deadline: Option<Instant>,
    errors: Vec<String>,
}

impl<'a, T: Transport + ?Sized> RetryController<'a, T> {
    pub fn new(
        endpoint: &'a str,
        transport: &'a T,
        headers: &'a HeaderMap,
        policy: RetryPolicy,
        observer: &'a dyn FetchObserver,
    ) -> Self {
        RetryController {
            endpoint,
            transport,
            headers,
            policy,
            observer,
            deadline: None,
            errors: Vec::new(),
        }
    }

    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Runs the state machine to completion.
    pub async fn run(mut self) -> FetchOutcome {
        let mut state = RetryState::Attempting(1);

        loop {
            state = match state {
                RetryState::Attempting(attempt) => self.attempt(attempt).await,
                RetryState::BackingOff(attempt) => self.back_off(attempt).await,
                RetryState::Succeeded { payload, attempts } => {
                    self.observer.endpoint_succeeded(self.endpoint, attempts);
                    return FetchOutcome::Success { payload };
                }
                RetryState::Failed => {
                    self.observer.endpoint_failed(self.endpoint, &self.errors);
                    return FetchOutcome::Failed { errors: self.errors };
                }
            };
        }
    }

    async fn attempt(&mut self, attempt: u32) -> RetryState {
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            self.errors.push(DEADLINE_EXCEEDED.to_string());
            return RetryState::Failed;
        }

        match self.transport.fetch(self.endpoint, self.headers).await {
            Ok(payload) => RetryState::Succeeded {
                payload,
                attempts: attempt,
            },
            Err(error) => {
                let error = error.to_string();
                self.observer.attempt_failed(self.endpoint, attempt, &error);
                self.errors.push(error);

                // No backoff after the final attempt
                if attempt < self.policy.max_attempts {
                    RetryState::BackingOff(attempt)
                } else {
                    RetryState::Failed
                }
            }
        }
    }

    async fn back_off(&mut self, attempts_made: u32) -> RetryState {
        let delay = backoff::delay(self.policy.backoff_factor, attempts_made);

        if let Some(deadline) = self.deadline {
            let resumes_at = Instant::now().checked_add(delay);
            if resumes_at.map_or(true, |at| at > deadline) {
                self.errors.push(DEADLINE_EXCEEDED.to_string());
                return RetryState::Failed;
            }
        }

        self.observer.backing_off(self.endpoint, attempts_made, delay);
        tokio::time::sleep(delay).await;
        RetryState::Attempting(attempts_made + 1)
    }
}
