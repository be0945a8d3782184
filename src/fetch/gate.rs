// src/fetch/gate.rs
// =============================================================================
// The concurrency gate: a fixed pool of permits.
//
// An endpoint takes a permit before its first attempt and keeps it until
// its retry loop is over, backoff sleeps included. So the limit caps all
// in-flight work (network + waiting), not only open requests.
//
// Releasing is done by dropping the permit, which means it happens on every
// exit path: success, exhausted retries, or even a panic.
// =============================================================================

use crate::error::ConfigError;
use std::sync::Arc;
use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

#[derive(Debug, Clone)]
pub struct ConcurrencyGate {
    permits: Arc<Semaphore>,
    capacity: usize,
}

/// Proof that the holder may run. Dropping it hands the permit back.
#[derive(Debug)]
pub struct GatePermit {
    _permit: OwnedSemaphorePermit,
}

impl GatePermit {
    /// Gives the permit back explicitly. Same as dropping it.
    pub fn release(self) {}
}

impl ConcurrencyGate {
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        Ok(ConcurrencyGate {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        })
    }

    /// Waits until a permit is free.
    ///
    /// Errors only if the gate was closed, which the engine never does; the
    /// caller still turns that into a failed outcome rather than panicking.
    pub async fn acquire(&self) -> Result<GatePermit, AcquireError> {
        let permit = Arc::clone(&self.permits).acquire_owned().await?;
        Ok(GatePermit { _permit: permit })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits nobody is holding right now.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(ConcurrencyGate::new(0), Err(ConfigError::ZeroConcurrency)));
    }

    #[tokio::test]
    async fn test_permits_are_counted() {
        let gate = ConcurrencyGate::new(2).unwrap();
        let first = gate.acquire().await.unwrap();
        let second = gate.acquire().await.unwrap();
        assert_eq!(gate.available(), 0);

        first.release();
        assert_eq!(gate.available(), 1);

        drop(second);
        assert_eq!(gate.available(), gate.capacity());
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_waits_for_release() {
        let gate = ConcurrencyGate::new(1).unwrap();
        let held = gate.acquire().await.unwrap();

        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move { gate.acquire().await.map(|_| ()) })
        };

        // Still blocked while the only permit is held
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!waiter.is_finished());

        drop(held);
        assert!(waiter.await.unwrap().is_ok());
    }
}
