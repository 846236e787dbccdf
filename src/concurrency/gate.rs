//! Counting gate over a tokio semaphore.
//!
//! Permits are handed to waiters in FIFO order on release. A waiter whose
//! `acquire` future is dropped leaves the queue immediately, so an abandoned
//! request never holds a queue slot.

use crate::error::GenerationError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

/// Bounds how many generation tasks run at once.
#[derive(Debug)]
pub struct ConcurrencyGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    waiting: AtomicUsize,
}

/// A held slot. Dropping it releases the slot to the oldest waiter.
#[derive(Debug)]
pub struct GatePermit {
    _permit: OwnedSemaphorePermit,
}

impl GatePermit {
    /// Release the slot explicitly. Equivalent to dropping the permit.
    pub fn release(self) {}
}

/// Tracks a queued `acquire` call, including one cancelled mid-wait.
struct WaitingGuard<'a>(&'a AtomicUsize);

impl<'a> WaitingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for WaitingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ConcurrencyGate {
    /// Create a gate with `capacity` permits (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
            waiting: AtomicUsize::new(0),
        }
    }

    /// Take a permit, suspending until one is free.
    ///
    /// Fails with [`GenerationError::Cancelled`] once the gate is closed.
    pub async fn acquire(&self) -> Result<GatePermit, GenerationError> {
        if let Ok(permit) = Arc::clone(&self.semaphore).try_acquire_owned() {
            return Ok(GatePermit { _permit: permit });
        }
        if self.semaphore.is_closed() {
            return Err(GenerationError::Cancelled(
                "concurrency gate closed".to_string(),
            ));
        }

        let _waiting = WaitingGuard::enter(&self.waiting);
        debug!(
            in_flight = self.in_flight(),
            waiting = self.waiting(),
            "Waiting for generation slot"
        );
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| GenerationError::Cancelled("concurrency gate closed".to_string()))?;
        Ok(GatePermit { _permit: permit })
    }

    /// Close the gate; every queued and future `acquire` fails.
    pub fn close(&self) {
        self.semaphore.close();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits currently free.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Permits currently held.
    pub fn in_flight(&self) -> usize {
        self.capacity.saturating_sub(self.available())
    }

    /// Callers suspended in `acquire`.
    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }
}
