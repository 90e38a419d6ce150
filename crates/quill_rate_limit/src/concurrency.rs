//! Admit-or-reject concurrency bound.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::{RateLimitError, RateLimitErrorKind};

/// Fixed-capacity counting semaphore that never queues.
///
/// # Examples
///
/// ```
/// use quill_rate_limit::ConcurrencyLimiter;
///
/// let limiter = ConcurrencyLimiter::new(1);
/// let permit = limiter.try_acquire().unwrap();
/// assert!(limiter.try_acquire().is_err());
/// drop(permit);
/// assert!(limiter.try_acquire().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    capacity: usize,
    semaphore: Arc<Semaphore>,
}

/// A held concurrency slot, released on drop.
#[derive(Debug)]
pub struct ConcurrencyPermit {
    _permit: OwnedSemaphorePermit,
}

impl ConcurrencyLimiter {
    /// Create a limiter with `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            semaphore: Arc::new(Semaphore::new(capacity)),
        }
    }

    /// Total slots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently free.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Take a slot without waiting.
    ///
    /// # Errors
    ///
    /// Returns `Saturated` when no slot is free.
    pub fn try_acquire(&self) -> Result<ConcurrencyPermit, RateLimitError> {
        self.semaphore
            .clone()
            .try_acquire_owned()
            .map(|permit| ConcurrencyPermit { _permit: permit })
            .map_err(|_| RateLimitError::new(RateLimitErrorKind::Saturated(self.capacity)))
    }
}
