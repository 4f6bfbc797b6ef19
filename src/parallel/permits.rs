use crate::error::{PipelineError, Result};
use std::sync::{Condvar, Mutex, PoisonError};

/// Counting semaphore capping how many workers run at the same time
pub struct PermitPool {
    available: Mutex<usize>,
    released: Condvar,
    capacity: usize,
}

impl PermitPool {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity < 1 {
            return Err(PipelineError::Configuration(
                "max_workers must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            available: Mutex::new(capacity),
            released: Condvar::new(),
            capacity,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Block until a permit is free and take it.
    pub fn acquire(&self) -> Permit<'_> {
        let mut available = self
            .available
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        while *available == 0 {
            available = self
                .released
                .wait(available)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *available -= 1;
        Permit { pool: self }
    }

    pub fn available(&self) -> usize {
        *self
            .available
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn release(&self) {
        let mut available = self
            .available
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *available += 1;
        self.released.notify_one();
    }
}

/// A held permit, returned to the pool on drop
pub struct Permit<'a> {
    pool: &'a PermitPool,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.pool.release();
    }
}
