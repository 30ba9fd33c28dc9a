//! Group-completion barrier.
//!
//! A `Barrier` counts down from the expected number of completions; waiters
//! block until the counter reaches zero. Tasks share it through an `Arc`, so
//! it cannot be dropped while a task still holds a reference.

use std::sync::{Condvar, Mutex};

use crate::domain::PoolError;

pub struct Barrier {
    remaining: Mutex<i64>,
    all_done: Condvar,
}

impl Barrier {
    /// Creates a barrier expecting `count` completions.
    ///
    /// A zero count is legal: `wait_for_all` returns immediately.
    pub fn new(count: i64) -> Result<Self, PoolError> {
        if count < 0 {
            return Err(PoolError::InvalidArgument("barrier count must be non-negative"));
        }
        Ok(Self { remaining: Mutex::new(count), all_done: Condvar::new() })
    }

    /// Records one completed task.
    ///
    /// Fails with [`PoolError::OverCompletion`] when called more times than
    /// the initial count.
    pub fn notify_completed(&self) -> Result<(), PoolError> {
        {
            let mut remaining = self.remaining.lock().unwrap();
            *remaining -= 1;
            if *remaining < 0 {
                return Err(PoolError::OverCompletion);
            }
        }
        self.all_done.notify_all();
        Ok(())
    }

    /// Blocks the calling thread until every expected task has completed.
    ///
    /// Deadlocks if fewer than `count` tasks ever notify; the barrier has no
    /// way to know how many are still coming.
    pub fn wait_for_all(&self) {
        let mut remaining = self.remaining.lock().unwrap();
        while *remaining != 0 {
            remaining = self.all_done.wait(remaining).unwrap();
        }
    }
}
