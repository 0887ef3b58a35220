//! Submission id allocation.
//!
//! Ids come from the millisecond clock so they double as a creation-time
//! ordering, and are bumped past the previous id whenever two requests
//! land in the same millisecond. Strictly increasing for the lifetime of
//! the process; the store itself never generates or validates ids.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// Process-wide allocator of strictly increasing submission ids.
#[derive(Debug, Default)]
pub struct IdAllocator {
    last: AtomicI64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id: the current millisecond timestamp, or one
    /// past the previous id if the clock has not advanced.
    pub fn next(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(prev + 1);
            match self.last.compare_exchange_weak(
                prev,
                candidate,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(actual) => prev = actual,
            }
        }
    }
}
