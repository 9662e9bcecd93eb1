use std::sync::atomic::{AtomicUsize, Ordering};

/// Ceiling on generator + search calls for one research run.
///
/// Calls are reserved before they are made; a reservation either fits entirely
/// or takes nothing. Safe to share between concurrently refined branches.
#[derive(Debug)]
pub struct CallBudget {
    limit: usize,
    used: AtomicUsize,
}

impl CallBudget {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            used: AtomicUsize::new(0),
        }
    }

    pub fn unlimited() -> Self {
        Self::new(usize::MAX)
    }

    /// Reserve `calls` if they fit under the limit.
    pub fn try_reserve(&self, calls: usize) -> bool {
        self.used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                used.checked_add(calls).filter(|total| *total <= self.limit)
            })
            .is_ok()
    }

    /// Hand back calls that were reserved but will not be made.
    pub fn release(&self, calls: usize) {
        let _ = self
            .used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                Some(used.saturating_sub(calls))
            });
    }

    pub fn used(&self) -> usize {
        self.used.load(Ordering::Acquire)
    }

    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.used())
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
