//! Non-blocking single-holder admission for expensive operations.
//!
//! Creating a new event must not be attempted by many workers at once, but a
//! worker that loses the race must not block either — it abandons event
//! creation for this cycle and moves on to other work, exactly as it would
//! on an empty pool. The token is therefore a try-acquire gate, independent
//! of every other lock in the core.

use std::sync::atomic::{AtomicBool, Ordering};

/// Single-holder gate with a non-blocking acquire.
///
/// # Example
///
/// ```
/// use ticketbench_core::AdmissionToken;
///
/// let token = AdmissionToken::new();
/// let guard = token.try_acquire();
/// assert!(guard.is_some());
/// assert!(token.try_acquire().is_none()); // contended, caller skips
/// drop(guard);
/// assert!(token.try_acquire().is_some()); // released on drop
/// ```
#[derive(Debug, Default)]
pub struct AdmissionToken {
    held: AtomicBool,
}

impl AdmissionToken {
    /// Creates a released token.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            held: AtomicBool::new(false),
        }
    }

    /// Attempts to take the token without blocking.
    ///
    /// Returns `None` immediately when another worker holds it; callers
    /// treat that exactly like an empty pool.
    #[must_use]
    pub fn try_acquire(&self) -> Option<AdmissionGuard<'_>> {
        self.held
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
            .then(|| AdmissionGuard { token: self })
    }
}

/// Proof of admission; releases the token when dropped, success or failure.
#[derive(Debug)]
pub struct AdmissionGuard<'a> {
    token: &'a AdmissionToken,
}

impl Drop for AdmissionGuard<'_> {
    fn drop(&mut self) {
        self.token.held.store(false, Ordering::Release);
    }
}
