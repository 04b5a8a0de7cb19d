//! Re-entrancy guard for export and submit.
//!
//! While an export or submission is in flight the triggering control is
//! disabled; a second attempt is dropped, never queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared "operation in flight" flag.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag {
    busy: Arc<AtomicBool>,
}

impl BusyFlag {
    /// Create an idle flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an operation currently holds the flag.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Claim the flag, or `None` if it is already held.
    #[must_use]
    pub fn try_acquire(&self) -> Option<BusyGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard {
                busy: Arc::clone(&self.busy),
            })
    }
}

/// Holds the flag until dropped.
///
/// Dropping on success, error, cancellation or unwind all release it.
#[derive(Debug)]
#[must_use = "the flag is released as soon as the guard is dropped"]
pub struct BusyGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_refused() {
        let flag = BusyFlag::new();
        let guard = flag.try_acquire().expect("first");
        assert!(flag.is_busy());
        assert!(flag.try_acquire().is_none());
        drop(guard);
        assert!(!flag.is_busy());
        assert!(flag.try_acquire().is_some());
    }

    #[test]
    fn test_clones_share_state() {
        let flag = BusyFlag::new();
        let other = flag.clone();
        let _guard = flag.try_acquire().expect("acquire");
        assert!(other.is_busy());
        assert!(other.try_acquire().is_none());
    }

    #[test]
    fn test_released_on_panic() {
        let flag = BusyFlag::new();
        let inner = flag.clone();
        let result = std::panic::catch_unwind(move || {
            let _guard = inner.try_acquire().expect("acquire");
            panic!("export blew up");
        });
        assert!(result.is_err());
        assert!(!flag.is_busy());
    }
}
