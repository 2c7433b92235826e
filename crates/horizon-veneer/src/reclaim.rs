//! Waiting for a released object to be reclaimed.
//!
//! Leak checks hold a [`Weak`] handle to a skin, drop every strong handle
//! they own, and poll until the object is gone. Strong handles may still sit
//! in listener snapshots of a signal that is emitting on another thread, so
//! the check retries a bounded number of times before reporting a leak.

use std::sync::Weak;
use std::thread;

use crate::config::ReclaimPolicy;

/// Poll `weak` until nothing keeps its target alive.
///
/// Returns `true` once the target is reclaimed, `false` if it is still alive
/// after `policy.attempts` checks.
pub fn await_release<T>(weak: &Weak<T>, policy: &ReclaimPolicy) -> bool {
    for attempt in 0..policy.attempts.max(1) {
        if weak.strong_count() == 0 {
            tracing::trace!(target: "horizon_veneer::registry", attempt, "reclaimed");
            return true;
        }
        if attempt + 1 < policy.attempts {
            thread::sleep(policy.interval());
        }
    }
    let reclaimed = weak.strong_count() == 0;
    if !reclaimed {
        tracing::warn!(
            target: "horizon_veneer::registry",
            strong = weak.strong_count(),
            attempts = policy.attempts,
            "object still alive after reclaim attempts"
        );
    }
    reclaimed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_released_immediately() {
        let value = Arc::new(5);
        let weak = Arc::downgrade(&value);
        drop(value);
        assert!(await_release(&weak, &ReclaimPolicy::new(3, Duration::from_millis(1))));
    }

    #[test]
    fn test_leak_is_reported() {
        let value = Arc::new(5);
        let weak = Arc::downgrade(&value);
        assert!(!await_release(&weak, &ReclaimPolicy::new(2, Duration::from_millis(1))));
        drop(value);
    }

    #[test]
    fn test_released_by_another_thread() {
        let value = Arc::new(5);
        let weak = Arc::downgrade(&value);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(5));
            drop(value);
        });
        assert!(await_release(&weak, &ReclaimPolicy::new(200, Duration::from_millis(5))));
        handle.join().unwrap();
    }
}
