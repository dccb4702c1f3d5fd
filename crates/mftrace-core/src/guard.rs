//! Per-thread reentrancy guard.
//!
//! The logger's own formatting and I/O allocate, so an intercepted call
//! that logs will re-enter the wrappers on the same thread. The guard
//! detects that and makes the inner calls forward straight to the real
//! primitive, unlogged. A process-wide flag cannot do this job: two
//! threads entering concurrently would each suppress the other's logging
//! (or worse, both would observe the flag clear), so the state is
//! `thread_local!` with a `const` initializer, which also keeps the first
//! access on each thread allocation-free.

use std::cell::Cell;

std::thread_local! {
    static HOOK_DEPTH: Cell<u32> = const { Cell::new(0) };
}

/// RAII token proving the current thread was outside any intercepted call.
///
/// Dropping it re-opens the thread for interception.
#[derive(Debug)]
pub struct HookGuard {
    _not_send: std::marker::PhantomData<*const ()>,
}

impl HookGuard {
    /// Claim the current thread for one intercepted call.
    ///
    /// Returns `None` when the thread is already inside an intercepted
    /// call, in which case the caller must forward without logging and
    /// without attempting symbol resolution.
    #[must_use]
    pub fn enter() -> Option<Self> {
        HOOK_DEPTH.with(|depth| {
            let current = depth.get();
            if current > 0 {
                None
            } else {
                depth.set(current + 1);
                Some(HookGuard {
                    _not_send: std::marker::PhantomData,
                })
            }
        })
    }

    /// Whether the current thread is inside an intercepted call.
    #[must_use]
    pub fn is_inside() -> bool {
        HOOK_DEPTH.with(Cell::get) > 0
    }
}

impl Drop for HookGuard {
    fn drop(&mut self) {
        HOOK_DEPTH.with(|depth| {
            let current = depth.get();
            depth.set(current.saturating_sub(1));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_claims_and_drop_releases() {
        assert!(!HookGuard::is_inside());
        {
            let guard = HookGuard::enter();
            assert!(guard.is_some());
            assert!(HookGuard::is_inside());
        }
        assert!(!HookGuard::is_inside());
    }

    #[test]
    fn nested_enter_is_refused() {
        let outer = HookGuard::enter();
        assert!(outer.is_some());
        assert!(HookGuard::enter().is_none());
        drop(outer);
        assert!(HookGuard::enter().is_some());
    }

    #[test]
    fn guard_is_per_thread() {
        let outer = HookGuard::enter().unwrap();
        let other = std::thread::spawn(|| HookGuard::enter().is_some())
            .join()
            .unwrap();
        // A second thread is unaffected by this thread's guard.
        assert!(other);
        drop(outer);
    }
}
