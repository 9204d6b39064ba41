//! Cooperative cancellation token
//!
//! Replaces a global "exit requested" flag with an explicit token injected
//! into the fetch orchestrator. The token is polled at defined check points
//! (before the first page, before each subsequent page); it never aborts a
//! request mid-flight. A one-shot callback fires the first time the token is
//! signaled, letting an external shutdown handler snapshot partial progress.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

type CancelCallback = Box<dyn FnOnce() + Send>;

struct Inner {
    cancelled: AtomicBool,
    callback: Mutex<Option<CancelCallback>>,
}

/// Polled stop signal shared between the orchestrator and its caller
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                callback: Mutex::new(None),
            }),
        }
    }

    /// True once cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Register the callback invoked once on the first `cancel()` call.
    ///
    /// If the token is already cancelled the callback runs immediately.
    /// The cancelled flag is checked under the callback mutex so the
    /// registration cannot slip into the slot after `cancel()` has already
    /// drained it.
    pub fn on_cancel<F: FnOnce() + Send + 'static>(&self, callback: F) {
        let mut pending = Some(Box::new(callback) as CancelCallback);
        if let Ok(mut slot) = self.inner.callback.lock() {
            if !self.is_cancelled() {
                *slot = pending.take();
            }
        }
        if let Some(callback) = pending {
            callback();
        }
    }

    /// Signal cancellation; idempotent, fires the callback at most once
    pub fn cancel(&self) {
        let callback = {
            let slot = self.inner.callback.lock();
            if self.inner.cancelled.swap(true, Ordering::SeqCst) {
                return;
            }
            slot.ok().and_then(|mut s| s.take())
        };
        log::info!("Cancellation requested");
        if let Some(callback) = callback {
            callback();
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_starts_unset() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_cancel_is_sticky_and_callback_fires_once() {
        let token = CancelToken::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        token.on_cancel(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        token.cancel();
        token.cancel();

        assert!(token.is_cancelled());
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_callback_registered_after_cancel_runs_immediately() {
        let token = CancelToken::new();
        token.cancel();

        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        token.on_cancel(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_register_and_cancel_fires_exactly_once() {
        for _ in 0..200 {
            let token = CancelToken::new();
            let fired = Arc::new(AtomicUsize::new(0));

            let registrar = {
                let token = token.clone();
                let counter = fired.clone();
                std::thread::spawn(move || {
                    token.on_cancel(move || {
                        counter.fetch_add(1, Ordering::SeqCst);
                    });
                })
            };
            let canceller = {
                let token = token.clone();
                std::thread::spawn(move || token.cancel())
            };

            registrar.join().unwrap();
            canceller.join().unwrap();
            assert_eq!(fired.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn test_clones_share_state() {
        let token = CancelToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
