//! Cooperative cancellation for paging and polling loops.
//!
//! A [`CancelToken`] is a clonable flag shared between the caller and a
//! running sequence or poll loop. Cancellation is cooperative: it is only
//! observed at suspension points (between page fetches, at poll wait
//! intervals) and never aborts an in-flight request.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A clonable cancellation flag.
///
/// All clones observe the same flag, so the caller keeps one clone and hands
/// another to the sequence or poller it wants to be able to stop.
///
/// # Example
///
/// ```rust
/// use cloud_client_core::CancelToken;
///
/// let token = CancelToken::new();
/// let shared = token.clone();
///
/// assert!(!shared.is_canceled());
/// token.cancel();
/// assert!(shared.is_canceled());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    canceled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a new, not-yet-canceled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    ///
    /// Idempotent; once set, the flag never clears.
    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
    }

    /// Returns `true` if cancellation has been requested.
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }
}
