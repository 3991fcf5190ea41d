//! Cooperative cancellation for engine runs.
//!
//! Engines poll the token between bulk-synchronous iterations only; an
//! in-flight sweep always runs to completion. A cancelled run returns
//! [`TobikoError::Cancelled`](crate::TobikoError::Cancelled) and no result.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Shared flag used to cancel a clustering run between iterations.
///
/// Cloning the token shares the underlying flag, so a caller can hand one
/// clone to the builder and keep another to trigger cancellation from a
/// different thread.
///
/// # Examples
/// ```
/// use tobiko_core::CancellationToken;
///
/// let token = CancellationToken::new();
/// let observer = token.clone();
/// assert!(!observer.is_cancelled());
/// token.cancel();
/// assert!(observer.is_cancelled());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of every run observing this token.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Returns `true` once cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
