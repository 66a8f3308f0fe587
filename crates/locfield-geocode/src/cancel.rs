//! Single-flight cancellation for reverse-geocode requests.

use std::sync::{Arc, Mutex, PoisonError};

use futures::future::{AbortHandle, AbortRegistration};

/// Per-modal-instance cancellation handle with abort-then-replace semantics.
///
/// One handle is owned by the modal and lent to whichever component issues
/// the next reverse geocode. [`CancelHandle::arm`] aborts any prior in-flight
/// registration and hands out a fresh one under a single lock, so two live
/// requests can never coexist for the same field.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    inner: Arc<Mutex<Option<AbortHandle>>>,
}

impl CancelHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Aborts the previous in-flight request, if any, and returns a
    /// registration for the next one.
    #[must_use]
    pub fn arm(&self) -> AbortRegistration {
        let mut slot = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(prev) = slot.take() {
            prev.abort();
        }
        let (handle, registration) = AbortHandle::new_pair();
        *slot = Some(handle);
        registration
    }

    /// Aborts the current in-flight request without arming a new one.
    /// Used when the modal closes or the search query changes.
    pub fn cancel(&self) {
        let mut slot = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(prev) = slot.take() {
            prev.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::future::{Abortable, Aborted};

    use super::*;

    #[tokio::test]
    async fn arming_again_aborts_the_previous_registration() {
        let handle = CancelHandle::new();
        let first = handle.arm();
        let pending = Abortable::new(std::future::pending::<()>(), first);
        let _second = handle.arm();
        assert_eq!(pending.await, Err(Aborted));
    }

    #[tokio::test]
    async fn cancel_aborts_without_arming() {
        let handle = CancelHandle::new();
        let reg = handle.arm();
        let pending = Abortable::new(std::future::pending::<()>(), reg);
        handle.cancel();
        assert_eq!(pending.await, Err(Aborted));
    }

    #[tokio::test]
    async fn completed_work_is_unaffected_by_later_arms() {
        let handle = CancelHandle::new();
        let reg = handle.arm();
        let done = Abortable::new(async { 7 }, reg).await;
        assert_eq!(done, Ok(7));
        let _ = handle.arm();
    }
}
