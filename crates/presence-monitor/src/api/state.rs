//! Shared state for the HTTP handlers.

use std::sync::Arc;

use crate::api::error::ApiError;
use crate::platform::PlatformApi;
use crate::refresh::{RefreshScheduler, Snapshot};

/// Application state available to every handler.
pub struct AppState<P: PlatformApi> {
    /// Scheduler of the open session.
    pub scheduler: RefreshScheduler<P>,
}

impl<P: PlatformApi> AppState<P> {
    /// Create a new application state.
    #[must_use]
    pub fn new(scheduler: RefreshScheduler<P>) -> Self {
        Self { scheduler }
    }

    /// Latest snapshot, or the error explaining why there is none.
    ///
    /// # Errors
    ///
    /// Returns `SessionClosed` after logout and `NotReady` before the first
    /// cycle completes.
    pub fn current_snapshot(&self) -> Result<Arc<Snapshot>, ApiError> {
        if self.scheduler.is_stopped() {
            return Err(ApiError::SessionClosed);
        }
        self.scheduler.snapshot().ok_or(ApiError::NotReady)
    }
}

impl<P: PlatformApi> Clone for AppState<P> {
    fn clone(&self) -> Self {
        Self {
            scheduler: self.scheduler.clone(),
        }
    }
}
