//! Liveness and session status.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::state::AppState;
use crate::platform::PlatformApi;
use crate::refresh::{RefreshState, SnapshotSource};

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `"healthy"` while the session is open, `"session_closed"` after logout.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Whether the authenticated session is still open.
    pub session_open: bool,
    /// Whether a snapshot has been published.
    pub snapshot_ready: bool,
    /// Scheduler state.
    pub refresh_state: RefreshState,
    /// Source of the current snapshot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SnapshotSource>,
    /// When the current snapshot was taken.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// Health check handler.
///
/// Always answers 200 so it can serve as a liveness check. The body says
/// whether the session is open and data is available.
///
/// ```text
/// GET /health
///
/// Response: 200 OK
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "session_open": true,
///   "snapshot_ready": true,
///   "refresh_state": "idle",
///   "source": "live",
///   "refreshed_at": "2024-05-01T09:30:00Z"
/// }
/// ```
pub async fn health<P>(State(state): State<Arc<AppState<P>>>) -> Json<HealthResponse>
where
    P: PlatformApi + 'static,
{
    let session_open = !state.scheduler.is_stopped();
    let snapshot = state.scheduler.snapshot();

    Json(HealthResponse {
        status: if session_open { "healthy" } else { "session_closed" },
        version: env!("CARGO_PKG_VERSION"),
        session_open,
        snapshot_ready: snapshot.is_some(),
        refresh_state: state.scheduler.state(),
        source: snapshot.as_ref().map(|s| s.source),
        refreshed_at: snapshot.as_ref().map(|s| s.refreshed_at),
    })
}
