//! Manual refresh endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::handlers::agents::StatsResponse;
use crate::api::state::AppState;
use crate::platform::PlatformApi;
use crate::refresh::RefreshOutcome;

/// Body returned when the request joined a cycle already in flight.
#[derive(Debug, Serialize)]
pub struct CoalescedResponse {
    /// Always `"coalesced"`.
    pub status: &'static str,
}

/// Run a refresh cycle now.
///
/// Returns 200 with the new statistics, or 202 when a cycle was already
/// running and this request was folded into it.
///
/// # Errors
///
/// Returns `SessionClosed` if the session was closed before or during the cycle.
pub async fn refresh<P>(State(state): State<Arc<AppState<P>>>) -> Result<Response, ApiError>
where
    P: PlatformApi + 'static,
{
    match state.scheduler.refresh_now().await {
        RefreshOutcome::Completed(snapshot) => Ok((
            StatusCode::OK,
            Json(StatsResponse::new(&snapshot, state.scheduler.state())),
        )
            .into_response()),
        RefreshOutcome::Coalesced => Ok((
            StatusCode::ACCEPTED,
            Json(CoalescedResponse {
                status: "coalesced",
            }),
        )
            .into_response()),
        RefreshOutcome::Discarded => Err(ApiError::SessionClosed),
    }
}
