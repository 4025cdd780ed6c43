//! Queue endpoints.
//!
//! Queue membership is derived from departments, not fetched from the
//! routing API.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use presence_core::{DerivedStats, QueueCount};
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::handlers::agents::ListAgentsResponse;
use crate::api::state::AppState;
use crate::platform::PlatformApi;

/// Response for the queue list.
#[derive(Debug, Serialize)]
pub struct ListQueuesResponse {
    /// Every active queue, sorted by name.
    pub queues: Vec<QueueCount>,
    /// Queues with at least one active agent.
    pub queues_with_active_agents: Vec<String>,
}

/// List active queues with their agent counts.
///
/// # Errors
///
/// Returns `NotReady` before the first snapshot and `SessionClosed` after logout.
pub async fn list_queues<P>(
    State(state): State<Arc<AppState<P>>>,
) -> Result<impl IntoResponse, ApiError>
where
    P: PlatformApi + 'static,
{
    let snapshot = state.current_snapshot()?;
    let stats = DerivedStats::new(&snapshot.agents);

    Ok(Json(ListQueuesResponse {
        queues: stats.queue_counts(),
        queues_with_active_agents: stats.queues_with_active_agents(),
    }))
}

/// List the agents associated with one queue.
///
/// An unknown queue yields an empty list.
///
/// # Errors
///
/// Returns `NotReady` before the first snapshot and `SessionClosed` after logout.
pub async fn list_queue_agents<P>(
    State(state): State<Arc<AppState<P>>>,
    Path(queue): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    P: PlatformApi + 'static,
{
    let snapshot = state.current_snapshot()?;
    let agents = DerivedStats::new(&snapshot.agents)
        .agents_in_queue(&queue)
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(ListAgentsResponse::new(agents, &snapshot)))
}
