//! Agent and statistics endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use presence_core::{AgentRecord, DerivedStats, StatsSummary, StatusColor};
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::platform::PlatformApi;
use crate::refresh::{RefreshState, Snapshot, SnapshotSource};

// =============================================================================
// Response Types
// =============================================================================

/// One agent with its presentation hints.
#[derive(Debug, Serialize)]
pub struct AgentResponse {
    /// The stored record.
    #[serde(flatten)]
    pub record: AgentRecord,
    /// Name with the placeholder applied.
    pub display_name: String,
    /// Department with the placeholder applied.
    pub display_department: String,
    /// Rendering hint for the status.
    pub status_color: StatusColor,
}

impl From<AgentRecord> for AgentResponse {
    fn from(record: AgentRecord) -> Self {
        Self {
            display_name: record.display_name().to_string(),
            display_department: record.display_department().to_string(),
            status_color: record.presence_status.color(),
            record,
        }
    }
}

/// Response for agent lists.
#[derive(Debug, Serialize)]
pub struct ListAgentsResponse {
    /// Agents sorted by display name.
    pub agents: Vec<AgentResponse>,
    /// When the snapshot was taken.
    pub refreshed_at: DateTime<Utc>,
    /// Live or fallback data.
    pub source: SnapshotSource,
}

impl ListAgentsResponse {
    pub(crate) fn new(agents: Vec<AgentRecord>, snapshot: &Snapshot) -> Self {
        Self {
            agents: agents.into_iter().map(AgentResponse::from).collect(),
            refreshed_at: snapshot.refreshed_at,
            source: snapshot.source,
        }
    }
}

/// Response for the statistics endpoint.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    /// Derived statistics.
    #[serde(flatten)]
    pub stats: StatsSummary,
    /// When the snapshot was taken.
    pub refreshed_at: DateTime<Utc>,
    /// Live or fallback data.
    pub source: SnapshotSource,
    /// Status line of the last cycle.
    pub message: String,
    /// Presence lookups that degraded to `Unknown`.
    pub presence_failures: usize,
    /// Scheduler state.
    pub state: RefreshState,
}

impl StatsResponse {
    pub(crate) fn new(snapshot: &Snapshot, state: RefreshState) -> Self {
        Self {
            stats: snapshot.stats.clone(),
            refreshed_at: snapshot.refreshed_at,
            source: snapshot.source,
            message: snapshot.message.clone(),
            presence_failures: snapshot.presence_failures,
            state,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// List every agent in the current snapshot.
///
/// # Errors
///
/// Returns `NotReady` before the first snapshot and `SessionClosed` after logout.
pub async fn list_agents<P>(
    State(state): State<Arc<AppState<P>>>,
) -> Result<impl IntoResponse, ApiError>
where
    P: PlatformApi + 'static,
{
    let snapshot = state.current_snapshot()?;
    Ok(Json(ListAgentsResponse::new(
        snapshot.agents.clone(),
        &snapshot,
    )))
}

/// List active agents, de-duplicated by id.
///
/// # Errors
///
/// Returns `NotReady` before the first snapshot and `SessionClosed` after logout.
pub async fn list_active_agents<P>(
    State(state): State<Arc<AppState<P>>>,
) -> Result<impl IntoResponse, ApiError>
where
    P: PlatformApi + 'static,
{
    let snapshot = state.current_snapshot()?;
    let active = DerivedStats::new(&snapshot.agents).distinct_active_agents();
    Ok(Json(ListAgentsResponse::new(active, &snapshot)))
}

/// Derived statistics of the current snapshot.
///
/// # Errors
///
/// Returns `NotReady` before the first snapshot and `SessionClosed` after logout.
pub async fn get_stats<P>(
    State(state): State<Arc<AppState<P>>>,
) -> Result<impl IntoResponse, ApiError>
where
    P: PlatformApi + 'static,
{
    let snapshot = state.current_snapshot()?;
    Ok(Json(StatsResponse::new(
        &snapshot,
        state.scheduler.state(),
    )))
}
