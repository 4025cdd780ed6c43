//! Router configuration.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::api::handlers::{agents, health, not_found, queues, refresh};
use crate::api::state::AppState;
use crate::platform::PlatformApi;

/// Create the router with all routes and middleware.
///
/// # Routes
///
/// - `GET /health` - Liveness and session status
/// - `GET /v1/agents` - Current snapshot, sorted by display name
/// - `GET /v1/agents/active` - Active agents, de-duplicated by id
/// - `GET /v1/stats` - Derived statistics and refresh status
/// - `GET /v1/queues` - Active queues with agent counts
/// - `GET /v1/queues/:queue/agents` - Agents associated with a queue
/// - `POST /v1/refresh` - Manual refresh
pub fn create_router<P>(state: AppState<P>) -> Router
where
    P: PlatformApi + 'static,
{
    let state = Arc::new(state);

    Router::new()
        .route("/health", get(health::health::<P>))
        // Agents
        .route("/v1/agents", get(agents::list_agents::<P>))
        .route("/v1/agents/active", get(agents::list_active_agents::<P>))
        .route("/v1/stats", get(agents::get_stats::<P>))
        // Queues
        .route("/v1/queues", get(queues::list_queues::<P>))
        .route(
            "/v1/queues/:queue/agents",
            get(queues::list_queue_agents::<P>),
        )
        // Refresh
        .route("/v1/refresh", post(refresh::refresh::<P>))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
