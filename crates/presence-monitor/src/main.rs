//! Presence Monitor - agent presence aggregation service
//!
//! Authenticates against the platform at startup, refreshes agent
//! presence on a fixed interval and serves the snapshots as JSON.
//!
//! # Environment
//!
//! - `PLATFORM_CLIENT_ID`, `PLATFORM_CLIENT_SECRET` (required): OAuth client credentials
//! - `PLATFORM_BASE_PATH`: API base path (default `https://api.mypurecloud.com`)
//! - `LISTEN_ADDR`, `REFRESH_INTERVAL_SECONDS`, `USER_PAGE_SIZE`,
//!   `PRESENCE_SOURCE_ID`, `PRESENCE_LOOKUP_TIMEOUT_SECONDS`,
//!   `REQUEST_TIMEOUT_SECONDS`: see [`MonitorConfig::from_env`]
//! - `RUST_LOG`: log filter (default `info,presence_monitor=debug`)

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use presence_auth::{AuthConfig, Credentials};
use presence_monitor::{create_router, AppState, MonitorConfig, PresenceMonitor};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,presence_monitor=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Presence Monitor");

    // Load configuration from environment
    let config = MonitorConfig::from_env();
    let client_id = std::env::var("PLATFORM_CLIENT_ID")
        .map_err(|_| "PLATFORM_CLIENT_ID must be set")?;
    let client_secret = std::env::var("PLATFORM_CLIENT_SECRET")
        .map_err(|_| "PLATFORM_CLIENT_SECRET must be set")?;
    let auth_config = std::env::var("PLATFORM_BASE_PATH")
        .map(AuthConfig::new)
        .unwrap_or_default();

    tracing::info!(
        listen_addr = %config.listen_addr,
        base_path = %auth_config.api_base(),
        refresh_interval_secs = config.refresh_interval_seconds,
        page_size = config.page_size,
        lookup_timeout_secs = config.lookup_timeout_seconds,
        "Configuration loaded"
    );

    let listen_addr = config.listen_addr.clone();
    let monitor = Arc::new(PresenceMonitor::new(config, auth_config));

    let credentials = Credentials::new(client_id, client_secret);
    let scheduler = monitor.login(&credentials).await?;

    let app = create_router(AppState::new(scheduler));

    tracing::info!(listen_addr = %listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;

    let shutdown_monitor = Arc::clone(&monitor);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                return;
            }
            tracing::info!("Shutdown requested");
            shutdown_monitor.logout();
        })
        .await?;

    monitor.logout();
    tracing::info!("Presence Monitor stopped");
    Ok(())
}
