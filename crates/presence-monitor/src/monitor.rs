//! Session lifecycle.
//!
//! [`PresenceMonitor`] owns at most one authenticated session. Logging in
//! exchanges credentials for a token, binds a platform client to the new
//! [`Session`] and starts a [`RefreshScheduler`]. Logging out stops the
//! scheduler, drops the session and clears the published snapshot.

use std::sync::Arc;

use parking_lot::Mutex;
use presence_auth::{AuthConfig, Credentials, Session, TokenClient};

use crate::aggregator::{AggregatorConfig, PresenceAggregator};
use crate::config::MonitorConfig;
use crate::error::{MonitorError, Result};
use crate::platform::HttpPlatformClient;
use crate::refresh::{RefreshScheduler, Snapshot};

/// Scheduler type bound to the live platform.
pub type LiveScheduler = RefreshScheduler<HttpPlatformClient>;

struct ActiveSession {
    session: Session,
    scheduler: LiveScheduler,
}

/// Owns the authenticated session and its refresh scheduler.
pub struct PresenceMonitor {
    config: MonitorConfig,
    token_client: TokenClient,
    active: Mutex<Option<ActiveSession>>,
}

impl PresenceMonitor {
    /// Create a monitor. No session is opened until [`PresenceMonitor::login`].
    #[must_use]
    pub fn new(config: MonitorConfig, auth_config: AuthConfig) -> Self {
        Self {
            config,
            token_client: TokenClient::new(auth_config),
            active: Mutex::new(None),
        }
    }

    /// Create a monitor with a preconfigured token client.
    #[must_use]
    pub fn with_token_client(config: MonitorConfig, token_client: TokenClient) -> Self {
        Self {
            config,
            token_client,
            active: Mutex::new(None),
        }
    }

    /// Get the monitor configuration.
    #[must_use]
    pub const fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Authenticate, start the refresh scheduler and return it.
    ///
    /// An already open session is closed first.
    ///
    /// # Errors
    ///
    /// Returns `MonitorError::Auth` if the token exchange fails. The
    /// previous session, if any, is left untouched in that case.
    pub async fn login(&self, credentials: &Credentials) -> Result<LiveScheduler> {
        let session = match self.token_client.open_session(credentials).await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(
                    kind = ?e.failure_kind(),
                    error = %e,
                    "{}",
                    e.user_message()
                );
                return Err(MonitorError::Auth(e));
            }
        };

        let client = HttpPlatformClient::new(session.clone(), self.config.request_timeout());
        let aggregator =
            PresenceAggregator::new(Arc::new(client), AggregatorConfig::from(&self.config));
        let scheduler = RefreshScheduler::new(aggregator, self.config.refresh_interval());

        let previous = self.active.lock().replace(ActiveSession {
            session,
            scheduler: scheduler.clone(),
        });
        if let Some(previous) = previous {
            tracing::info!("Replacing open session");
            previous.scheduler.stop();
        }

        scheduler.spawn();
        tracing::info!(
            base_path = %self.token_client.config().api_base(),
            "Session opened"
        );
        Ok(scheduler)
    }

    /// Close the session. Returns false if none was open.
    pub fn logout(&self) -> bool {
        let Some(active) = self.active.lock().take() else {
            return false;
        };

        active.scheduler.stop();
        tracing::info!(
            opened_at = %active.session.opened_at(),
            "Session closed"
        );
        true
    }

    /// Returns true while a session is open.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.active.lock().is_some()
    }

    /// The open session, if any.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.active.lock().as_ref().map(|a| a.session.clone())
    }

    /// The scheduler of the open session, if any.
    #[must_use]
    pub fn scheduler(&self) -> Option<LiveScheduler> {
        self.active.lock().as_ref().map(|a| a.scheduler.clone())
    }

    /// Latest snapshot of the open session.
    ///
    /// # Errors
    ///
    /// Returns `SessionClosed` if no session is open and `Internal` if no
    /// cycle has completed yet.
    pub fn snapshot(&self) -> Result<Arc<Snapshot>> {
        let scheduler = self.scheduler().ok_or(MonitorError::SessionClosed)?;
        scheduler
            .snapshot()
            .ok_or_else(|| MonitorError::Internal("no snapshot published yet".to_string()))
    }
}

impl Drop for PresenceMonitor {
    fn drop(&mut self) {
        if let Some(active) = self.active.get_mut().take() {
            active.scheduler.stop();
        }
    }
}
