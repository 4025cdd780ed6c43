//! Presence aggregation.
//!
//! One aggregation cycle fetches a single page of users, looks up presence
//! for every eligible user concurrently, waits for all lookups, and builds
//! a sorted, complete set of [`AgentRecord`]s.
//!
//! Each lookup is bounded by a timeout. A failed or timed-out lookup does
//! not abort the cycle: that agent is reported with an `Unknown` status.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use presence_core::{sort_by_display_name, AgentRecord, PresenceStatus, UserId};

use crate::config::MonitorConfig;
use crate::error::{MonitorError, Result};
use crate::platform::{PlatformApi, PlatformUser, UserPresence};

/// Settings for one aggregation cycle.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Users requested in the single listing call.
    pub page_size: u32,
    /// Presence source identifier.
    pub presence_source: String,
    /// Upper bound on a single presence lookup.
    pub lookup_timeout: Duration,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self::from(&MonitorConfig::default())
    }
}

impl From<&MonitorConfig> for AggregatorConfig {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            page_size: config.page_size,
            presence_source: config.presence_source.clone(),
            lookup_timeout: config.lookup_timeout(),
        }
    }
}

/// Result of one aggregation cycle.
#[derive(Debug, Clone)]
pub struct Aggregation {
    /// Records sorted by display name.
    pub agents: Vec<AgentRecord>,
    /// Users dropped because id, name or email was missing.
    pub skipped_users: usize,
    /// Lookups that failed or timed out and were reported as `Unknown`.
    pub failed_lookups: Vec<MonitorError>,
}

/// A listed user with every required field present.
struct EligibleUser {
    id: UserId,
    name: String,
    email: String,
    department: Option<String>,
    title: Option<String>,
}

impl EligibleUser {
    fn from_platform(user: PlatformUser) -> Option<Self> {
        Some(Self {
            id: UserId::new(user.id?),
            name: user.name?,
            email: user.email?,
            department: user.department,
            title: user.title,
        })
    }

    fn into_record(self, presence: Option<&UserPresence>) -> AgentRecord {
        let status = presence
            .and_then(UserPresence::system_presence)
            .map_or(PresenceStatus::Unknown, PresenceStatus::from_system_presence);

        AgentRecord::new(self.id, self.name, self.email, self.department, status)
            .with_title(self.title)
            .with_last_status_change(presence.and_then(|p| p.modified_date))
    }
}

/// Builds agent snapshots from the platform.
pub struct PresenceAggregator<P: PlatformApi> {
    api: Arc<P>,
    config: AggregatorConfig,
}

impl<P: PlatformApi> PresenceAggregator<P> {
    /// Create a new aggregator.
    #[must_use]
    pub fn new(api: Arc<P>, config: AggregatorConfig) -> Self {
        Self { api, config }
    }

    /// Get the aggregator configuration.
    #[must_use]
    pub const fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Run one cycle and return the sorted records.
    ///
    /// # Errors
    ///
    /// Returns the listing error if the user page cannot be fetched, or
    /// `NoUsers` if the page is empty. Presence failures never fail the call.
    pub async fn fetch_all(&self) -> Result<Vec<AgentRecord>> {
        Ok(self.aggregate().await?.agents)
    }

    /// Run one cycle and return the records with lookup diagnostics.
    ///
    /// # Errors
    ///
    /// Same as [`PresenceAggregator::fetch_all`].
    pub async fn aggregate(&self) -> Result<Aggregation> {
        let started = Instant::now();

        // Only the first page is fetched.
        let users = self.api.list_users(self.config.page_size, 1).await?;
        if users.is_empty() {
            return Err(MonitorError::NoUsers);
        }

        let listed = users.len();
        let eligible: Vec<EligibleUser> = users
            .into_iter()
            .filter_map(EligibleUser::from_platform)
            .collect();
        let skipped_users = listed - eligible.len();
        if skipped_users > 0 {
            tracing::debug!(skipped = skipped_users, "Skipped users missing id, name or email");
        }

        let results = join_all(eligible.into_iter().map(|user| self.resolve(user))).await;

        let mut agents = Vec::with_capacity(results.len());
        let mut failed_lookups = Vec::new();
        for (record, failure) in results {
            agents.push(record);
            failed_lookups.extend(failure);
        }
        sort_by_display_name(&mut agents);

        tracing::debug!(
            agents = agents.len(),
            failed_lookups = failed_lookups.len(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Aggregation complete"
        );

        Ok(Aggregation {
            agents,
            skipped_users,
            failed_lookups,
        })
    }

    /// Look up one user's presence and build their record.
    async fn resolve(&self, user: EligibleUser) -> (AgentRecord, Option<MonitorError>) {
        let lookup = self
            .api
            .get_user_presence(&user.id, &self.config.presence_source);

        let outcome = match tokio::time::timeout(self.config.lookup_timeout, lookup).await {
            Ok(Ok(presence)) => Ok(presence),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!(
                "timed out after {}ms",
                self.config.lookup_timeout.as_millis()
            )),
        };

        match outcome {
            Ok(presence) => (user.into_record(Some(&presence)), None),
            Err(reason) => {
                tracing::warn!(user_id = %user.id, reason = %reason, "Presence lookup failed");
                let error = MonitorError::PresenceLookup {
                    user_id: user.id.clone(),
                    reason,
                };
                (user.into_record(None), Some(error))
            }
        }
    }
}
