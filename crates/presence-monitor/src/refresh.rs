//! Periodic and on-demand refresh.
//!
//! The [`RefreshScheduler`] runs the aggregation pipeline on a fixed
//! interval and on request, and publishes each result as an immutable
//! [`Snapshot`]. At most one cycle is in flight at any time: a request
//! that arrives while a cycle is running is coalesced into it.
//!
//! # State machine
//!
//! ```text
//!          refresh_now / tick
//!   Idle ─────────────────────▶ Refreshing
//!    ▲                              │
//!    └──────── publish / discard ───┘
//! ```
//!
//! A failed cycle does not keep stale data: the fixed fallback dataset is
//! published with a warning. After [`RefreshScheduler::stop`] the pending
//! timer is cancelled and any cycle still in flight is discarded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use presence_core::{fallback_agents, AgentRecord, DerivedStats, StatsSummary};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::aggregator::{Aggregation, PresenceAggregator};
use crate::error::{FallbackReason, MonitorError};
use crate::platform::PlatformApi;

/// Scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshState {
    /// No cycle is running.
    Idle,
    /// A cycle is in flight.
    Refreshing,
}

/// Where a snapshot's records came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotSource {
    /// Aggregated from the platform.
    Live,
    /// The fixed fallback dataset.
    Fallback,
}

/// One published result of a refresh cycle.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// Records sorted by display name.
    pub agents: Vec<AgentRecord>,
    /// Statistics derived from `agents`.
    pub stats: StatsSummary,
    /// When the cycle finished.
    pub refreshed_at: DateTime<Utc>,
    /// Live or fallback data.
    pub source: SnapshotSource,
    /// Status line describing the cycle.
    pub message: String,
    /// Presence lookups that degraded to `Unknown`.
    pub presence_failures: usize,
    /// Why the fallback dataset was used, if it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<&'static str>,
}

impl Snapshot {
    /// Build a snapshot from a successful aggregation.
    #[must_use]
    pub fn live(aggregation: Aggregation, refreshed_at: DateTime<Utc>) -> Self {
        let stats = DerivedStats::new(&aggregation.agents).summary();
        let message = format!(
            "Loaded {} agents. {} queues have active agents.",
            stats.total_count,
            stats.queues_with_active_agents.len()
        );

        Self {
            agents: aggregation.agents,
            stats,
            refreshed_at,
            source: SnapshotSource::Live,
            message,
            presence_failures: aggregation.failed_lookups.len(),
            fallback_reason: None,
        }
    }

    /// Build the fallback snapshot for a failed cycle.
    #[must_use]
    pub fn fallback(error: &MonitorError, refreshed_at: DateTime<Utc>) -> Self {
        let agents = fallback_agents(refreshed_at);
        let stats = DerivedStats::new(&agents).summary();

        Self {
            agents,
            stats,
            refreshed_at,
            source: SnapshotSource::Fallback,
            message: error.fallback_message(),
            presence_failures: 0,
            fallback_reason: Some(error.fallback_reason().as_str()),
        }
    }

    /// Returns true if this snapshot holds the fallback dataset.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.source == SnapshotSource::Fallback
    }
}

/// Result of a refresh request.
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// The cycle ran and its snapshot was published.
    Completed(Arc<Snapshot>),
    /// Another cycle was already in flight.
    Coalesced,
    /// The scheduler was stopped while the cycle ran; nothing was published.
    Discarded,
}

/// Drives the aggregation pipeline and publishes snapshots.
pub struct RefreshScheduler<P: PlatformApi> {
    inner: Arc<Inner<P>>,
}

impl<P: PlatformApi> std::fmt::Debug for RefreshScheduler<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshScheduler")
            .field("interval", &self.inner.interval)
            .finish_non_exhaustive()
    }
}

struct Inner<P: PlatformApi> {
    aggregator: PresenceAggregator<P>,
    interval: Duration,
    in_flight: AtomicBool,
    cancel: CancellationToken,
    snapshot_tx: watch::Sender<Option<Arc<Snapshot>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

/// Clears the in-flight flag when a cycle ends, including on panic.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<P: PlatformApi> RefreshScheduler<P> {
    /// Create a scheduler. Nothing runs until [`RefreshScheduler::spawn`]
    /// or [`RefreshScheduler::refresh_now`] is called.
    #[must_use]
    pub fn new(aggregator: PresenceAggregator<P>, interval: Duration) -> Self {
        let (snapshot_tx, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                aggregator,
                interval,
                in_flight: AtomicBool::new(false),
                cancel: CancellationToken::new(),
                snapshot_tx,
                task: Mutex::new(None),
            }),
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> RefreshState {
        if self.inner.in_flight.load(Ordering::Acquire) {
            RefreshState::Refreshing
        } else {
            RefreshState::Idle
        }
    }

    /// Latest published snapshot, if any.
    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.inner.snapshot_tx.borrow().clone()
    }

    /// Watch published snapshots.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Snapshot>>> {
        self.inner.snapshot_tx.subscribe()
    }

    /// Refresh interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.inner.interval
    }

    /// Returns true once [`RefreshScheduler::stop`] has been called.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    /// Run one cycle now, unless one is already in flight.
    pub async fn refresh_now(&self) -> RefreshOutcome {
        self.inner.refresh().await
    }

    /// Stop the timer, discard any in-flight result and clear the snapshot.
    pub fn stop(&self) {
        if self.inner.cancel.is_cancelled() {
            return;
        }
        self.inner.cancel.cancel();
        // The loop exits on its own; the handle is only dropped here.
        self.inner.task.lock().take();
        self.inner.snapshot_tx.send_replace(None);
        tracing::info!("Refresh scheduler stopped");
    }
}

impl<P: PlatformApi + 'static> RefreshScheduler<P> {
    /// Start the periodic loop. The first cycle runs immediately.
    ///
    /// Calling this more than once, or after [`RefreshScheduler::stop`],
    /// has no effect.
    pub fn spawn(&self) {
        if self.is_stopped() {
            return;
        }
        let mut task = self.inner.task.lock();
        if task.is_some() {
            return;
        }

        let inner = Arc::clone(&self.inner);
        *task = Some(tokio::spawn(async move { inner.run().await }));
        tracing::info!(
            interval_secs = self.inner.interval.as_secs(),
            "Refresh scheduler started"
        );
    }
}

impl<P: PlatformApi> Clone for RefreshScheduler<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: PlatformApi> Inner<P> {
    async fn run(&self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            self.refresh().await;
        }
    }

    async fn refresh(&self) -> RefreshOutcome {
        if self.cancel.is_cancelled() {
            return RefreshOutcome::Discarded;
        }
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Refresh already in progress, coalescing");
            return RefreshOutcome::Coalesced;
        }
        let _in_flight = InFlight(&self.in_flight);

        let started = Instant::now();
        let result = self.aggregator.aggregate().await;

        let now = Utc::now();
        let snapshot = match result {
            Ok(aggregation) => Snapshot::live(aggregation, now),
            Err(e) => {
                let reason = e.fallback_reason();
                tracing::warn!(
                    reason = reason.as_str(),
                    error = %e,
                    "Refresh failed, publishing fallback data"
                );
                if reason == FallbackReason::PermissionDenied {
                    tracing::warn!("Check that the OAuth client has users:read, presence:read and routing:read");
                }
                Snapshot::fallback(&e, now)
            }
        };

        let snapshot = Arc::new(snapshot);
        // `stop` cancels before it clears the slot, so a publish either sees
        // the cancellation here or is overwritten by that clear.
        let published = self.snapshot_tx.send_if_modified(|slot| {
            if self.cancel.is_cancelled() {
                return false;
            }
            *slot = Some(Arc::clone(&snapshot));
            true
        });
        if !published {
            tracing::debug!("Scheduler stopped during refresh, discarding result");
            return RefreshOutcome::Discarded;
        }

        tracing::info!(
            agents = snapshot.stats.total_count,
            online = snapshot.stats.online_count,
            active_queues = snapshot.stats.queues_with_active_agents.len(),
            presence_failures = snapshot.presence_failures,
            fallback = snapshot.is_fallback(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Refresh completed"
        );

        RefreshOutcome::Completed(snapshot)
    }
}
